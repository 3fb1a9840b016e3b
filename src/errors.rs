use tally_config::ConfigError;
use tally_core::{ErrorKind, LedgerError, StorageError};
use thiserror::Error;

/// Everything the `tally` binary can fail with.
#[derive(Debug, Error)]
pub enum TallyError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Export error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Usage(String),
}

impl From<StorageError> for TallyError {
    fn from(err: StorageError) -> Self {
        TallyError::Ledger(LedgerError::Storage(err))
    }
}

impl TallyError {
    pub fn usage(message: impl Into<String>) -> Self {
        TallyError::Usage(message.into())
    }

    /// Ledger failure kind, when the error came from the ledger or a backend.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            TallyError::Ledger(err) => Some(err.kind()),
            _ => None,
        }
    }
}
