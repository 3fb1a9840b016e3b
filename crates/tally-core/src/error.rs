use std::fmt;

use tally_domain::TransactionId;
use thiserror::Error;

use crate::storage::StorageError;
use crate::validation::ValidationError;

pub type LedgerResult<T> = Result<T, LedgerError>;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Transaction not found: {}", describe_id(.0))]
    NotFound(Option<TransactionId>),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl LedgerError {
    /// Flattens the error to the kind presentation code renders.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::Validation(ValidationError::InvalidAmount(_)) => ErrorKind::InvalidAmount,
            LedgerError::Validation(ValidationError::AmountExceedsLimit { .. }) => {
                ErrorKind::AmountExceedsLimit
            }
            LedgerError::Validation(ValidationError::InvalidCategory(_)) => {
                ErrorKind::InvalidCategory
            }
            LedgerError::NotFound(_) => ErrorKind::NotFound,
            LedgerError::Storage(_) => ErrorKind::StorageError,
        }
    }
}

fn describe_id(id: &Option<TransactionId>) -> String {
    match id {
        Some(id) => id.to_string(),
        None => "transaction has no id".into(),
    }
}

/// The closed set of failure kinds a ledger operation can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidAmount,
    AmountExceedsLimit,
    InvalidCategory,
    NotFound,
    StorageError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::InvalidAmount => "InvalidAmount",
            ErrorKind::AmountExceedsLimit => "AmountExceedsLimit",
            ErrorKind::InvalidCategory => "InvalidCategory",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::StorageError => "StorageError",
        };
        f.write_str(label)
    }
}
