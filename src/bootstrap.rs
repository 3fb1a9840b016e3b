//! Opens the configured backend and the services layered on top of it.

use std::{fs, path::PathBuf, sync::Arc};

use tally_config::{BackendKind, Config};
use tally_core::{CategoryManager, Ledger, MemoryStorage, StorageBackend, ValidationPolicy};
use tally_storage_json::JsonFileStorage;
use tally_storage_sqlite::SqliteStorage;
use tracing::info;

use crate::errors::TallyError;

/// Creates the storage backend named by `config.backend`.
pub fn open_backend(config: &Config) -> Result<Arc<dyn StorageBackend>, TallyError> {
    let storage: Arc<dyn StorageBackend> = match config.backend {
        BackendKind::Memory => Arc::new(MemoryStorage::new()),
        BackendKind::Json => Arc::new(JsonFileStorage::open(data_file(config)?)?),
        BackendKind::Sqlite => {
            let path = data_file(config)?;
            Arc::new(SqliteStorage::new(&path.to_string_lossy())?)
        }
    };
    info!(backend = %config.backend, "storage backend ready");
    Ok(storage)
}

/// Loads the ledger with the configured amount ceiling.
pub fn open_ledger(
    config: &Config,
    storage: Arc<dyn StorageBackend>,
) -> Result<Ledger, TallyError> {
    let policy = ValidationPolicy::with_limit(config.max_amount);
    Ok(Ledger::open_with_policy(storage, policy)?)
}

/// The ledger and category table sharing one backend.
pub struct Workspace {
    pub config: Config,
    pub ledger: Ledger,
    pub categories: CategoryManager,
}

impl Workspace {
    pub fn open(config: Config) -> Result<Self, TallyError> {
        let storage = open_backend(&config)?;
        let categories = if config.seed_categories {
            CategoryManager::load_seeded(storage.clone())?
        } else {
            CategoryManager::load(storage.clone())?
        };
        let ledger = open_ledger(&config, storage)?;
        info!(
            transactions = ledger.count(),
            categories = categories.list(None).len(),
            "workspace opened"
        );
        Ok(Self {
            config,
            ledger,
            categories,
        })
    }
}

fn data_file(config: &Config) -> Result<PathBuf, TallyError> {
    let path = config
        .storage_path()
        .ok_or_else(|| TallyError::usage(format!("{} backend has no data file", config.backend)))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(path)
}
