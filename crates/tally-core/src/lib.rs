//! tally-core
//!
//! Ledger logic for Tally: validation, the write-through transaction cache,
//! queries, statistics, and the storage contract backends implement.
//! Depends on tally-domain. No terminal I/O, no concrete durable backend.

pub mod cache;
pub mod category_service;
pub mod error;
pub mod ledger;
pub mod mapping;
pub mod query;
pub mod statistics_service;
pub mod storage;
pub mod validation;

pub use cache::TransactionCache;
pub use category_service::{category_name, CategoryLookup, CategoryManager, UNCATEGORIZED};
pub use error::{ErrorKind, LedgerError, LedgerResult};
pub use ledger::Ledger;
pub use mapping::RecordMapping;
pub use query::{QueryEngine, ToPredicate};
pub use statistics_service::StatisticsService;
pub use storage::{
    FieldValue, MemoryStorage, Predicate, Record, RecordId, StorageBackend, StorageError,
};
pub use validation::{ValidationError, ValidationPolicy, DEFAULT_MAX_AMOUNT};
