#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use chrono::{NaiveDate, NaiveDateTime};
use tally_core::{
    Ledger, MemoryStorage, Predicate, Record, RecordId, StorageBackend, StorageError,
};

/// Memory backend whose write paths can be switched to fail.
#[derive(Default)]
pub struct FailingStorage {
    inner: MemoryStorage,
    pub fail_persist: AtomicBool,
    pub fail_replace: AtomicBool,
    pub fail_remove: AtomicBool,
    pub fail_fetch: AtomicBool,
}

impl FailingStorage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_persist.store(fail, Ordering::SeqCst);
        self.fail_replace.store(fail, Ordering::SeqCst);
        self.fail_remove.store(fail, Ordering::SeqCst);
    }
}

fn check(flag: &AtomicBool, operation: &str) -> Result<(), StorageError> {
    if flag.load(Ordering::SeqCst) {
        Err(StorageError::Backend(format!("{operation} unavailable")))
    } else {
        Ok(())
    }
}

impl StorageBackend for FailingStorage {
    fn persist(&self, table: &str, record: &Record) -> Result<RecordId, StorageError> {
        check(&self.fail_persist, "persist")?;
        self.inner.persist(table, record)
    }

    fn fetch(&self, table: &str, filter: Option<&Predicate>) -> Result<Vec<Record>, StorageError> {
        check(&self.fail_fetch, "fetch")?;
        self.inner.fetch(table, filter)
    }

    fn replace(&self, table: &str, id: RecordId, record: &Record) -> Result<(), StorageError> {
        check(&self.fail_replace, "replace")?;
        self.inner.replace(table, id, record)
    }

    fn remove(&self, table: &str, id: RecordId) -> Result<(), StorageError> {
        check(&self.fail_remove, "remove")?;
        self.inner.remove(table, id)
    }
}

pub fn memory_ledger() -> (Arc<MemoryStorage>, Ledger) {
    let storage = Arc::new(MemoryStorage::new());
    let ledger = Ledger::open(storage.clone()).expect("open ledger");
    (storage, ledger)
}

pub fn day(month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, month, day)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}
