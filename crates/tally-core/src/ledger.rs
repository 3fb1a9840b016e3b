//! Thread-safe facade over the transaction cache.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tally_domain::{Statistics, Transaction, TransactionFilter, TransactionId};

use crate::cache::TransactionCache;
use crate::error::LedgerResult;
use crate::query::QueryEngine;
use crate::statistics_service::StatisticsService;
use crate::storage::StorageBackend;
use crate::validation::ValidationPolicy;

/// The ledger: one cache, one storage handle, single-writer/many-reader access.
///
/// Mutations hold the write lock across validate, persist, and the in-memory
/// change, so readers only ever see fully applied mutations.
pub struct Ledger {
    cache: RwLock<TransactionCache>,
}

impl Ledger {
    /// Loads the ledger with the default validation policy.
    pub fn open(storage: Arc<dyn StorageBackend>) -> LedgerResult<Self> {
        Self::open_with_policy(storage, ValidationPolicy::default())
    }

    pub fn open_with_policy(
        storage: Arc<dyn StorageBackend>,
        policy: ValidationPolicy,
    ) -> LedgerResult<Self> {
        let cache = TransactionCache::load(storage, policy)?;
        Ok(Self {
            cache: RwLock::new(cache),
        })
    }

    pub fn add(&self, candidate: Transaction) -> LedgerResult<TransactionId> {
        self.write().add(candidate)
    }

    /// `Ok(false)` when `id` was not present.
    pub fn delete(&self, id: TransactionId) -> LedgerResult<bool> {
        self.write().delete(id)
    }

    pub fn update(&self, transaction: Transaction) -> LedgerResult<()> {
        self.write().update(transaction)
    }

    /// Re-reads storage, e.g. after another process wrote to it.
    pub fn reload(&self) -> LedgerResult<usize> {
        self.write().reload()
    }

    pub fn query(&self, filter: &TransactionFilter) -> Vec<Transaction> {
        QueryEngine::query(self.read().transactions(), filter)
    }

    pub fn latest(&self, n: usize) -> Vec<Transaction> {
        self.read().latest(n)
    }

    pub fn count(&self) -> usize {
        self.read().count()
    }

    pub fn get(&self, id: TransactionId) -> Option<Transaction> {
        self.read().get(id).cloned()
    }

    /// Snapshot of every transaction in insertion order.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.read().transactions().to_vec()
    }

    /// Aggregates the matching transactions without copying them out of the cache.
    pub fn statistics(&self, filter: &TransactionFilter) -> Statistics {
        let cache = self.read();
        StatisticsService::aggregate(QueryEngine::matching(cache.transactions(), filter))
    }

    pub fn validation_policy(&self) -> ValidationPolicy {
        *self.read().policy()
    }

    // A panic while holding the lock cannot leave the cache half-mutated:
    // memory changes only after storage succeeded, in a single statement.
    fn read(&self) -> RwLockReadGuard<'_, TransactionCache> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TransactionCache> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }
}
