//! Write-through in-memory mirror of the `transactions` table.

use std::sync::Arc;

use tally_domain::{truncate_to_seconds, Transaction, TransactionId};
use tracing::{debug, info, warn};

use crate::error::{LedgerError, LedgerResult};
use crate::mapping::RecordMapping;
use crate::query::QueryEngine;
use crate::storage::{StorageBackend, StorageError};
use crate::validation::ValidationPolicy;

/// Owns the canonical in-memory transaction list.
///
/// Every mutation validates first, writes to storage second, and touches
/// memory last, so a failure at any step leaves the cache as it was.
pub struct TransactionCache {
    storage: Arc<dyn StorageBackend>,
    policy: ValidationPolicy,
    transactions: Vec<Transaction>,
}

impl TransactionCache {
    /// Fetches every persisted transaction. A backend failure or a malformed
    /// row fails construction.
    pub fn load(storage: Arc<dyn StorageBackend>, policy: ValidationPolicy) -> LedgerResult<Self> {
        let transactions = fetch_all(storage.as_ref())?;
        info!(count = transactions.len(), "transaction cache loaded");
        Ok(Self {
            storage,
            policy,
            transactions,
        })
    }

    /// Replaces the cached list with a fresh read from storage.
    pub fn reload(&mut self) -> LedgerResult<usize> {
        self.transactions = fetch_all(self.storage.as_ref())?;
        debug!(count = self.transactions.len(), "transaction cache reloaded");
        Ok(self.transactions.len())
    }

    /// Validates and persists `candidate`, returning the storage-assigned id.
    /// The date is cut to whole seconds, the precision storage keeps.
    pub fn add(&mut self, mut candidate: Transaction) -> LedgerResult<TransactionId> {
        candidate.date = truncate_to_seconds(candidate.date);
        if let Err(err) = self.policy.validate(&candidate) {
            warn!(amount = candidate.amount, error = %err, "rejected transaction");
            return Err(err.into());
        }
        let id = self
            .storage
            .persist(Transaction::TABLE, &candidate.to_record())
            .map_err(|err| storage_failure("add", err))?;
        candidate.id = Some(id);
        self.transactions.push(candidate);
        debug!(id, "transaction added");
        Ok(id)
    }

    /// Removes `id`; returns `false` without touching storage when it is unknown.
    pub fn delete(&mut self, id: TransactionId) -> LedgerResult<bool> {
        let Some(position) = self.position(id) else {
            debug!(id, "delete of unknown transaction ignored");
            return Ok(false);
        };
        self.storage
            .remove(Transaction::TABLE, id)
            .map_err(|err| storage_failure("delete", err))?;
        self.transactions.remove(position);
        debug!(id, "transaction deleted");
        Ok(true)
    }

    /// Replaces a persisted transaction in storage and in place in the cache.
    pub fn update(&mut self, mut transaction: Transaction) -> LedgerResult<()> {
        transaction.date = truncate_to_seconds(transaction.date);
        let id = transaction.id.ok_or(LedgerError::NotFound(None))?;
        let position = self
            .position(id)
            .ok_or(LedgerError::NotFound(Some(id)))?;
        if let Err(err) = self.policy.validate(&transaction) {
            warn!(id, error = %err, "rejected update");
            return Err(err.into());
        }
        self.storage
            .replace(Transaction::TABLE, id, &transaction.to_record())
            .map_err(|err| storage_failure("update", err))?;
        self.transactions[position] = transaction;
        debug!(id, "transaction updated");
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.transactions.len()
    }

    pub fn latest(&self, n: usize) -> Vec<Transaction> {
        QueryEngine::latest(&self.transactions, n)
    }

    pub fn get(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id == Some(id))
    }

    /// Read-only view in insertion order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    fn position(&self, id: TransactionId) -> Option<usize> {
        self.transactions.iter().position(|txn| txn.id == Some(id))
    }
}

fn fetch_all(storage: &dyn StorageBackend) -> Result<Vec<Transaction>, StorageError> {
    storage
        .fetch(Transaction::TABLE, None)?
        .iter()
        .map(Transaction::from_record)
        .collect()
}

fn storage_failure(operation: &str, err: StorageError) -> LedgerError {
    warn!(operation, error = %err, "storage write failed; cache unchanged");
    LedgerError::Storage(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::validation::ValidationError;

    fn empty_cache() -> TransactionCache {
        TransactionCache::load(Arc::new(MemoryStorage::new()), ValidationPolicy::default())
            .expect("load")
    }

    #[test]
    fn add_assigns_storage_id() {
        let mut cache = empty_cache();
        let first = cache.add(Transaction::expense(10.0)).unwrap();
        let second = cache.add(Transaction::income(20.0)).unwrap();
        assert_ne!(first, second);
        assert_eq!(cache.get(second).unwrap().amount, 20.0);
        assert_eq!(cache.count(), 2);
    }

    #[test]
    fn rejected_candidate_is_not_cached() {
        let mut cache = empty_cache();
        let err = cache
            .add(Transaction::expense(f64::INFINITY))
            .expect_err("infinite amount");
        assert!(matches!(
            err,
            LedgerError::Validation(ValidationError::InvalidAmount(_))
        ));
        assert_eq!(cache.count(), 0);
    }

    #[test]
    fn update_keeps_position() {
        let mut cache = empty_cache();
        let a = cache.add(Transaction::expense(1.0)).unwrap();
        cache.add(Transaction::expense(2.0)).unwrap();
        let mut edited = cache.get(a).unwrap().clone();
        edited.note = "edited".into();
        cache.update(edited).unwrap();
        assert_eq!(cache.transactions()[0].note, "edited");
    }

    #[test]
    fn cached_date_matches_stored_precision() {
        let mut cache = empty_cache();
        let mut candidate = Transaction::expense(3.0);
        candidate.date += chrono::Duration::milliseconds(500);
        let id = cache.add(candidate).unwrap();
        let cached = cache.get(id).unwrap().clone();
        cache.reload().unwrap();
        assert_eq!(cache.get(id), Some(&cached));
    }

    #[test]
    fn update_requires_an_id() {
        let mut cache = empty_cache();
        let err = cache.update(Transaction::expense(1.0)).expect_err("no id");
        assert!(matches!(err, LedgerError::NotFound(None)));
    }
}
