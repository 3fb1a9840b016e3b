//! Read-only filtering and ordering over a borrowed transaction slice.

use std::cmp::Reverse;

use tally_domain::{Transaction, TransactionFilter, DATE_TIME_FORMAT};

use crate::storage::Predicate;

/// Stateless query helpers. Nothing here touches storage.
pub struct QueryEngine;

impl QueryEngine {
    /// Matches in slice order (the cache's insertion order).
    pub fn query(transactions: &[Transaction], filter: &TransactionFilter) -> Vec<Transaction> {
        Self::matching(transactions, filter).cloned().collect()
    }

    /// Borrowing variant of [`QueryEngine::query`].
    pub fn matching<'a>(
        transactions: &'a [Transaction],
        filter: &'a TransactionFilter,
    ) -> impl Iterator<Item = &'a Transaction> + 'a {
        transactions.iter().filter(move |txn| filter.matches(txn))
    }

    /// The `n` most recent transactions; equal dates put the higher id first.
    pub fn latest(transactions: &[Transaction], n: usize) -> Vec<Transaction> {
        let mut ordered: Vec<&Transaction> = transactions.iter().collect();
        ordered.sort_by_key(|txn| Reverse((txn.date, txn.id)));
        ordered.into_iter().take(n).cloned().collect()
    }
}

/// Translates a filter into the storage contract's structured predicate.
pub trait ToPredicate {
    fn to_predicate(&self) -> Predicate;
}

impl ToPredicate for TransactionFilter {
    fn to_predicate(&self) -> Predicate {
        let mut parts = Vec::new();
        if let Some(start) = self.start_date {
            parts.push(Predicate::ge(
                "date",
                start.format(DATE_TIME_FORMAT).to_string(),
            ));
        }
        if let Some(end) = self.end_date {
            parts.push(Predicate::le("date", end.format(DATE_TIME_FORMAT).to_string()));
        }
        if let Some(category_id) = self.category_id {
            parts.push(Predicate::eq("category_id", category_id));
        }
        if let Some(min) = self.min_amount {
            parts.push(Predicate::ge("amount", min));
        }
        if let Some(max) = self.max_amount {
            parts.push(Predicate::le("amount", max));
        }
        if let Some(keyword) = self.active_keyword() {
            parts.push(Predicate::contains("note", keyword, true));
        }
        if let Some(kind) = self.kind {
            parts.push(Predicate::eq("type", kind.as_str()));
        }
        Predicate::And(parts)
    }
}
