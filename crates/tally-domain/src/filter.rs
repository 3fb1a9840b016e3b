//! Structured, AND-combined constraints over transactions.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::common::*;
use crate::transaction::{Transaction, TransactionKind};

/// Optional constraints applied together. An absent field imposes nothing,
/// so the default filter matches every transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionFilter {
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    pub category_id: Option<CategoryId>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub keyword: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<TransactionKind>,
}

impl TransactionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_start_date(mut self, start: NaiveDateTime) -> Self {
        self.start_date = Some(start);
        self
    }

    pub fn with_end_date(mut self, end: NaiveDateTime) -> Self {
        self.end_date = Some(end);
        self
    }

    /// Restricts to whole days, from the start of `from` to the end of `to`.
    pub fn with_days(self, from: NaiveDate, to: NaiveDate) -> Self {
        self.with_start_date(start_of_day(from))
            .with_end_date(end_of_day(to))
    }

    pub fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_min_amount(mut self, min: f64) -> Self {
        self.min_amount = Some(min);
        self
    }

    pub fn with_max_amount(mut self, max: f64) -> Self {
        self.max_amount = Some(max);
        self
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    pub fn with_kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// The keyword, ignoring an empty string.
    pub fn active_keyword(&self) -> Option<&str> {
        self.keyword.as_deref().filter(|keyword| !keyword.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.start_date.is_none()
            && self.end_date.is_none()
            && self.category_id.is_none()
            && self.min_amount.is_none()
            && self.max_amount.is_none()
            && self.active_keyword().is_none()
            && self.kind.is_none()
    }

    pub fn matches(&self, txn: &Transaction) -> bool {
        if let Some(start) = self.start_date {
            if txn.date < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if txn.date > end {
                return false;
            }
        }
        if let Some(category_id) = self.category_id {
            if txn.category_id != Some(category_id) {
                return false;
            }
        }
        if let Some(min) = self.min_amount {
            if txn.amount < min {
                return false;
            }
        }
        if let Some(max) = self.max_amount {
            if txn.amount > max {
                return false;
            }
        }
        if let Some(keyword) = self.active_keyword() {
            if !txn.note.to_lowercase().contains(&keyword.to_lowercase()) {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if txn.kind != kind {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = TransactionFilter::new();
        assert!(filter.is_empty());
        assert!(filter.matches(&Transaction::expense(-5.0)));
    }

    #[test]
    fn empty_keyword_is_ignored() {
        let filter = TransactionFilter::new().with_keyword("");
        assert!(filter.is_empty());
        assert!(filter.matches(&Transaction::income(1.0).with_note("anything")));
    }

    #[test]
    fn keyword_is_case_insensitive() {
        let filter = TransactionFilter::new().with_keyword("LUNCH");
        assert!(filter.matches(&Transaction::expense(9.0).with_note("Team lunch")));
        assert!(!filter.matches(&Transaction::expense(9.0).with_note("dinner")));
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let filter = TransactionFilter::new()
            .with_start_date(at(2))
            .with_end_date(at(4));
        assert!(!filter.matches(&Transaction::expense(1.0).with_date(at(1))));
        assert!(filter.matches(&Transaction::expense(1.0).with_date(at(2))));
        assert!(filter.matches(&Transaction::expense(1.0).with_date(at(4))));
        assert!(!filter.matches(&Transaction::expense(1.0).with_date(at(5))));
    }

    #[test]
    fn category_filter_excludes_uncategorized() {
        let filter = TransactionFilter::new().with_category(2);
        assert!(filter.matches(&Transaction::expense(1.0).with_category(2)));
        assert!(!filter.matches(&Transaction::expense(1.0)));
    }

    #[test]
    fn constraints_combine_with_and() {
        let filter = TransactionFilter::new()
            .with_kind(TransactionKind::Income)
            .with_min_amount(10.0);
        assert!(filter.matches(&Transaction::income(10.0)));
        assert!(!filter.matches(&Transaction::expense(10.0)));
        assert!(!filter.matches(&Transaction::income(9.99)));
    }
}
