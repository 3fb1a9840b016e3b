//! Derived totals over a set of transactions.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::common::CategoryId;

/// Income/expense totals and per-category sums. Recomputed on demand, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statistics {
    pub total_income: f64,
    pub total_expense: f64,
    pub balance: f64,
    /// Sum of amounts per category regardless of direction; `None` collects uncategorized rows.
    pub category_data: BTreeMap<Option<CategoryId>, f64>,
    pub income_count: usize,
    pub expense_count: usize,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transaction_count(&self) -> usize {
        self.income_count + self.expense_count
    }

    pub fn is_empty(&self) -> bool {
        self.transaction_count() == 0
    }

    /// Mean expense amount; `0.0` when there are no expenses.
    pub fn average_expense(&self) -> f64 {
        average(self.total_expense, self.expense_count)
    }

    /// Mean income amount; `0.0` when there is no income.
    pub fn average_income(&self) -> f64 {
        average(self.total_income, self.income_count)
    }

    pub fn category_total(&self, category_id: Option<CategoryId>) -> f64 {
        self.category_data.get(&category_id).copied().unwrap_or(0.0)
    }
}

fn average(total: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

/// One row of a category breakdown, resolved to a display name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub amount: f64,
    /// Fraction of the absolute grand total, in `0.0..=1.0`.
    pub share: f64,
}
