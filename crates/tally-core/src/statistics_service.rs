//! Aggregation helpers for income/expense summaries.

use tally_domain::{
    month_bounds, CategoryShare, Statistics, Transaction, TransactionFilter, TransactionKind,
};

use crate::category_service::{category_name, CategoryLookup};
use crate::ledger::Ledger;

/// Reduces transaction collections into [`Statistics`].
pub struct StatisticsService;

impl StatisticsService {
    /// Single pass over `transactions`. An empty input yields all-zero totals.
    pub fn aggregate<'a, I>(transactions: I) -> Statistics
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut stats = Statistics::new();
        for txn in transactions {
            match txn.kind {
                TransactionKind::Income => {
                    stats.total_income += txn.amount;
                    stats.income_count += 1;
                }
                TransactionKind::Expense => {
                    stats.total_expense += txn.amount;
                    stats.expense_count += 1;
                }
            }
            *stats.category_data.entry(txn.category_id).or_insert(0.0) += txn.amount;
        }
        stats.balance = stats.total_income - stats.total_expense;
        stats
    }

    /// Totals for one calendar month, or `None` for a month outside `1..=12`.
    pub fn monthly(ledger: &Ledger, year: i32, month: u32) -> Option<Statistics> {
        let (start, end) = month_bounds(year, month)?;
        let filter = TransactionFilter::new()
            .with_start_date(start)
            .with_end_date(end);
        Some(ledger.statistics(&filter))
    }

    /// Per-category rows with resolved names, largest amount first.
    pub fn category_breakdown(
        stats: &Statistics,
        lookup: &dyn CategoryLookup,
    ) -> Vec<CategoryShare> {
        let grand_total: f64 = stats.category_data.values().map(|amount| amount.abs()).sum();
        let mut rows: Vec<CategoryShare> = stats
            .category_data
            .iter()
            .map(|(category_id, amount)| CategoryShare {
                category_id: *category_id,
                name: category_name(lookup, *category_id),
                amount: *amount,
                share: if grand_total == 0.0 {
                    0.0
                } else {
                    amount.abs() / grand_total
                },
            })
            .collect();
        rows.sort_by(|a, b| b.amount.total_cmp(&a.amount));
        rows
    }
}
