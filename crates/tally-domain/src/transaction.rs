//! Domain model for ledger transactions.

use std::{fmt, str::FromStr};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::common::*;

/// A single monetary movement recorded in the ledger.
///
/// `id` stays `None` until the storage backend assigns one; after that it is
/// never changed. Direction is carried by `kind`, not by the sign of `amount`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TransactionId>,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    pub date: NaiveDateTime,
    #[serde(default)]
    pub note: String,
}

impl Transaction {
    pub fn new(kind: TransactionKind, amount: f64) -> Self {
        Self {
            id: None,
            amount,
            kind,
            category_id: None,
            date: now(),
            note: String::new(),
        }
    }

    pub fn income(amount: f64) -> Self {
        Self::new(TransactionKind::Income, amount)
    }

    pub fn expense(amount: f64) -> Self {
        Self::new(TransactionKind::Expense, amount)
    }

    pub fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_date(mut self, date: NaiveDateTime) -> Self {
        self.date = truncate_to_seconds(date);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }
}

impl Displayable for Transaction {
    fn display_label(&self) -> String {
        let id = self
            .id
            .map(|id| format!("#{id}"))
            .unwrap_or_else(|| "#new".into());
        format!(
            "{} {} {} {:.2} {}",
            id,
            self.date.format(DATE_TIME_FORMAT),
            self.kind,
            self.amount,
            self.note
        )
        .trim_end()
        .to_string()
    }
}

/// Direction of a movement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    /// Label used in the persisted layout.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionKind::Income => "Income",
            TransactionKind::Expense => "Expense",
        };
        f.write_str(label)
    }
}

impl FromStr for TransactionKind {
    type Err = ParseKindError;

    /// Accepts the persisted labels in any case, plus the legacy `收入`/`支出` labels.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "收入" => return Ok(TransactionKind::Income),
            "支出" => return Ok(TransactionKind::Expense),
            _ => {}
        }
        match value.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            _ => Err(ParseKindError(value.to_string())),
        }
    }
}

/// Raised when a label does not name a [`TransactionKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseKindError(pub String);

impl fmt::Display for ParseKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown transaction type `{}`", self.0)
    }
}

impl std::error::Error for ParseKindError {}
