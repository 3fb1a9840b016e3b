//! The single conversion step between typed entities and storage rows.

use chrono::NaiveDateTime;
use tally_domain::{Category, Transaction, TransactionKind, DATE_TIME_FORMAT};

use crate::storage::{Record, StorageError, CATEGORIES_TABLE, TRANSACTIONS_TABLE};

/// Entities that live in a storage table.
pub trait RecordMapping: Sized {
    const TABLE: &'static str;

    /// Row holding every column; the id travels separately.
    fn to_record(&self) -> Record;

    /// Rebuilds the entity, failing on missing or mistyped columns.
    fn from_record(record: &Record) -> Result<Self, StorageError>;
}

impl RecordMapping for Transaction {
    const TABLE: &'static str = TRANSACTIONS_TABLE;

    fn to_record(&self) -> Record {
        Record::new()
            .with("amount", self.amount)
            .with("type", self.kind.as_str())
            .with("category_id", self.category_id)
            .with("date", self.date.format(DATE_TIME_FORMAT).to_string())
            .with("note", self.note.as_str())
    }

    fn from_record(record: &Record) -> Result<Self, StorageError> {
        let id = record
            .id
            .ok_or_else(|| corrupt(Self::TABLE, record, "row has no id"))?;
        let amount = record
            .get("amount")
            .as_f64()
            .filter(|amount| amount.is_finite())
            .ok_or_else(|| corrupt(Self::TABLE, record, "amount is missing or not finite"))?;
        let kind = parse_kind(Self::TABLE, record)?;
        let category_id = optional_integer(Self::TABLE, record, "category_id")?;
        let date = record
            .get("date")
            .as_str()
            .and_then(|raw| NaiveDateTime::parse_from_str(raw, DATE_TIME_FORMAT).ok())
            .ok_or_else(|| corrupt(Self::TABLE, record, "date is missing or malformed"))?;
        let note = record.get("note").as_str().unwrap_or_default().to_string();

        Ok(Transaction {
            id: Some(id),
            amount,
            kind,
            category_id,
            date,
            note,
        })
    }
}

impl RecordMapping for Category {
    const TABLE: &'static str = CATEGORIES_TABLE;

    fn to_record(&self) -> Record {
        Record::new()
            .with("name", self.name.as_str())
            .with("icon", self.icon.as_str())
            .with("type", self.kind.as_str())
            .with("is_predefined", self.is_predefined)
    }

    fn from_record(record: &Record) -> Result<Self, StorageError> {
        let id = record
            .id
            .ok_or_else(|| corrupt(Self::TABLE, record, "row has no id"))?;
        let name = record
            .get("name")
            .as_str()
            .ok_or_else(|| corrupt(Self::TABLE, record, "name is missing"))?
            .to_string();
        let icon = record.get("icon").as_str().unwrap_or_default().to_string();
        let kind = parse_kind(Self::TABLE, record)?;
        let is_predefined = optional_integer(Self::TABLE, record, "is_predefined")?.unwrap_or(0) != 0;

        Ok(Category {
            id: Some(id),
            name,
            icon,
            kind,
            is_predefined,
        })
    }
}

fn parse_kind(table: &str, record: &Record) -> Result<TransactionKind, StorageError> {
    record
        .get("type")
        .as_str()
        .and_then(|raw| raw.parse().ok())
        .ok_or_else(|| corrupt(table, record, "type is missing or unknown"))
}

fn optional_integer(table: &str, record: &Record, column: &str) -> Result<Option<i64>, StorageError> {
    let value = record.get(column);
    if value.is_null() {
        return Ok(None);
    }
    value
        .as_i64()
        .map(Some)
        .ok_or_else(|| corrupt(table, record, &format!("{column} is not an integer")))
}

fn corrupt(table: &str, record: &Record, reason: &str) -> StorageError {
    let id = record
        .id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "?".into());
    StorageError::Corrupt(format!("{table} row {id}: {reason}"))
}
