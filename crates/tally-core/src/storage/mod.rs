//! The narrow persistence contract the ledger depends on.
//!
//! Backends store flat [`Record`]s in named tables and answer structured
//! [`Predicate`]s. They never receive raw query text, and every table and
//! column name they see has been checked against [`table_columns`].

pub mod memory;

use std::{cmp::Ordering, collections::BTreeMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use memory::MemoryStorage;

/// Backend-assigned row identifier.
pub type RecordId = i64;

pub const TRANSACTIONS_TABLE: &str = "transactions";
pub const CATEGORIES_TABLE: &str = "categories";

/// Name of the implicit identifier column, usable in predicates.
pub const ID_COLUMN: &str = "id";

const TRANSACTION_COLUMNS: &[&str] = &["amount", "type", "category_id", "date", "note"];
const CATEGORY_COLUMNS: &[&str] = &["name", "icon", "type", "is_predefined"];

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("Backend error: {0}")]
    Backend(String),
    #[error("record {id} not found in `{table}`")]
    NotFound { table: String, id: RecordId },
    #[error("unknown table `{0}`")]
    UnknownTable(String),
    #[error("unknown column `{column}` in `{table}`")]
    UnknownColumn { table: String, column: String },
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serde(err.to_string())
    }
}

/// Abstraction over durable record stores.
///
/// Implementations must be safe to share between threads; the ledger
/// serializes its own mutations but may call `fetch` from several readers.
pub trait StorageBackend: Send + Sync {
    /// Inserts `record` (its `id` is ignored) and returns the assigned identifier.
    fn persist(&self, table: &str, record: &Record) -> Result<RecordId, StorageError>;

    /// Returns the rows matching `filter` (all rows when `None`), ordered by id.
    fn fetch(&self, table: &str, filter: Option<&Predicate>) -> Result<Vec<Record>, StorageError>;

    /// Overwrites every column of row `id`.
    fn replace(&self, table: &str, id: RecordId, record: &Record) -> Result<(), StorageError>;

    /// Deletes row `id`. Removing an unknown id succeeds without effect.
    fn remove(&self, table: &str, id: RecordId) -> Result<(), StorageError>;
}

/// Returns the columns of a known table.
pub fn table_columns(table: &str) -> Result<&'static [&'static str], StorageError> {
    match table {
        TRANSACTIONS_TABLE => Ok(TRANSACTION_COLUMNS),
        CATEGORIES_TABLE => Ok(CATEGORY_COLUMNS),
        other => Err(StorageError::UnknownTable(other.to_string())),
    }
}

/// Checks that every field of `record` is a column of `table`.
pub fn check_record(table: &str, record: &Record) -> Result<(), StorageError> {
    let columns = table_columns(table)?;
    for name in record.fields.keys() {
        if !columns.contains(&name.as_str()) {
            return Err(unknown_column(table, name));
        }
    }
    Ok(())
}

/// Checks that every field named by `predicate` is a column of `table` or `id`.
pub fn check_predicate(table: &str, predicate: &Predicate) -> Result<(), StorageError> {
    let columns = table_columns(table)?;
    for name in predicate.fields() {
        if name != ID_COLUMN && !columns.contains(&name) {
            return Err(unknown_column(table, name));
        }
    }
    Ok(())
}

fn unknown_column(table: &str, column: &str) -> StorageError {
    StorageError::UnknownColumn {
        table: table.to_string(),
        column: column.to_string(),
    }
}

/// A single column value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Numeric view; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(value) => Some(*value as f64),
            FieldValue::Real(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Orders numbers numerically and text lexicographically; mixed kinds do not compare.
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => Some(a.cmp(b)),
            (FieldValue::Integer(a), FieldValue::Integer(b)) => Some(a.cmp(b)),
            _ => self.as_f64()?.partial_cmp(&other.as_f64()?),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Real(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Integer(i64::from(value))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// One row: an optional identifier plus named column values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    /// Value of `name`; missing columns read as `Null`.
    pub fn get(&self, name: &str) -> &FieldValue {
        const NULL: &FieldValue = &FieldValue::Null;
        self.fields.get(name).unwrap_or(NULL)
    }

    /// Value used when evaluating predicates, where `id` is addressable like a column.
    fn lookup(&self, name: &str) -> FieldValue {
        if name == ID_COLUMN {
            return self.id.into();
        }
        self.get(name).clone()
    }
}

/// Structured filter understood by every backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    Eq { field: String, value: FieldValue },
    Ge { field: String, value: FieldValue },
    Le { field: String, value: FieldValue },
    Contains {
        field: String,
        needle: String,
        case_insensitive: bool,
    },
    /// Conjunction; an empty list matches every row.
    And(Vec<Predicate>),
}

impl Predicate {
    pub fn eq(field: &str, value: impl Into<FieldValue>) -> Self {
        Predicate::Eq {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn ge(field: &str, value: impl Into<FieldValue>) -> Self {
        Predicate::Ge {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn le(field: &str, value: impl Into<FieldValue>) -> Self {
        Predicate::Le {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn contains(field: &str, needle: impl Into<String>, case_insensitive: bool) -> Self {
        Predicate::Contains {
            field: field.to_string(),
            needle: needle.into(),
            case_insensitive,
        }
    }

    /// Every column name referenced by the predicate tree.
    pub fn fields(&self) -> Vec<&str> {
        match self {
            Predicate::Eq { field, .. }
            | Predicate::Ge { field, .. }
            | Predicate::Le { field, .. }
            | Predicate::Contains { field, .. } => vec![field.as_str()],
            Predicate::And(parts) => parts.iter().flat_map(Predicate::fields).collect(),
        }
    }

    /// Evaluates the predicate against an in-memory row.
    pub fn evaluate(&self, record: &Record) -> bool {
        match self {
            Predicate::Eq { field, value } => record.lookup(field) == *value,
            Predicate::Ge { field, value } => matches!(
                record.lookup(field).compare(value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Predicate::Le { field, value } => matches!(
                record.lookup(field).compare(value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Predicate::Contains {
                field,
                needle,
                case_insensitive,
            } => match record.lookup(field) {
                FieldValue::Text(text) if *case_insensitive => {
                    text.to_lowercase().contains(&needle.to_lowercase())
                }
                FieldValue::Text(text) => text.contains(needle.as_str()),
                _ => false,
            },
            Predicate::And(parts) => parts.iter().all(|part| part.evaluate(record)),
        }
    }
}
