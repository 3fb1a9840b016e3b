//! SQLite backend for Tally.
//!
//! Tables mirror the record schema checked by `tally_core::storage`; every
//! predicate is translated into parameterized SQL over whitelisted columns.

use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::{params, params_from_iter, types::Value, Connection};
use tally_core::storage::{
    check_predicate, check_record, table_columns, FieldValue, Predicate, Record, RecordId,
    StorageBackend, StorageError, ID_COLUMN,
};
use tracing::{debug, info};

const MEMORY_PATH: &str = ":memory:";

pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Opens (or creates) the database at `path`; `":memory:"` opens a
    /// private in-memory database.
    pub fn new(path: &str) -> Result<Self, StorageError> {
        let conn = if path == MEMORY_PATH {
            Connection::open_in_memory()
        } else {
            Connection::open(path)
        }
        .map_err(backend)?;

        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.init_schema()?;
        info!(path, "opened sqlite storage");
        Ok(storage)
    }

    pub fn in_memory() -> Result<Self, StorageError> {
        Self::new(MEMORY_PATH)
    }

    fn init_schema(&self) -> Result<(), StorageError> {
        let conn = self.lock();
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                amount REAL NOT NULL,
                type TEXT NOT NULL,
                category_id INTEGER,
                date TEXT NOT NULL,
                note TEXT
            );

            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                icon TEXT,
                type TEXT NOT NULL,
                is_predefined INTEGER DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_transactions_date
                ON transactions(date);
            ",
        )
        .map_err(backend)?;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StorageBackend for SqliteStorage {
    fn persist(&self, table: &str, record: &Record) -> Result<RecordId, StorageError> {
        check_record(table, record)?;
        let columns = table_columns(table)?;
        let sql = format!(
            "INSERT INTO {table} ({}) VALUES ({})",
            quoted(columns).join(", "),
            vec!["?"; columns.len()].join(", ")
        );
        let conn = self.lock();
        conn.execute(&sql, params_from_iter(column_values(columns, record)))
            .map_err(backend)?;
        let id = conn.last_insert_rowid();
        debug!(table, id, "sqlite storage persisted row");
        Ok(id)
    }

    fn fetch(&self, table: &str, filter: Option<&Predicate>) -> Result<Vec<Record>, StorageError> {
        let columns = table_columns(table)?;
        let mut sql = format!("SELECT {ID_COLUMN}, {} FROM {table}", quoted(columns).join(", "));
        let mut values = Vec::new();
        if let Some(predicate) = filter {
            check_predicate(table, predicate)?;
            sql.push_str(" WHERE ");
            sql.push_str(&to_sql(predicate, &mut values));
        }
        sql.push_str(&format!(" ORDER BY {ID_COLUMN}"));

        let conn = self.lock();
        let mut stmt = conn.prepare(&sql).map_err(backend)?;
        let rows = stmt
            .query_map(params_from_iter(values), |row| {
                let mut record = Record::new().with_id(row.get(0)?);
                for (index, column) in columns.iter().enumerate() {
                    let value: Value = row.get(index + 1)?;
                    record = record.with(column, from_sql(value));
                }
                Ok(record)
            })
            .map_err(backend)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(backend)
    }

    fn replace(&self, table: &str, id: RecordId, record: &Record) -> Result<(), StorageError> {
        check_record(table, record)?;
        let columns = table_columns(table)?;
        let assignments: Vec<String> = quoted(columns)
            .into_iter()
            .map(|column| format!("{column} = ?"))
            .collect();
        let sql = format!(
            "UPDATE {table} SET {} WHERE {ID_COLUMN} = ?",
            assignments.join(", ")
        );
        let mut values = column_values(columns, record);
        values.push(Value::Integer(id));
        let changed = self
            .lock()
            .execute(&sql, params_from_iter(values))
            .map_err(backend)?;
        if changed == 0 {
            return Err(StorageError::NotFound {
                table: table.to_string(),
                id,
            });
        }
        Ok(())
    }

    fn remove(&self, table: &str, id: RecordId) -> Result<(), StorageError> {
        table_columns(table)?;
        let sql = format!("DELETE FROM {table} WHERE {ID_COLUMN} = ?1");
        let removed = self.lock().execute(&sql, params![id]).map_err(backend)?;
        debug!(table, id, removed, "sqlite storage removed row");
        Ok(())
    }
}

fn backend(err: rusqlite::Error) -> StorageError {
    StorageError::Backend(err.to_string())
}

fn quoted(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|column| format!("\"{column}\"")).collect()
}

fn column_values(columns: &[&str], record: &Record) -> Vec<Value> {
    columns
        .iter()
        .map(|column| to_value(record.get(column)))
        .collect()
}

fn to_value(field: &FieldValue) -> Value {
    match field {
        FieldValue::Null => Value::Null,
        FieldValue::Integer(value) => Value::Integer(*value),
        FieldValue::Real(value) => Value::Real(*value),
        FieldValue::Text(value) => Value::Text(value.clone()),
    }
}

fn from_sql(value: Value) -> FieldValue {
    match value {
        Value::Null => FieldValue::Null,
        Value::Integer(value) => FieldValue::Integer(value),
        Value::Real(value) => FieldValue::Real(value),
        Value::Text(value) => FieldValue::Text(value),
        Value::Blob(bytes) => FieldValue::Text(String::from_utf8_lossy(&bytes).into_owned()),
    }
}

/// Renders `predicate` as a SQL condition, pushing bound values in order.
/// Column names must already be checked against the table schema.
fn to_sql(predicate: &Predicate, values: &mut Vec<Value>) -> String {
    match predicate {
        Predicate::Eq {
            field,
            value: FieldValue::Null,
        } => format!("\"{field}\" IS NULL"),
        Predicate::Eq { field, value } => {
            values.push(to_value(value));
            format!("\"{field}\" = ?")
        }
        Predicate::Ge { field, value } => {
            values.push(to_value(value));
            format!("\"{field}\" >= ?")
        }
        Predicate::Le { field, value } => {
            values.push(to_value(value));
            format!("\"{field}\" <= ?")
        }
        Predicate::Contains {
            field,
            needle,
            case_insensitive,
        } => {
            values.push(Value::Text(needle.clone()));
            if *case_insensitive {
                // lower() folds ASCII only.
                format!("instr(lower(\"{field}\"), lower(?)) > 0")
            } else {
                format!("instr(\"{field}\", ?) > 0")
            }
        }
        Predicate::And(parts) if parts.is_empty() => "1 = 1".to_string(),
        Predicate::And(parts) => {
            let clauses: Vec<String> = parts.iter().map(|part| to_sql(part, values)).collect();
            format!("({})", clauses.join(" AND "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_conjunction_binds_values_in_order() {
        let predicate = Predicate::And(vec![
            Predicate::ge("amount", 10.0),
            Predicate::eq("category_id", FieldValue::Null),
            Predicate::contains("note", "Lunch", true),
        ]);
        let mut values = Vec::new();
        let sql = to_sql(&predicate, &mut values);
        assert_eq!(
            sql,
            "(\"amount\" >= ? AND \"category_id\" IS NULL AND instr(lower(\"note\"), lower(?)) > 0)"
        );
        assert_eq!(
            values,
            vec![Value::Real(10.0), Value::Text("Lunch".to_string())]
        );
    }

    #[test]
    fn empty_conjunction_matches_everything() {
        let mut values = Vec::new();
        assert_eq!(to_sql(&Predicate::And(Vec::new()), &mut values), "1 = 1");
        assert!(values.is_empty());
    }
}
