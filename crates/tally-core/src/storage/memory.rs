use std::{
    collections::{BTreeMap, HashMap},
    sync::{PoisonError, RwLock},
};

use tracing::debug;

use super::{
    check_predicate, check_record, table_columns, Predicate, Record, RecordId, StorageBackend,
    StorageError,
};

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<RecordId, Record>,
    last_id: RecordId,
}

/// Volatile backend keeping every table in process memory.
///
/// Identifiers grow per table and are never reused, matching an
/// auto-increment primary key.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn persist(&self, table: &str, record: &Record) -> Result<RecordId, StorageError> {
        check_record(table, record)?;
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let entry = tables.entry(table.to_string()).or_default();
        entry.last_id += 1;
        let id = entry.last_id;
        let mut row = record.clone();
        row.id = Some(id);
        entry.rows.insert(id, row);
        debug!(table, id, "memory storage persisted row");
        Ok(id)
    }

    fn fetch(&self, table: &str, filter: Option<&Predicate>) -> Result<Vec<Record>, StorageError> {
        table_columns(table)?;
        if let Some(predicate) = filter {
            check_predicate(table, predicate)?;
        }
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        let Some(entry) = tables.get(table) else {
            return Ok(Vec::new());
        };
        Ok(entry
            .rows
            .values()
            .filter(|row| filter.map_or(true, |predicate| predicate.evaluate(row)))
            .cloned()
            .collect())
    }

    fn replace(&self, table: &str, id: RecordId, record: &Record) -> Result<(), StorageError> {
        check_record(table, record)?;
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let row = tables
            .get_mut(table)
            .and_then(|entry| entry.rows.get_mut(&id))
            .ok_or_else(|| StorageError::NotFound {
                table: table.to_string(),
                id,
            })?;
        *row = record.clone();
        row.id = Some(id);
        Ok(())
    }

    fn remove(&self, table: &str, id: RecordId) -> Result<(), StorageError> {
        table_columns(table)?;
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = tables.get_mut(table) {
            entry.rows.remove(&id);
        }
        Ok(())
    }
}
