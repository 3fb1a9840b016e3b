use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use serde::{Deserialize, Serialize};
use tally_core::storage::{
    check_predicate, check_record, table_columns, Predicate, Record, RecordId, StorageBackend,
    StorageError,
};
use tracing::{debug, info};

const TMP_SUFFIX: &str = "tmp";

/// File-backed storage keeping every table in a single JSON document.
///
/// The document is held in memory and rewritten in full after each
/// mutation. Writes go to a sibling temp file that is renamed over the
/// target, so a crash leaves either the old or the new document.
pub struct JsonFileStorage {
    path: PathBuf,
    document: Mutex<Document>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    tables: BTreeMap<String, Table>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Table {
    #[serde(default)]
    last_id: RecordId,
    #[serde(default)]
    rows: Vec<Record>,
}

impl JsonFileStorage {
    /// Opens `path`, starting from an empty document when the file is absent.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let document = if path.exists() {
            let document = load_document(&path)?;
            info!(path = %path.display(), "opened json storage");
            document
        } else {
            info!(path = %path.display(), "creating json storage");
            Document::default()
        };
        Ok(Self {
            path,
            document: Mutex::new(document),
        })
    }

    /// Applies `change` to a copy of the document and commits it only after
    /// the copy reached disk.
    fn mutate<T>(
        &self,
        change: impl FnOnce(&mut Document) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let mut document = self.document.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = document.clone();
        let outcome = change(&mut next)?;
        save_document(&next, &self.path)?;
        *document = next;
        Ok(outcome)
    }
}

impl StorageBackend for JsonFileStorage {
    fn persist(&self, table: &str, record: &Record) -> Result<RecordId, StorageError> {
        check_record(table, record)?;
        let id = self.mutate(|document| {
            let entry = document.tables.entry(table.to_string()).or_default();
            entry.last_id += 1;
            let mut row = record.clone();
            row.id = Some(entry.last_id);
            entry.rows.push(row);
            Ok(entry.last_id)
        })?;
        debug!(table, id, "json storage persisted row");
        Ok(id)
    }

    fn fetch(&self, table: &str, filter: Option<&Predicate>) -> Result<Vec<Record>, StorageError> {
        table_columns(table)?;
        if let Some(predicate) = filter {
            check_predicate(table, predicate)?;
        }
        let document = self.document.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(entry) = document.tables.get(table) else {
            return Ok(Vec::new());
        };
        Ok(entry
            .rows
            .iter()
            .filter(|row| filter.map_or(true, |predicate| predicate.evaluate(row)))
            .cloned()
            .collect())
    }

    fn replace(&self, table: &str, id: RecordId, record: &Record) -> Result<(), StorageError> {
        check_record(table, record)?;
        self.mutate(|document| {
            let row = document
                .tables
                .get_mut(table)
                .and_then(|entry| entry.rows.iter_mut().find(|row| row.id == Some(id)))
                .ok_or_else(|| StorageError::NotFound {
                    table: table.to_string(),
                    id,
                })?;
            *row = record.clone();
            row.id = Some(id);
            Ok(())
        })
    }

    fn remove(&self, table: &str, id: RecordId) -> Result<(), StorageError> {
        table_columns(table)?;
        let present = {
            let document = self.document.lock().unwrap_or_else(PoisonError::into_inner);
            document
                .tables
                .get(table)
                .is_some_and(|entry| entry.rows.iter().any(|row| row.id == Some(id)))
        };
        if !present {
            return Ok(());
        }
        self.mutate(|document| {
            if let Some(entry) = document.tables.get_mut(table) {
                entry.rows.retain(|row| row.id != Some(id));
            }
            Ok(())
        })?;
        debug!(table, id, "json storage removed row");
        Ok(())
    }
}

fn load_document(path: &Path) -> Result<Document, StorageError> {
    let data = fs::read_to_string(path)?;
    if data.trim().is_empty() {
        return Ok(Document::default());
    }
    let document: Document = serde_json::from_str(&data)?;
    for (name, table) in &document.tables {
        table_columns(name)?;
        if table.rows.iter().any(|row| row.id.is_none()) {
            return Err(StorageError::Corrupt(format!(
                "row without id in table `{name}`"
            )));
        }
    }
    Ok(document)
}

fn save_document(document: &Document, path: &Path) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    write_atomic(&tmp, &serde_json::to_string_pretty(document)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), StorageError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    file.sync_all()?;
    Ok(())
}
