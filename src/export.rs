//! CSV export and timestamped backups.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use tally_core::{category_name, CategoryLookup};
use tally_domain::{now, Transaction, DATE_TIME_FORMAT};
use tracing::info;

use crate::errors::TallyError;

pub const CSV_HEADER: [&str; 5] = ["date", "type", "category", "amount", "note"];
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Writes `transactions` as CSV with category names resolved through
/// `categories`. Returns the number of data rows written.
pub fn export_csv<W: Write>(
    writer: W,
    transactions: &[Transaction],
    categories: &dyn CategoryLookup,
) -> Result<usize, TallyError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(CSV_HEADER)?;
    for txn in transactions {
        csv_writer.write_record([
            txn.date.format(DATE_TIME_FORMAT).to_string(),
            txn.kind.as_str().to_string(),
            category_name(categories, txn.category_id),
            txn.amount.to_string(),
            txn.note.clone(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(transactions.len())
}

pub fn export_csv_file(
    path: &Path,
    transactions: &[Transaction],
    categories: &dyn CategoryLookup,
) -> Result<usize, TallyError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let rows = export_csv(BufWriter::new(File::create(path)?), transactions, categories)?;
    info!(path = %path.display(), rows, "exported transactions");
    Ok(rows)
}

/// Exports everything to `<dir>/backup_<YYYYmmdd_HHMMSS>.csv`.
pub fn backup_csv(
    dir: &Path,
    transactions: &[Transaction],
    categories: &dyn CategoryLookup,
) -> Result<PathBuf, TallyError> {
    fs::create_dir_all(dir)?;
    let stamp = now().format(BACKUP_TIMESTAMP_FORMAT);
    let path = dir.join(format!("backup_{stamp}.csv"));
    export_csv_file(&path, transactions, categories)?;
    Ok(path)
}
