use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf, str::FromStr};

const APP_DIR: &str = "Tally";
const JSON_FILE: &str = "tally.json";
const SQLITE_FILE: &str = "tally.db";

/// Storage engine the ledger is opened against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Volatile; nothing survives the process.
    Memory,
    Json,
    #[default]
    Sqlite,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BackendKind::Memory => "memory",
            BackendKind::Json => "json",
            BackendKind::Sqlite => "sqlite",
        };
        f.write_str(label)
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(BackendKind::Memory),
            "json" => Ok(BackendKind::Json),
            "sqlite" => Ok(BackendKind::Sqlite),
            other => Err(format!("unknown backend `{other}`")),
        }
    }
}

/// User-editable settings. Missing fields take their defaults and unknown
/// fields are ignored, so older files keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Directory holding the database file. Defaults to `<data dir>/Tally`.
    pub data_dir: Option<PathBuf>,

    #[serde(default = "Config::default_max_amount")]
    pub max_amount: f64,

    #[serde(default = "Config::default_latest_limit")]
    pub latest_limit: usize,

    #[serde(default = "Config::default_log_filter")]
    pub log_filter: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Target of CSV backups. Defaults to `<data_dir>/backups`.
    pub backup_dir: Option<PathBuf>,

    #[serde(default = "Config::default_seed_categories")]
    pub seed_categories: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            data_dir: None,
            max_amount: Self::default_max_amount(),
            latest_limit: Self::default_latest_limit(),
            log_filter: Self::default_log_filter(),
            backup_dir: None,
            seed_categories: Self::default_seed_categories(),
        }
    }
}

impl Config {
    pub fn default_max_amount() -> f64 {
        1_000_000.0
    }

    pub fn default_latest_limit() -> usize {
        10
    }

    pub fn default_log_filter() -> String {
        "tally=info".into()
    }

    pub fn default_seed_categories() -> bool {
        true
    }

    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(path) = &self.data_dir {
            return path.clone();
        }

        let base = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join(APP_DIR)
    }

    pub fn resolve_backup_dir(&self) -> PathBuf {
        if let Some(path) = &self.backup_dir {
            return path.clone();
        }
        self.resolve_data_dir().join("backups")
    }

    /// File the configured backend reads and writes; `None` for memory.
    pub fn storage_path(&self) -> Option<PathBuf> {
        let file = match self.backend {
            BackendKind::Memory => return None,
            BackendKind::Json => JSON_FILE,
            BackendKind::Sqlite => SQLITE_FILE,
        };
        Some(self.resolve_data_dir().join(file))
    }
}
