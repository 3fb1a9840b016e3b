use std::{fs, path::PathBuf};

use tally_config::{BackendKind, Config, ConfigError, ConfigManager};
use tempfile::tempdir;

#[test]
fn default_config_matches_documented_values() {
    let cfg = Config::default();

    assert_eq!(cfg.backend, BackendKind::Sqlite);
    assert_eq!(cfg.max_amount, 1_000_000.0);
    assert_eq!(cfg.latest_limit, 10);
    assert_eq!(cfg.log_filter, "tally=info");
    assert!(cfg.seed_categories);
    assert!(cfg.resolve_data_dir().ends_with("Tally"));
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().join("nested")).expect("manager");

    let cfg = Config {
        backend: BackendKind::Json,
        data_dir: Some(dir.path().join("data")),
        max_amount: 500.0,
        latest_limit: 3,
        ..Config::default()
    };

    manager.save(&cfg).expect("save config");
    assert!(!manager.config_path().with_extension("json.tmp").exists());
    let loaded = manager.load().expect("load config");

    assert_eq!(loaded, cfg);
}

#[test]
fn missing_file_yields_defaults() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("absent.json"));
    assert_eq!(manager.load().expect("defaults"), Config::default());
}

#[test]
fn partial_file_fills_defaults_and_ignores_unknown_fields() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{ "backend": "memory", "data_dir": "/tmp/tally", "theme": "dark" }"#,
    )
    .unwrap();

    let loaded = ConfigManager::new(path).load().expect("load");
    assert_eq!(loaded.backend, BackendKind::Memory);
    assert_eq!(loaded.data_dir, Some(PathBuf::from("/tmp/tally")));
    assert_eq!(loaded.latest_limit, 10);
    assert_eq!(loaded.resolve_backup_dir(), PathBuf::from("/tmp/tally/backups"));
}

#[test]
fn malformed_file_is_a_serde_error() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    fs::write(&path, "backend = sqlite").unwrap();
    assert!(matches!(
        ConfigManager::new(path).load(),
        Err(ConfigError::Serde(_))
    ));
}
