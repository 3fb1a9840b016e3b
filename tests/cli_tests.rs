use std::{fs, path::Path};

use assert_cmd::Command;
use predicates::{prelude::*, str::contains};
use tempfile::{tempdir, TempDir};

fn workspace(backend: &str) -> TempDir {
    let dir = tempdir().expect("tempdir");
    let config = format!(
        r#"{{ "backend": "{backend}", "data_dir": {:?}, "log_filter": "tally=warn" }}"#,
        dir.path().join("data").display().to_string()
    );
    fs::write(dir.path().join("config.json"), config).unwrap();
    dir
}

fn tally(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tally").unwrap();
    cmd.env("TALLY_CONFIG", dir.join("config.json"))
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn add_query_summary_and_delete_flow() {
    let dir = workspace("json");

    tally(dir.path())
        .args(["add", "expense", "35", "--category", "1", "--note", "午餐费用"])
        .args(["--date", "2024-03-05"])
        .assert()
        .success()
        .stdout(contains("Added transaction #1"));
    tally(dir.path())
        .args(["add", "income", "8000", "--date", "2024-03-01"])
        .assert()
        .success();

    tally(dir.path())
        .args(["query", "--keyword", "午餐"])
        .assert()
        .success()
        .stdout(contains("午餐费用").and(contains("餐饮")).and(contains("1 transaction(s)")));

    tally(dir.path())
        .args(["summary", "2024-03"])
        .assert()
        .success()
        .stdout(contains("Balance:").and(contains("7965.00")));

    tally(dir.path())
        .args(["delete", "1"])
        .assert()
        .success()
        .stdout(contains("Deleted transaction #1"));
    tally(dir.path())
        .args(["delete", "1"])
        .assert()
        .success()
        .stdout(contains("nothing deleted"));
    tally(dir.path())
        .args(["query", "--min", "0"])
        .assert()
        .success()
        .stdout(contains("1 transaction(s)"));
}

#[test]
fn rejected_amounts_exit_with_failure() {
    let dir = workspace("sqlite");

    tally(dir.path())
        .args(["add", "expense", "inf"])
        .assert()
        .failure()
        .stderr(contains("Rejected"));
    tally(dir.path())
        .args(["add", "expense", "1000001"])
        .assert()
        .failure()
        .stderr(contains("exceeds the limit"));
    tally(dir.path())
        .args(["add", "expense", "1000000"])
        .assert()
        .success();
    tally(dir.path())
        .args(["latest"])
        .assert()
        .success()
        .stdout(contains("1000000.00"));
}

#[test]
fn export_and_backup_write_csv_files() {
    let dir = workspace("json");
    tally(dir.path())
        .args(["add", "expense", "12.5", "--note", "bus"])
        .assert()
        .success();

    let target = dir.path().join("export.csv");
    tally(dir.path())
        .args(["export", target.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("Exported 1 transaction(s)"));
    let csv = fs::read_to_string(&target).unwrap();
    assert!(csv.starts_with("date,type,category,amount,note"));
    assert!(csv.contains("expense,Uncategorized,12.5,bus"));

    tally(dir.path())
        .arg("backup")
        .assert()
        .success()
        .stdout(contains("Backup written to"));
    let backups: Vec<_> = fs::read_dir(dir.path().join("data").join("backups"))
        .unwrap()
        .collect();
    assert_eq!(backups.len(), 1);
}

#[test]
fn unknown_command_and_bad_input_fail() {
    let dir = workspace("memory");
    tally(dir.path())
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(contains("unknown command"));
    tally(dir.path())
        .args(["query", "--from"])
        .assert()
        .failure()
        .stderr(contains("needs a value"));
    tally(dir.path())
        .args(["add", "transfer", "10"])
        .assert()
        .failure();
    tally(dir.path()).assert().failure();
}

#[test]
fn categories_lists_by_kind() {
    let dir = workspace("json");
    tally(dir.path())
        .args(["categories", "expense"])
        .assert()
        .success()
        .stdout(contains("🍜 餐饮 (Expense)").and(contains("工资").not()));
    tally(dir.path())
        .arg("categories")
        .assert()
        .success()
        .stdout(contains("餐饮").and(contains("工资")));
    tally(dir.path())
        .args(["categories", "transfer"])
        .assert()
        .failure();
}

#[test]
fn export_honours_query_options() {
    let dir = workspace("sqlite");
    tally(dir.path())
        .args(["add", "expense", "35", "--category", "1", "--note", "lunch"])
        .args(["--date", "2024-03-05"])
        .assert()
        .success();
    tally(dir.path())
        .args(["add", "expense", "60", "--note", "taxi", "--date", "2024-04-02"])
        .assert()
        .success();
    tally(dir.path())
        .args(["add", "income", "8000", "--date", "2024-03-01"])
        .assert()
        .success();

    let target = dir.path().join("march.csv");
    tally(dir.path())
        .args(["export", target.to_str().unwrap()])
        .args(["--from", "2024-03-01", "--to", "2024-03-31", "--type", "expense"])
        .assert()
        .success()
        .stdout(contains("Exported 1 transaction(s)"));
    let csv = fs::read_to_string(&target).unwrap();
    assert!(csv.contains("lunch"));
    assert!(!csv.contains("taxi"));
    assert!(!csv.contains("8000"));

    tally(dir.path())
        .args(["export", target.to_str().unwrap(), "--bogus", "1"])
        .assert()
        .failure()
        .stderr(contains("unknown option"));
}

#[test]
fn category_flag_checks_integer_shape_only() {
    let dir = workspace("memory");
    tally(dir.path())
        .args(["add", "expense", "10", "--category", "food"])
        .assert()
        .failure()
        .stderr(contains("Rejected").and(contains("Invalid category reference")));
    tally(dir.path())
        .args(["add", "expense", "10", "--category", "0"])
        .assert()
        .success()
        .stdout(contains("Added transaction"));
    tally(dir.path())
        .args(["query", "--category", "food"])
        .assert()
        .failure()
        .stderr(contains("Rejected"));
}
