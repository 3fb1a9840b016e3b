use std::sync::Arc;

use chrono::NaiveDate;
use tally_core::{
    CategoryManager, Ledger, Predicate, RecordMapping, StorageBackend, StorageError, ToPredicate,
};
use tally_domain::{Transaction, TransactionFilter, TransactionKind};
use tally_storage_sqlite::SqliteStorage;
use tempfile::tempdir;

fn at(month: u32, day: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, month, day)
        .unwrap()
        .and_hms_opt(9, 15, 0)
        .unwrap()
}

#[test]
fn sqlite_storage_persists_across_connections() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("tally.db");
    let path = path.to_str().expect("utf-8 path");

    let id = {
        let storage = SqliteStorage::new(path).expect("open");
        storage
            .persist(
                Transaction::TABLE,
                &Transaction::expense(23.5)
                    .with_category(2)
                    .with_date(at(6, 1))
                    .with_note("metro card")
                    .to_record(),
            )
            .expect("persist")
    };

    let storage = SqliteStorage::new(path).expect("reopen");
    let rows = storage.fetch(Transaction::TABLE, None).expect("fetch");
    assert_eq!(rows.len(), 1);
    let txn = Transaction::from_record(&rows[0]).expect("map row");
    assert_eq!(txn.id, Some(id));
    assert_eq!(txn.amount, 23.5);
    assert_eq!(txn.kind, TransactionKind::Expense);
    assert_eq!(txn.category_id, Some(2));
    assert_eq!(txn.date, at(6, 1));
    assert_eq!(txn.note, "metro card");
}

#[test]
fn filter_predicate_agrees_with_in_memory_matching() {
    let storage = SqliteStorage::in_memory().expect("open");
    let txns = vec![
        Transaction::expense(10.0).with_date(at(1, 5)).with_category(1),
        Transaction::expense(50.0).with_date(at(2, 5)).with_note("Team lunch"),
        Transaction::income(100.0).with_date(at(2, 20)).with_category(1),
        Transaction::expense(200.0).with_date(at(3, 1)).with_category(1),
        Transaction::expense(500.0).with_date(at(3, 2)).with_note("午餐费用"),
    ];
    for txn in &txns {
        storage.persist(Transaction::TABLE, &txn.to_record()).unwrap();
    }

    let filters = vec![
        TransactionFilter::new(),
        TransactionFilter::new().with_min_amount(50.0).with_max_amount(150.0),
        TransactionFilter::new().with_days(at(2, 1).date(), at(2, 29).date()),
        TransactionFilter::new().with_category(1).with_kind(TransactionKind::Expense),
        TransactionFilter::new().with_keyword("LUNCH"),
        TransactionFilter::new().with_keyword("午餐"),
    ];
    for filter in filters {
        let expected: Vec<f64> = txns
            .iter()
            .filter(|txn| filter.matches(txn))
            .map(|txn| txn.amount)
            .collect();
        let actual: Vec<f64> = storage
            .fetch(Transaction::TABLE, Some(&filter.to_predicate()))
            .unwrap()
            .iter()
            .map(|row| Transaction::from_record(row).unwrap().amount)
            .collect();
        assert_eq!(actual, expected, "{filter:?}");
    }
}

#[test]
fn null_equality_selects_uncategorized_rows() {
    let storage = SqliteStorage::in_memory().unwrap();
    storage
        .persist(Transaction::TABLE, &Transaction::expense(1.0).to_record())
        .unwrap();
    storage
        .persist(
            Transaction::TABLE,
            &Transaction::expense(2.0).with_category(4).to_record(),
        )
        .unwrap();
    let rows = storage
        .fetch(
            Transaction::TABLE,
            Some(&Predicate::eq("category_id", None::<i64>)),
        )
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("amount").as_f64(), Some(1.0));
}

#[test]
fn replace_and_remove_follow_the_contract() {
    let storage = SqliteStorage::in_memory().unwrap();
    let id = storage
        .persist(Transaction::TABLE, &Transaction::expense(3.0).to_record())
        .unwrap();

    storage
        .replace(
            Transaction::TABLE,
            id,
            &Transaction::income(4.0).with_note("refund").to_record(),
        )
        .unwrap();
    let row = &storage.fetch(Transaction::TABLE, None).unwrap()[0];
    assert_eq!(row.get("type").as_str(), Some("income"));

    assert!(matches!(
        storage.replace(Transaction::TABLE, id + 7, &Transaction::expense(1.0).to_record()),
        Err(StorageError::NotFound { .. })
    ));

    storage.remove(Transaction::TABLE, id).unwrap();
    storage.remove(Transaction::TABLE, id).unwrap();
    assert!(storage.fetch(Transaction::TABLE, None).unwrap().is_empty());
}

#[test]
fn unknown_tables_and_columns_are_rejected() {
    let storage = SqliteStorage::in_memory().unwrap();
    assert!(matches!(
        storage.fetch("accounts", None),
        Err(StorageError::UnknownTable(_))
    ));
    assert!(matches!(
        storage.fetch(
            Transaction::TABLE,
            Some(&Predicate::eq("amount; DROP TABLE transactions", 1_i64))
        ),
        Err(StorageError::UnknownColumn { .. })
    ));
}

#[test]
fn ledger_and_categories_share_one_database() {
    let storage: Arc<dyn StorageBackend> = Arc::new(SqliteStorage::in_memory().unwrap());
    let categories = CategoryManager::load_seeded(storage.clone()).unwrap();
    let food = categories.list(Some(TransactionKind::Expense))[0]
        .id
        .expect("seeded id");

    let ledger = Ledger::open(storage.clone()).unwrap();
    ledger
        .add(Transaction::expense(35.0).with_category(food))
        .unwrap();
    assert_eq!(ledger.count(), 1);

    let reopened = Ledger::open(storage).unwrap();
    assert_eq!(reopened.transactions()[0].category_id, Some(food));
}
