//! Database tests

use super::*;
use crate::error::Error;
use crate::models::*;

fn record(category: &str, date: &str, amount: f64) -> StoredRecord {
    StoredRecord {
        category: category.to_string(),
        date: Some(date.to_string()),
        amount: Some(amount),
    }
}

fn document(json: &str) -> UserDocument {
    serde_json::from_str(json).unwrap()
}

#[test]
fn test_in_memory_db() {
    let db = Database::in_memory().unwrap();
    assert!(db.list_users().unwrap().is_empty());
}

#[test]
fn test_schema_has_nullable_date_and_amount() {
    let db = Database::in_memory().unwrap();
    let conn = db.conn().unwrap();

    let nullable: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM pragma_table_info('transactions') WHERE name IN ('date', 'amount') AND \"notnull\" = 0",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(nullable, 2);
}

#[test]
fn test_upsert_user_is_idempotent() {
    let db = Database::in_memory().unwrap();

    db.upsert_user("user-1").unwrap();
    db.upsert_user("user-1").unwrap();

    assert!(db.user_exists("user-1").unwrap());
    assert!(!db.user_exists("user-2").unwrap());
    assert_eq!(db.list_users().unwrap().len(), 1);
}

#[test]
fn test_load_unknown_user_is_not_found() {
    let db = Database::in_memory().unwrap();
    let err = db.load_user_records("ghost").unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn test_known_user_without_records_loads_empty() {
    let db = Database::in_memory().unwrap();
    db.upsert_user("user-1").unwrap();
    assert!(db.load_user_records("user-1").unwrap().is_empty());
}

#[test]
fn test_insert_and_load_records() {
    let db = Database::in_memory().unwrap();

    let records = vec![
        record("Groceries", "2024-01-05", 42.5),
        record("Travel", "2024-01-06", 300.0),
    ];
    let inserted = db.insert_records("user-1", &records).unwrap();
    assert_eq!(inserted, 2);

    let loaded = db.load_user_records("user-1").unwrap();
    assert_eq!(loaded, records);
}

#[test]
fn test_missing_fields_round_trip_as_null() {
    let db = Database::in_memory().unwrap();

    let records = vec![StoredRecord {
        category: "Groceries".to_string(),
        date: None,
        amount: None,
    }];
    db.insert_records("user-1", &records).unwrap();

    let loaded = db.load_user_records("user-1").unwrap();
    assert_eq!(loaded[0].date, None);
    assert_eq!(loaded[0].amount, None);
}

#[test]
fn test_import_document_flattens_categories() {
    let db = Database::in_memory().unwrap();

    let count = db
        .import_user_document(
            "user-1",
            document(
                r#"{"transactions": {
                    "Groceries": [
                        {"date": "2024-01-01", "amount": 10.0},
                        {"date": "2024-01-02", "amount": 20.0}
                    ],
                    "Income": [{"date": "2024-01-01", "amount": 5000.0}]
                }}"#,
            ),
        )
        .unwrap();
    assert_eq!(count, 3);

    let loaded = db.load_user_records("user-1").unwrap();
    let groceries = loaded.iter().filter(|r| r.category == "Groceries").count();
    assert_eq!(groceries, 2);
    assert!(loaded.iter().any(|r| r.category == "Income"));
}

#[test]
fn test_import_replaces_previous_records() {
    let db = Database::in_memory().unwrap();

    db.import_user_document(
        "user-1",
        document(r#"{"transactions": {"Old": [{"date": "2023-01-01", "amount": 1.0}]}}"#),
    )
    .unwrap();
    db.import_user_document(
        "user-1",
        document(r#"{"transactions": {"New": [{"date": "2024-01-01", "amount": 2.0}]}}"#),
    )
    .unwrap();

    let loaded = db.load_user_records("user-1").unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].category, "New");
}

#[test]
fn test_import_keeps_users_separate() {
    let db = Database::in_memory().unwrap();

    db.insert_records("alice", &[record("Coffee", "2024-01-01", 4.0)])
        .unwrap();
    db.import_user_document(
        "bob",
        document(r#"{"transactions": {"Rent": [{"date": "2024-01-01", "amount": 1200.0}]}}"#),
    )
    .unwrap();

    assert_eq!(db.load_user_records("alice").unwrap().len(), 1);
    assert_eq!(db.load_user_records("bob").unwrap()[0].category, "Rent");
}

#[test]
fn test_list_users_counts_records() {
    let db = Database::in_memory().unwrap();

    db.upsert_user("empty").unwrap();
    db.insert_records(
        "busy",
        &[
            record("A", "2024-01-01", 1.0),
            record("B", "2024-01-02", 2.0),
        ],
    )
    .unwrap();

    let users = db.list_users().unwrap();
    assert_eq!(
        users,
        vec![
            UserSummary {
                id: "busy".to_string(),
                record_count: 2
            },
            UserSummary {
                id: "empty".to_string(),
                record_count: 0
            },
        ]
    );
}

#[test]
fn test_delete_user_cascades() {
    let db = Database::in_memory().unwrap();
    db.insert_records("user-1", &[record("A", "2024-01-01", 1.0)])
        .unwrap();

    assert!(db.delete_user("user-1").unwrap());
    assert!(!db.delete_user("user-1").unwrap());

    let conn = db.conn().unwrap();
    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))
        .unwrap();
    assert_eq!(remaining, 0);
}
