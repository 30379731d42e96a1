#![allow(clippy::unwrap_used)]

use super::*;
use crate::models::{total, Category, Details};
use rust_decimal_macros::dec;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
}

fn food(amount: Decimal, on: &str, restaurant: &str) -> Expense {
    Expense::new(
        amount,
        date(on),
        None,
        Details::Food {
            restaurant: restaurant.into(),
        },
    )
}

fn travel(amount: Decimal, on: &str, destination: &str, mode: &str) -> Expense {
    Expense::new(
        amount,
        date(on),
        Some("trip".into()),
        Details::Travel {
            destination: destination.into(),
            transport_mode: mode.into(),
        },
    )
}

fn utility(amount: Decimal, on: &str, kind: &str) -> Expense {
    Expense::new(
        amount,
        date(on),
        None,
        Details::Utility {
            utility_type: kind.into(),
        },
    )
}

/// Raw `(category, details)` columns for a row.
fn stored_columns(db: &Database, id: i64) -> (String, String) {
    db.conn
        .query_row(
            "SELECT category, details FROM expenses WHERE id = ?1",
            params![id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap()
}

fn row_count(db: &Database) -> i64 {
    db.conn
        .query_row("SELECT COUNT(*) FROM expenses", [], |row| row.get(0))
        .unwrap()
}

// ── Schema ────────────────────────────────────────────────────

#[test]
fn test_fresh_database_is_empty() {
    let db = Database::open_in_memory().unwrap();
    assert!(db.read_all().unwrap().is_empty());
    let version: i32 = db
        .conn
        .query_row("SELECT version FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, schema::CURRENT_VERSION);
}

#[test]
fn test_reopen_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("expenses.db");

    let db = Database::open(&path).unwrap();
    let saved = db.create(&food(dec!(4.20), "2024-03-01", "Bakery")).unwrap();
    db.close().unwrap();

    let db = Database::open(&path).unwrap();
    let all = db.read_all().unwrap();
    assert_eq!(all, vec![saved]);
    let versions: i64 = db
        .conn
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(versions, 1);
}

// ── create ────────────────────────────────────────────────────

#[test]
fn test_create_assigns_fresh_ids() {
    let db = Database::open_in_memory().unwrap();
    let a = db.create(&food(dec!(1), "2024-01-01", "A")).unwrap();
    let b = db.create(&food(dec!(2), "2024-01-02", "B")).unwrap();
    let a_id = a.id.unwrap();
    let b_id = b.id.unwrap();
    assert!(a_id > 0);
    assert!(b_id > 0);
    assert_ne!(a_id, b_id);
}

#[test]
fn test_create_ignores_existing_id() {
    let db = Database::open_in_memory().unwrap();
    let first = db.create(&food(dec!(1), "2024-01-01", "A")).unwrap();
    let again = db.create(&first).unwrap();
    assert_ne!(first.id, again.id);
    assert_eq!(row_count(&db), 2);
}

#[test]
fn test_ids_not_reused_after_delete() {
    let db = Database::open_in_memory().unwrap();
    let a = db.create(&food(dec!(1), "2024-01-01", "A")).unwrap();
    db.delete(a.id.unwrap()).unwrap();
    let b = db.create(&food(dec!(1), "2024-01-01", "B")).unwrap();
    assert!(b.id.unwrap() > a.id.unwrap());
}

#[test]
fn test_create_stores_packed_details() {
    let db = Database::open_in_memory().unwrap();
    let t = db
        .create(&travel(dec!(99), "2024-02-10", "Berlin", "Bus"))
        .unwrap();
    assert_eq!(
        stored_columns(&db, t.id.unwrap()),
        ("Travel".to_string(), "Berlin, Bus".to_string())
    );
}

#[test]
fn test_description_none_is_stored_as_null() {
    let db = Database::open_in_memory().unwrap();
    let e = db.create(&utility(dec!(60), "2024-02-01", "Water")).unwrap();
    let is_null: bool = db
        .conn
        .query_row(
            "SELECT description IS NULL FROM expenses WHERE id = ?1",
            params![e.id],
            |row| row.get(0),
        )
        .unwrap();
    assert!(is_null);
    assert_eq!(db.read_all().unwrap()[0].description, None);
}

// ── read_all ──────────────────────────────────────────────────

#[test]
fn test_read_all_orders_by_date_desc() {
    let db = Database::open_in_memory().unwrap();
    db.create(&food(dec!(1), "2024-01-10", "Mid")).unwrap();
    db.create(&food(dec!(1), "2023-12-31", "Old")).unwrap();
    db.create(&food(dec!(1), "2024-02-01", "New")).unwrap();

    let dates: Vec<String> = db
        .read_all()
        .unwrap()
        .iter()
        .map(|e| e.date.format(DATE_FORMAT).to_string())
        .collect();
    assert_eq!(dates, vec!["2024-02-01", "2024-01-10", "2023-12-31"]);
}

#[test]
fn test_read_all_same_date_newest_first() {
    let db = Database::open_in_memory().unwrap();
    let first = db.create(&food(dec!(1), "2024-01-10", "First")).unwrap();
    let second = db.create(&food(dec!(2), "2024-01-10", "Second")).unwrap();
    let all = db.read_all().unwrap();
    assert_eq!(all[0].id, second.id);
    assert_eq!(all[1].id, first.id);
}

#[test]
fn test_read_all_decodes_every_category() {
    let db = Database::open_in_memory().unwrap();
    let f = db.create(&food(dec!(12.50), "2024-01-03", "Cafe X")).unwrap();
    let t = db
        .create(&travel(dec!(250), "2024-01-02", "Paris", "Train"))
        .unwrap();
    let u = db
        .create(&utility(dec!(80.15), "2024-01-01", "Electricity"))
        .unwrap();

    assert_eq!(db.read_all().unwrap(), vec![f, t, u]);
}

#[test]
fn test_read_all_skips_unknown_category() {
    let db = Database::open_in_memory().unwrap();
    db.create(&food(dec!(5), "2024-01-01", "Diner")).unwrap();
    db.conn
        .execute(
            "INSERT INTO expenses (amount, date, description, category, details)
             VALUES ('7.00', '2024-01-02', NULL, 'Groceries', 'Market')",
            [],
        )
        .unwrap();
    let bad_id = db.conn.last_insert_rowid();

    let listing = db.read_all_checked().unwrap();
    assert_eq!(listing.expenses.len(), 1);
    assert_eq!(listing.expenses[0].category(), Category::Food);
    assert_eq!(listing.skipped.len(), 1);
    assert_eq!(listing.skipped[0].id, bad_id);
    assert_eq!(
        listing.skipped[0].error,
        ExpenseError::UnknownCategory("Groceries".into())
    );
}

#[test]
fn test_read_all_skips_bad_amount_and_date() {
    let db = Database::open_in_memory().unwrap();
    db.conn
        .execute_batch(
            "INSERT INTO expenses (amount, date, category, details) VALUES ('abc', '2024-01-02', 'Food', 'X');
             INSERT INTO expenses (amount, date, category, details) VALUES ('3.00', '02/01/2024', 'Food', 'Y');
             INSERT INTO expenses (amount, date, category, details) VALUES ('3.00', '2024-01-02', 'Food', 'Z');",
        )
        .unwrap();

    let listing = db.read_all_checked().unwrap();
    assert_eq!(listing.expenses.len(), 1);
    assert_eq!(listing.skipped.len(), 2);
    assert!(listing
        .skipped
        .iter()
        .all(|s| matches!(s.error, ExpenseError::Validation(_))));
}

#[test]
fn test_read_all_skips_row_with_non_text_column() {
    let db = Database::open_in_memory().unwrap();
    let kept = db.create(&food(dec!(10), "2024-01-01", "Cafe X")).unwrap();
    db.conn
        .execute(
            "INSERT INTO expenses (amount, date, category, details)
             VALUES ('4.00', '2024-01-02', 'Food', X'00FF')",
            [],
        )
        .unwrap();

    let listing = db.read_all_checked().unwrap();
    assert_eq!(listing.expenses.len(), 1);
    assert_eq!(listing.expenses[0].id, kept.id);
    assert_eq!(listing.skipped.len(), 1);
    assert_ne!(listing.skipped[0].id, kept.id.unwrap());
    assert!(matches!(
        listing.skipped[0].error,
        ExpenseError::Validation(_)
    ));
}

#[test]
fn test_read_all_lenient_travel_details() {
    let db = Database::open_in_memory().unwrap();
    db.conn
        .execute(
            "INSERT INTO expenses (amount, date, category, details)
             VALUES ('40', '2024-05-05', 'Travel', 'BadFormatNoComma')",
            [],
        )
        .unwrap();

    let all = db.read_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(
        all[0].details,
        Details::Travel {
            destination: String::new(),
            transport_mode: String::new(),
        }
    );
}

// ── update ────────────────────────────────────────────────────

#[test]
fn test_update_replaces_fields() {
    let db = Database::open_in_memory().unwrap();
    let saved = db.create(&food(dec!(10), "2024-01-01", "Old")).unwrap();
    let mut changed = saved.clone();
    changed.amount = dec!(11.75);
    changed.date = date("2024-01-09");
    changed.description = Some("dinner".into());
    changed.details = Details::Food {
        restaurant: "New".into(),
    };
    db.update(&changed).unwrap();
    assert_eq!(db.read_all().unwrap(), vec![changed]);
}

#[test]
fn test_update_can_change_category() {
    let db = Database::open_in_memory().unwrap();
    let saved = db.create(&utility(dec!(30), "2024-01-01", "Gas")).unwrap();
    let id = saved.id.unwrap();
    let moved = travel(dec!(30), "2024-01-01", "Lyon", "Car").with_id(id);
    db.update(&moved).unwrap();

    assert_eq!(
        stored_columns(&db, id),
        ("Travel".to_string(), "Lyon, Car".to_string())
    );
    assert_eq!(db.read_all().unwrap(), vec![moved]);
}

#[test]
fn test_update_missing_id_fails_and_leaves_store_unchanged() {
    let db = Database::open_in_memory().unwrap();
    let saved = db.create(&food(dec!(10), "2024-01-01", "Kept")).unwrap();

    let ghost = food(dec!(99), "2024-01-01", "Ghost").with_id(9999);
    assert_eq!(
        db.update(&ghost),
        Err(ExpenseError::InvalidReference(Some(9999)))
    );
    assert_eq!(db.read_all().unwrap(), vec![saved]);
}

#[test]
fn test_update_unsaved_or_non_positive_id() {
    let db = Database::open_in_memory().unwrap();
    let unsaved = food(dec!(1), "2024-01-01", "X");
    assert_eq!(
        db.update(&unsaved),
        Err(ExpenseError::InvalidReference(None))
    );
    assert_eq!(
        db.update(&unsaved.clone().with_id(0)),
        Err(ExpenseError::InvalidReference(Some(0)))
    );
    assert_eq!(
        db.update(&unsaved.with_id(-1)),
        Err(ExpenseError::InvalidReference(Some(-1)))
    );
}

// ── delete ────────────────────────────────────────────────────

#[test]
fn test_delete_removes_row() {
    let db = Database::open_in_memory().unwrap();
    let a = db.create(&food(dec!(1), "2024-01-01", "A")).unwrap();
    let b = db.create(&food(dec!(2), "2024-01-02", "B")).unwrap();
    db.delete(a.id.unwrap()).unwrap();
    assert_eq!(db.read_all().unwrap(), vec![b]);
}

#[test]
fn test_delete_missing_id_fails() {
    let db = Database::open_in_memory().unwrap();
    assert_eq!(
        db.delete(12345),
        Err(ExpenseError::InvalidReference(Some(12345)))
    );
}

#[test]
fn test_delete_twice_fails_second_time() {
    let db = Database::open_in_memory().unwrap();
    let id = db
        .create(&food(dec!(1), "2024-01-01", "A"))
        .unwrap()
        .id
        .unwrap();
    db.delete(id).unwrap();
    assert_eq!(db.delete(id), Err(ExpenseError::InvalidReference(Some(id))));
}

// ── Full lifecycle ────────────────────────────────────────────

#[test]
fn test_food_to_travel_lifecycle() {
    let db = Database::open_in_memory().unwrap();

    let saved = db
        .create(&food(dec!(12.50), "2024-01-05", "Cafe X"))
        .unwrap();
    let id = saved.id.unwrap();
    let all = db.read_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].category(), Category::Food);
    assert_eq!(
        stored_columns(&db, id),
        ("Food".to_string(), "Cafe X".to_string())
    );

    let moved = Expense {
        details: Details::Travel {
            destination: "Paris".into(),
            transport_mode: "Train".into(),
        },
        ..saved
    };
    db.update(&moved).unwrap();
    let all = db.read_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, Some(id));
    assert_eq!(all[0].category(), Category::Travel);
    assert_eq!(
        stored_columns(&db, id),
        ("Travel".to_string(), "Paris, Train".to_string())
    );

    db.delete(id).unwrap();
    assert!(db.read_all().unwrap().is_empty());
}

#[test]
fn test_total_of_loaded_expenses() {
    let db = Database::open_in_memory().unwrap();
    db.create(&food(dec!(10), "2024-01-01", "A")).unwrap();
    db.create(&utility(dec!(5.5), "2024-01-02", "Internet"))
        .unwrap();
    assert_eq!(total(&db.read_all().unwrap()), dec!(15.5));
}

// ── Export ─────────────────────────────────────────────────────

#[test]
fn test_export_to_csv() {
    let db = Database::open_in_memory().unwrap();
    db.create(&food(dec!(12.5), "2024-01-05", "Cafe X")).unwrap();
    db.create(&travel(dec!(300), "2024-01-06", "Paris", "Train"))
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    let count = db.export_to_csv(&path).unwrap();
    assert_eq!(count, 2);

    let mut rdr = csv::Reader::from_path(&path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["Id", "Type", "Amount", "Date", "Description", "Details"]
    );
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][1], "Travel");
    assert_eq!(&rows[0][2], "300.00");
    assert_eq!(&rows[0][4], "trip");
    assert_eq!(&rows[0][5], "Paris, Train");
    assert_eq!(&rows[1][1], "Food");
    assert_eq!(&rows[1][2], "12.50");
    assert_eq!(&rows[1][4], "");
}

#[test]
fn test_export_empty() {
    let db = Database::open_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.csv");
    assert_eq!(db.export_to_csv(&path).unwrap(), 0);
    assert!(path.exists());
}

// ── Write failures ────────────────────────────────────────────

#[test]
fn test_create_rejected_by_database_is_persistence_error() {
    let db = Database::open_in_memory().unwrap();
    db.conn
        .execute_batch(
            "CREATE TRIGGER reject_insert BEFORE INSERT ON expenses
             BEGIN SELECT RAISE(ABORT, 'disk full'); END;",
        )
        .unwrap();

    let err = db.create(&food(dec!(5), "2024-01-01", "Cafe X")).unwrap_err();
    assert!(matches!(err, ExpenseError::Persistence(_)));
    assert!(err.to_string().contains("disk full"));
    assert_eq!(row_count(&db), 0);
}

#[test]
fn test_create_without_table_is_persistence_error() {
    let db = Database::open_in_memory().unwrap();
    db.conn.execute_batch("DROP TABLE expenses").unwrap();

    let err = db.create(&food(dec!(5), "2024-01-01", "Cafe X")).unwrap_err();
    assert!(matches!(err, ExpenseError::Persistence(_)));
}
