mod common;

use std::sync::Arc;

use common::test_db;
use sql_expander::prelude::*;
use sql_expander::{ConnectionStatus, Diagnostics, TxStatus};

fn open(path: &str, sink: &MemorySink) -> Result<SqliteConnection, SqlExpanderError> {
    SqliteOptions::default()
        .with_verbose(true)
        .connect(path, Arc::new(sink.clone()))
}

#[test]
fn close_reports_whether_it_released_anything() -> Result<(), Box<dyn std::error::Error>> {
    let db = test_db("close");
    let sink = MemorySink::new();
    let mut conn = open(&db.path, &sink)?;
    assert!(conn.is_open());
    assert!(conn.close()?);
    assert_eq!(conn.status(), ConnectionStatus::Closed);
    assert!(!conn.close()?);
    assert!(sink.contains("[sqlite_con] Connection opened."));
    assert!(sink.contains("[sqlite_con] Database connection closed."));
    Ok(())
}

#[test]
fn open_failure_marks_status_error() {
    let db = test_db("open_fail");
    let mut conn = SqliteConnection::new(
        format!("{}/no/such/dir.db", db.path),
        Diagnostics::silent(),
    );
    let err = conn.open().unwrap_err();
    assert!(matches!(err, SqlExpanderError::ConnectionError(_)));
    assert_eq!(conn.status(), ConnectionStatus::Error);
}

#[test]
fn closed_connection_refuses_work() {
    let db = test_db("closed");
    let sink = MemorySink::new();
    let conn = SqliteConnection::new(db.path.clone(), Diagnostics::new(Arc::new(sink.clone()), false));
    assert!(matches!(
        conn.create_table("CREATE TABLE t (x INTEGER);"),
        Err(SqlExpanderError::ConnectionError(_))
    ));
    assert!(sink.contains("Database connection is closed"));
}

#[test]
fn transactions_are_idempotent() -> Result<(), Box<dyn std::error::Error>> {
    let db = test_db("tx");
    let sink = MemorySink::new();
    let conn = open(&db.path, &sink)?;
    conn.create_table("CREATE TABLE t (x INTEGER);")?;

    conn.commit()?;
    conn.begin()?;
    conn.begin()?;
    assert_eq!(conn.tx_status(), TxStatus::InTransaction);
    conn.insert_sql("INSERT INTO t VALUES (1);")?;
    conn.commit()?;
    conn.commit()?;
    assert_eq!(conn.tx_status(), TxStatus::Committed);

    conn.begin()?;
    conn.insert_sql("INSERT INTO t VALUES (2);")?;
    conn.rollback()?;
    conn.rollback()?;
    assert_eq!(conn.row_count("t")?, 1);
    Ok(())
}

#[test]
fn close_discards_open_transaction() -> Result<(), Box<dyn std::error::Error>> {
    let db = test_db("close_tx");
    let sink = MemorySink::new();
    let mut conn = open(&db.path, &sink)?;
    conn.create_table("CREATE TABLE t (x INTEGER);")?;
    conn.begin()?;
    conn.insert_sql("INSERT INTO t VALUES (1);")?;
    conn.close()?;
    assert!(sink.contains("Open transaction rolled back on close."));

    let conn = open(&db.path, &sink)?;
    assert_eq!(conn.row_count("t")?, 0);
    Ok(())
}

#[test]
fn drop_restores_durability_pragmas() -> Result<(), Box<dyn std::error::Error>> {
    let db = test_db("drop");
    let sink = MemorySink::new();
    {
        let conn = open(&db.path, &sink)?;
        assert_eq!(conn.set_journal_mode(JournalMode::Wal)?, "wal");
    }
    assert!(sink.contains("[sqlite_con] Destructed."));
    let conn = open(&db.path, &sink)?;
    assert_eq!(conn.journal_mode()?, "delete");
    Ok(())
}

#[test]
fn sync_mode_round_trips() -> Result<(), Box<dyn std::error::Error>> {
    let db = test_db("sync");
    let sink = MemorySink::new();
    let conn = open(&db.path, &sink)?;
    conn.set_sync(SyncMode::Off)?;
    assert_eq!(conn.get_sync()?, SyncMode::Off);
    conn.set_sync(SyncMode::Full)?;
    assert_eq!(conn.get_sync()?, SyncMode::Full);
    assert!(sink.contains("Synchronous status: FULL."));
    Ok(())
}

#[test]
fn ddl_errors_are_schema_errors() -> Result<(), Box<dyn std::error::Error>> {
    let db = test_db("ddl");
    let sink = MemorySink::new();
    let conn = open(&db.path, &sink)?;

    conn.drop_table("never_created")?;
    assert!(matches!(
        conn.create_table("CREATE TABLE broken (x INTEGER"),
        Err(SqlExpanderError::SchemaError(_))
    ));
    assert!(sink.contains("Create_table ERROR"));
    assert!(matches!(
        conn.create_index("idx", "missing", &["x"]),
        Err(SqlExpanderError::SchemaError(_))
    ));
    assert!(matches!(
        conn.create_index("idx", "missing", &[]),
        Err(SqlExpanderError::SchemaError(_))
    ));

    conn.create_table("CREATE TABLE t (x INTEGER, y TEXT);")?;
    conn.create_index("t_xy_idx", "t", &["x", "y"])?;
    conn.create_index("t_xy_idx", "t", &["x", "y"])?;
    assert!(sink.contains("Created index 't_xy_idx' on table 't'"));
    Ok(())
}

#[test]
fn scalar_query_requires_one_by_one() -> Result<(), Box<dyn std::error::Error>> {
    let db = test_db("scalar");
    let sink = MemorySink::new();
    let conn = open(&db.path, &sink)?;
    conn.execute_batch(
        "CREATE TABLE t (id INTEGER, v TEXT);
         INSERT INTO t VALUES (4, 'a'), (9, 'b');",
    )?;

    assert_eq!(conn.scalar_query("SELECT max(id) FROM t;")?, 9);
    assert!(matches!(
        conn.scalar_query("SELECT id, v FROM t WHERE id = 4;"),
        Err(SqlExpanderError::QueryShape { rows: 1, columns: 2 })
    ));
    assert!(matches!(
        conn.scalar_query("SELECT id FROM t;"),
        Err(SqlExpanderError::QueryShape { rows: 2, columns: 1 })
    ));
    assert!(matches!(
        conn.scalar_query("SELECT id FROM t WHERE id > 100;"),
        Err(SqlExpanderError::QueryShape { rows: 0, columns: 1 })
    ));
    assert_eq!(conn.max_id("t")?, 9);
    assert_eq!(conn.row_count("t")?, 2);

    conn.create_table("CREATE TABLE empty (id INTEGER);")?;
    assert_eq!(conn.max_id("empty")?, 0);
    Ok(())
}

#[test]
fn row_callback_sees_rows_in_order_and_can_abort() -> Result<(), Box<dyn std::error::Error>> {
    let db = test_db("callback");
    let sink = MemorySink::new();
    let conn = open(&db.path, &sink)?;
    conn.execute_batch(
        "CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT);
         INSERT INTO t VALUES (1, 'a'), (2, 'b'), (3, 'c');",
    )?;

    let mut names = Vec::new();
    let visited = conn.execute_with_row_callback("SELECT id, name FROM t;", |row| {
        names.push(row.get("name").and_then(RowValues::as_text).map(str::to_owned));
        ScanControl::Continue
    })?;
    assert_eq!(visited, 3);
    assert_eq!(
        names,
        [Some("a".to_string()), Some("b".to_string()), Some("c".to_string())]
    );

    let mut seen = 0;
    let err = conn
        .execute_with_row_callback("SELECT id FROM t;", |_| {
            seen += 1;
            if seen == 2 {
                ScanControl::Abort
            } else {
                ScanControl::Continue
            }
        })
        .unwrap_err();
    assert!(matches!(err, SqlExpanderError::ScanAborted { rows: 2 }));
    Ok(())
}

#[test]
fn insert_sql_returns_rowid() -> Result<(), Box<dyn std::error::Error>> {
    let db = test_db("insert");
    let sink = MemorySink::new();
    let conn = open(&db.path, &sink)?;
    conn.create_table("CREATE TABLE t (id INTEGER PRIMARY KEY, v TEXT);")?;
    assert_eq!(conn.insert_sql("INSERT INTO t (id, v) VALUES (41, 'x');")?, 41);
    assert_eq!(conn.insert_sql("INSERT INTO t (v) VALUES ('y');")?, 42);
    assert!(conn.insert_sql("INSERT INTO nowhere VALUES (1);").is_err());
    assert!(sink.contains("Database Insert ERROR"));
    Ok(())
}
