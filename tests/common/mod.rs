#![allow(dead_code)]

use rusqlite::{Connection, params};
use sql_expander::prelude::*;
use tempfile::{TempDir, tempdir};

/// A database file inside its own temporary directory; the directory lives as long as this.
pub struct TestDb {
    _dir: TempDir,
    pub path: String,
}

pub fn test_db(name: &str) -> TestDb {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join(format!("{name}.db")).to_string_lossy().into_owned();
    TestDb { _dir: dir, path }
}

pub struct SourceRow {
    pub id: i64,
    pub lo: Option<i64>,
    pub hi: Option<i64>,
    pub region: &'static str,
    pub amount: Option<f64>,
}

pub fn row(id: i64, lo: i64, hi: i64, region: &'static str, amount: f64) -> SourceRow {
    SourceRow {
        id,
        lo: Some(lo),
        hi: Some(hi),
        region,
        amount: Some(amount),
    }
}

/// `src (id, lo, hi, region TEXT, amount REAL)` filled with `rows`.
pub fn seed_source(path: &str, rows: &[SourceRow]) {
    let conn = Connection::open(path).expect("open source db");
    conn.execute_batch(
        "CREATE TABLE src (id INTEGER PRIMARY KEY, lo INTEGER, hi INTEGER, region TEXT, amount REAL);",
    )
    .expect("create src");
    let mut stmt = conn
        .prepare("INSERT INTO src (id, lo, hi, region, amount) VALUES (?1, ?2, ?3, ?4, ?5)")
        .expect("prepare src insert");
    for r in rows {
        stmt.execute(params![r.id, r.lo, r.hi, r.region, r.amount])
            .expect("insert src row");
    }
}

pub fn job(path: &str, target: &str) -> ExpandJob {
    ExpandJob::new(
        JobParams::from_slice(&[path, "src", target, "lo", "hi", "week"]).expect("params"),
        &["region".to_string()],
        &[SqlType::Text],
        &["amount".to_string()],
    )
    .expect("valid job")
}

#[derive(Debug, Clone, PartialEq)]
pub struct TargetRow {
    pub id: i64,
    pub rid: i64,
    pub week: String,
    pub region: Option<String>,
    pub amount: Option<f64>,
}

/// Target rows in insertion (id) order.
pub fn read_target(path: &str, target: &str) -> Vec<TargetRow> {
    let conn = Connection::open(path).expect("open target db");
    let mut stmt = conn
        .prepare(&format!(
            "SELECT id, rid, week, region, amount FROM {target} ORDER BY id"
        ))
        .expect("prepare target select");
    stmt.query_map([], |r| {
        Ok(TargetRow {
            id: r.get(0)?,
            rid: r.get(1)?,
            week: r.get(2)?,
            region: r.get(3)?,
            amount: r.get(4)?,
        })
    })
    .expect("query target")
    .collect::<Result<Vec<_>, _>>()
    .expect("read target rows")
}

pub fn table_exists(path: &str, name: &str) -> bool {
    let conn = Connection::open(path).expect("open db");
    conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE name = ?1",
        [name],
        |r| r.get::<_, i64>(0),
    )
    .expect("query sqlite_master")
        > 0
}
