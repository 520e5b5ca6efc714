//! Criterion timing of a full expansion run: drop, create, scan, insert, commit.
//!
//! Source rows are generated once per size from a fixed seed, so every run expands the same
//! ranges. Set `BENCH_ROWS` to override the largest source size.

use std::hint::black_box;
use std::path::Path;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rusqlite::{Connection, params};
use sql_expander::prelude::*;
use tempfile::tempdir;

const REGIONS: [&str; 4] = ["north", "south", "east", "west"];

fn max_source_rows() -> usize {
    std::env::var("BENCH_ROWS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(2_000)
}

/// Fill `src` with `rows` ranges of 1..=8 weeks each. Returns the number of rows expansion
/// will write.
fn prepare_source(path: &Path, rows: usize) -> rusqlite::Result<u64> {
    let mut conn = Connection::open(path)?;
    conn.execute_batch(
        "DROP TABLE IF EXISTS src;
         CREATE TABLE src (id INTEGER PRIMARY KEY, lo INTEGER, hi INTEGER,
                           region TEXT, units INTEGER, amount REAL, weight REAL);",
    )?;

    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut expanded = 0u64;
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO src (id, lo, hi, region, units, amount, weight)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for id in 1..=rows {
            let lo: i64 = rng.random_range(1..=52);
            let hi = lo + rng.random_range(0..8);
            expanded += u64::try_from(hi - lo + 1).unwrap_or(0);
            stmt.execute(params![
                i64::try_from(id).unwrap_or(i64::MAX),
                lo,
                hi,
                REGIONS[rng.random_range(0..REGIONS.len())],
                rng.random_range(1..1_000i64),
                rng.random_range(0.0..10_000.0f64),
                rng.random_range(0.0..1.0f64),
            ])?;
        }
    }
    tx.commit()?;
    Ok(expanded)
}

fn expand_job(path: &str) -> ExpandJob {
    ExpandJob::from_strings(
        &[path, "src", "dst", "lo", "hi", "week"],
        &["region".to_string(), "units".to_string()],
        &["TEXT".to_string(), "INTEGER".to_string()],
        &["amount".to_string(), "weight".to_string()],
    )
    .expect("valid benchmark job")
}

fn expand_benchmark(c: &mut Criterion) {
    let dir = tempdir().expect("tempdir");
    let mut group = c.benchmark_group("expand_table");
    group.sample_size(10);

    let max_rows = max_source_rows();
    for rows in [max_rows / 10, max_rows] {
        let rows = rows.max(1);
        let db_path = dir.path().join(format!("expand_{rows}.db"));
        let expanded = prepare_source(&db_path, rows).expect("prepare source table");
        let path = db_path.to_string_lossy().into_owned();
        let job = expand_job(&path);
        group.throughput(Throughput::Elements(expanded));

        for (label, opts) in [
            ("sync_off", SqliteOptions::default()),
            (
                "sync_off_memory_journal",
                SqliteOptions::builder()
                    .bulk_journal_mode(Some(JournalMode::Memory))
                    .finish(),
            ),
        ] {
            group.bench_with_input(BenchmarkId::new(label, rows), &job, |b, job| {
                b.iter(|| {
                    let report =
                        expand_table(job, &opts, Arc::new(NullSink)).expect("expansion run");
                    black_box(report.target_rows)
                });
            });
        }
    }
    group.finish();
}

criterion_group!(benches, expand_benchmark);
criterion_main!(benches);
