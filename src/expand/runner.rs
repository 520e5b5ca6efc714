use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio::task::spawn_blocking;

use crate::diagnostics::{DiagnosticSink, Diagnostics};
use crate::error::SqlExpanderError;
use crate::sqlite::config::SqliteOptions;
use crate::sqlite::connection::SqliteConnection;
use crate::types::SyncMode;

use super::job::ExpandJob;
use super::schema::{RowLayout, create_table_sql, insert_sql, select_sql};
use super::transform::{ExpandStats, ExpansionTransform};

/// Outcome of a committed expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpandReport {
    pub db_path: String,
    pub source_table: String,
    pub target_table: String,
    /// Rows in the target table as committed.
    pub target_rows: u64,
    #[serde(flatten)]
    pub stats: ExpandStats,
    pub rid_index: Option<String>,
    /// Problems met after the commit. The rows above are in place regardless.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Expand `job.source_table` into a freshly created `job.target_table`.
///
/// The target is dropped and recreated, then every source row with a range `[lo, hi]` becomes
/// `hi - lo + 1` target rows inside a single transaction. On any job-fatal error the
/// transaction is rolled back and the session closed before the error is returned, so the
/// target table is either fully written or left empty.
///
/// # Errors
/// Returns `SqlExpanderError` if the database cannot be opened, the target cannot be
/// (re)created, the INSERT cannot be prepared, the scan fails or is halted by a hard engine
/// error, the rid index cannot be built, or the transaction cannot be committed. Once the
/// commit succeeds the job succeeds; later trouble lands in [`ExpandReport::warnings`].
pub fn expand_table(
    job: &ExpandJob,
    opts: &SqliteOptions,
    sink: Arc<dyn DiagnosticSink>,
) -> Result<ExpandReport, SqlExpanderError> {
    let started = Instant::now();
    tracing::info!(
        db_path = %job.db_path(),
        source = %job.source_table(),
        target = %job.target_table(),
        "expand_table started"
    );

    let diag = Diagnostics::new(sink, opts.verbose);
    diag.status(format_args!("[expand_table] Opening Database"));
    let mut conn = SqliteConnection::new(job.db_path(), diag.clone());
    if let Err(err) = conn.open() {
        diag.error(format_args!(
            "[expand_table] Could not open SQLite database '{}'.",
            job.db_path()
        ));
        return Err(err);
    }

    match run(&conn, job, opts, &diag) {
        Ok(Committed {
            stats,
            target_rows,
            mut warnings,
        }) => {
            diag.status(format_args!("[expand_table] Closing database."));
            if let Err(err) = conn.close() {
                diag.error(format_args!("[expand_table] Database closing error!"));
                tracing::warn!(error = %err, "close after commit");
                warnings.push(format!("closing the database failed: {err}"));
            }
            diag.status(format_args!("[expand_table] Finished."));
            tracing::info!(
                target = %job.target_table(),
                source_rows = stats.source_rows,
                emitted_rows = stats.emitted_rows,
                failed_steps = stats.failed_steps,
                elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                "expand_table finished"
            );
            Ok(ExpandReport {
                db_path: job.db_path().to_owned(),
                source_table: job.source_table().to_owned(),
                target_table: job.target_table().to_owned(),
                target_rows,
                stats,
                rid_index: job.index_rid().then(|| job.rid_index_name()),
                warnings,
            })
        }
        Err(err) => {
            if let Err(rollback_err) = conn.rollback() {
                tracing::warn!(error = %rollback_err, "rollback after failed expansion");
            }
            if let Err(close_err) = conn.close() {
                tracing::warn!(error = %close_err, "close after failed expansion");
            }
            tracing::warn!(target = %job.target_table(), error = %err, "expand_table failed");
            Err(err)
        }
    }
}

/// Run [`expand_table`] on the blocking pool. The expansion itself stays single-threaded.
///
/// # Errors
/// Returns whatever [`expand_table`] returns, or `SqlExpanderError::ExecutionError` if the
/// blocking task panicked or was cancelled.
pub async fn expand_table_async(
    job: ExpandJob,
    opts: SqliteOptions,
    sink: Arc<dyn DiagnosticSink>,
) -> Result<ExpandReport, SqlExpanderError> {
    spawn_blocking(move || expand_table(&job, &opts, sink))
        .await
        .map_err(|e| {
            SqlExpanderError::ExecutionError(format!("expand_table spawn_blocking join error: {e}"))
        })?
}

/// What [`run`] hands back once the transaction is committed.
struct Committed {
    stats: ExpandStats,
    target_rows: u64,
    warnings: Vec<String>,
}

fn run(
    conn: &SqliteConnection,
    job: &ExpandJob,
    opts: &SqliteOptions,
    diag: &Diagnostics,
) -> Result<Committed, SqlExpanderError> {
    if let Err(err) = conn.set_sync(opts.bulk_sync) {
        diag.error(format_args!(
            "[expand_table] Cannot set database to asynchronous state!"
        ));
        return Err(err);
    }
    if let Some(mode) = opts.bulk_journal_mode {
        conn.set_journal_mode(mode)?;
    }

    let target = job.target_table();
    conn.drop_table(target)?;
    diag.status(format_args!("[expand_table] Drop table success."));

    let ddl = create_table_sql(job);
    diag.status(format_args!("[expand_table] SQL: '{ddl}'"));
    conn.create_table(&ddl)?;
    diag.status(format_args!("[expand_table] Create table success."));

    let insert = insert_sql(job);
    diag.status(format_args!("[expand_table] SQL: '{insert}'"));
    let mut stmt = conn.prepare_statement(&insert)?;

    if let Some(seed_table) = job.seed_ids_from() {
        let last = conn.max_id(seed_table)?;
        stmt.set_auto_id(last);
        diag.status(format_args!(
            "[expand_table] Ids continue after {last} (max id of '{seed_table}')."
        ));
    }

    let select = select_sql(job);
    diag.status(format_args!("[expand_table] SQL: '{select}'"));

    conn.begin()?;
    let mut transform = ExpansionTransform::new(&mut stmt, RowLayout::for_job(job));
    let scanned = conn.execute_with_row_callback(&select, |row| transform.on_row(row));
    let stats = transform.conclude(scanned)?;
    stmt.finalize()?;

    if stats.inverted_ranges > 0 || stats.skipped_rows > 0 || stats.failed_steps > 0 {
        diag.error(format_args!(
            "[expand_table] {} inverted range(s), {} skipped row(s), {} failed insert(s).",
            stats.inverted_ranges, stats.skipped_rows, stats.failed_steps
        ));
    }

    if job.index_rid() {
        conn.create_index(&job.rid_index_name(), target, &["rid"])?;
    }

    let target_rows = conn.row_count(target)?;
    if target_rows != stats.emitted_rows {
        diag.error(format_args!(
            "[expand_table] Target table '{target}' holds {target_rows} row(s), expected {}.",
            stats.emitted_rows
        ));
        return Err(SqlExpanderError::ExecutionError(format!(
            "target table '{target}' holds {target_rows} rows, {} were inserted",
            stats.emitted_rows
        )));
    }
    conn.commit()?;

    // Rows are durable from here on; nothing below fails the job.
    let mut warnings = Vec::new();
    if let Err(err) = conn.set_sync(SyncMode::Full) {
        tracing::warn!(error = %err, "restoring synchronous=FULL after commit");
        warnings.push(format!("restoring synchronous=FULL failed: {err}"));
    }
    Ok(Committed {
        stats,
        target_rows,
        warnings,
    })
}
