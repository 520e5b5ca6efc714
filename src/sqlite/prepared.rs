use rusqlite::ToSql;

use crate::error::{SqlExpanderError, describe};
use crate::types::RowValues;

use super::connection::SqliteConnection;
use super::params::row_value_to_sqlite_value;

/// Lifecycle of a prepared statement. `Finalized` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementStatus {
    Unprepared,
    Prepared,
    Finalized,
}

/// One compiled, positional-parameter statement borrowed from a [`SqliteConnection`].
///
/// Prepare once, then bind and [`step`](Self::step) as often as needed: each step resets the
/// statement but keeps its bindings, so only changed parameters need rebinding.
///
/// The statement also carries an auto-increment counter ([`next_auto_id`](Self::next_auto_id)).
/// It starts at 1 for every statement and is only unique within one run; it is not seeded from
/// existing data unless the caller does so with [`set_auto_id`](Self::set_auto_id).
pub struct SqlitePreparedStatement<'conn> {
    conn: &'conn SqliteConnection,
    stmt: Option<rusqlite::Statement<'conn>>,
    sql: String,
    status: StatementStatus,
    auto_id: u64,
}

impl<'conn> SqlitePreparedStatement<'conn> {
    #[must_use]
    pub fn new(conn: &'conn SqliteConnection) -> Self {
        Self {
            conn,
            stmt: None,
            sql: String::new(),
            status: StatementStatus::Unprepared,
            auto_id: 0,
        }
    }

    /// Compile `sql`. A compile failure finalizes the statement; it is not retried.
    ///
    /// # Errors
    /// Returns `SqlExpanderError::StatementError` if the statement is not `Unprepared`, the
    /// connection is closed, or the SQL does not compile.
    pub fn prepare(&mut self, sql: &str) -> Result<(), SqlExpanderError> {
        let conn = self.conn;
        match self.status {
            StatementStatus::Unprepared => {}
            StatementStatus::Prepared => {
                conn.diag.error(format_args!(
                    "[sqlite_stmt] prepare error: statement is already prepared!"
                ));
                return Err(SqlExpanderError::StatementError(
                    "statement is already prepared".into(),
                ));
            }
            StatementStatus::Finalized => {
                conn.diag.error(format_args!(
                    "[sqlite_stmt] prepare error: stmt_status=STMT_FINALIZED!"
                ));
                return Err(SqlExpanderError::StatementError(
                    "statement is finalized".into(),
                ));
            }
        }

        let raw = match conn.raw("prepare") {
            Ok(raw) => raw,
            Err(err) => {
                self.status = StatementStatus::Finalized;
                return Err(err);
            }
        };
        match raw.prepare(sql) {
            Ok(stmt) => {
                self.stmt = Some(stmt);
                sql.clone_into(&mut self.sql);
                self.status = StatementStatus::Prepared;
                Ok(())
            }
            Err(err) => {
                self.status = StatementStatus::Finalized;
                let detail = describe(&err);
                conn.diag
                    .error(format_args!("[sqlite_stmt] prepare error: {detail}"));
                conn.diag.error(format_args!("sql: {sql}"));
                Err(SqlExpanderError::StatementError(format!(
                    "prepare failed: {detail}"
                )))
            }
        }
    }

    /// Bind a 64-bit integer to the 1-based parameter `pos`.
    ///
    /// # Errors
    /// Returns `SqlExpanderError` if the statement is not prepared or `pos` is out of range.
    pub fn bind_int(&mut self, pos: usize, value: i64) -> Result<(), SqlExpanderError> {
        self.bind(pos, value, "bind_int")
    }

    /// Bind a double to the 1-based parameter `pos`.
    ///
    /// # Errors
    /// Returns `SqlExpanderError` if the statement is not prepared or `pos` is out of range.
    pub fn bind_real(&mut self, pos: usize, value: f64) -> Result<(), SqlExpanderError> {
        self.bind(pos, value, "bind_double")
    }

    /// Bind text to the 1-based parameter `pos`.
    ///
    /// # Errors
    /// Returns `SqlExpanderError` if the statement is not prepared or `pos` is out of range.
    pub fn bind_text(&mut self, pos: usize, value: &str) -> Result<(), SqlExpanderError> {
        self.bind(pos, value, "bind_text")
    }

    /// Bind NULL to the 1-based parameter `pos`.
    ///
    /// # Errors
    /// Returns `SqlExpanderError` if the statement is not prepared or `pos` is out of range.
    pub fn bind_null(&mut self, pos: usize) -> Result<(), SqlExpanderError> {
        self.bind(pos, rusqlite::types::Null, "bind_null")
    }

    /// Bind a value in its own storage class.
    ///
    /// # Errors
    /// Returns `SqlExpanderError` if the statement is not prepared or `pos` is out of range.
    pub fn bind_value(&mut self, pos: usize, value: &RowValues) -> Result<(), SqlExpanderError> {
        self.bind(pos, row_value_to_sqlite_value(value), "bind_value")
    }

    /// Execute once and reset for reuse; bindings are kept.
    ///
    /// # Errors
    /// Returns `SqlExpanderError` if the statement is not prepared or the engine rejects the row.
    pub fn step(&mut self) -> Result<(), SqlExpanderError> {
        let conn = self.conn;
        let stmt = self.live_statement("step")?;
        match stmt.raw_execute() {
            Ok(_) => Ok(()),
            Err(err) => {
                conn.diag
                    .error(format_args!("[sqlite_stmt] step error: {}", describe(&err)));
                Err(SqlExpanderError::SqliteError(err))
            }
        }
    }

    /// Bind each of `values` in turn to `pos` and step once per value. Stops at the first
    /// failure; rows stepped before it stay inserted.
    ///
    /// # Errors
    /// Returns `SqlExpanderError::StatementError` naming the position `i` in `values` and the
    /// value `v[i]` that failed to bind or step.
    pub fn step_each(&mut self, pos: usize, values: &[i64]) -> Result<(), SqlExpanderError> {
        let conn = self.conn;
        let stmt = self.live_statement("step_each")?;
        for (i, &v) in values.iter().enumerate() {
            let (stage, outcome) = match stmt.raw_bind_parameter(pos, v) {
                Ok(()) => ("step", stmt.raw_execute().map(|_| ())),
                Err(err) => ("bind", Err(err)),
            };
            if let Err(err) = outcome {
                let detail = describe(&err);
                conn.diag.error(format_args!(
                    "[sqlite_stmt] step_each {stage} ERROR i={i} and v[i]={v}: {detail}"
                ));
                return Err(SqlExpanderError::StatementError(format!(
                    "step_each {stage} failed at i={i}, v[i]={v}: {detail}"
                )));
            }
        }
        Ok(())
    }

    /// Next value of the per-statement counter: 1, 2, 3, ...
    pub fn next_auto_id(&mut self) -> u64 {
        self.auto_id += 1;
        self.auto_id
    }

    /// Reset the counter so that the next id is `last + 1`.
    pub fn set_auto_id(&mut self, last: u64) {
        self.auto_id = last;
    }

    /// Last id handed out (0 before the first call).
    #[must_use]
    pub fn auto_id(&self) -> u64 {
        self.auto_id
    }

    /// Release the compiled statement. Idempotent.
    ///
    /// # Errors
    /// Returns `SqlExpanderError` if the engine reports an error while finalizing; the
    /// statement is finalized regardless.
    pub fn finalize(&mut self) -> Result<(), SqlExpanderError> {
        self.status = StatementStatus::Finalized;
        let Some(stmt) = self.stmt.take() else {
            return Ok(());
        };
        stmt.finalize().map_err(|err| {
            self.conn
                .diag
                .error(format_args!("[sqlite_stmt] Finalize ERROR: {}", describe(&err)));
            SqlExpanderError::StatementError(format!("finalize failed: {err}"))
        })
    }

    #[must_use]
    pub fn status(&self) -> StatementStatus {
        self.status
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Number of positional parameters, 0 unless prepared.
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.stmt
            .as_ref()
            .map_or(0, rusqlite::Statement::parameter_count)
    }

    #[must_use]
    pub fn connection(&self) -> &'conn SqliteConnection {
        self.conn
    }

    fn bind<T: ToSql>(&mut self, pos: usize, value: T, ctx: &str) -> Result<(), SqlExpanderError> {
        let conn = self.conn;
        let stmt = self.live_statement(ctx)?;
        stmt.raw_bind_parameter(pos, value).map_err(|err| {
            conn.diag
                .error(format_args!("[sqlite_stmt] {ctx} ERROR: {}", describe(&err)));
            SqlExpanderError::SqliteError(err)
        })
    }

    fn live_statement(
        &mut self,
        ctx: &str,
    ) -> Result<&mut rusqlite::Statement<'conn>, SqlExpanderError> {
        let conn = self.conn;
        match (self.status, self.stmt.as_mut()) {
            (StatementStatus::Prepared, Some(stmt)) => Ok(stmt),
            (StatementStatus::Finalized, _) => {
                conn.diag.error(format_args!(
                    "[sqlite_stmt] {ctx} ERROR: Statement is FINALIZED!"
                ));
                Err(SqlExpanderError::StatementError(format!(
                    "{ctx}: statement is finalized"
                )))
            }
            _ => {
                conn.diag.error(format_args!(
                    "[sqlite_stmt] {ctx} NOT EXECUTED because stmt_status!=STMT_PREPARED!"
                ));
                Err(SqlExpanderError::StatementError(format!(
                    "{ctx}: statement is not prepared"
                )))
            }
        }
    }
}

impl std::fmt::Debug for SqlitePreparedStatement<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlitePreparedStatement")
            .field("sql", &self.sql)
            .field("status", &self.status)
            .field("auto_id", &self.auto_id)
            .finish()
    }
}
