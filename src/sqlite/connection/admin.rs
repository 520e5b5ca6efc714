use crate::error::{SqlExpanderError, describe};
use crate::types::{JournalMode, SyncMode};

use super::SqliteConnection;

pub(super) fn apply_sync(conn: &rusqlite::Connection, mode: SyncMode) -> rusqlite::Result<()> {
    conn.execute_batch(&format!("PRAGMA synchronous={};", mode.pragma_value()))
}

/// Returns the journal mode the engine reports after the change.
pub(super) fn apply_journal_mode(
    conn: &rusqlite::Connection,
    mode: JournalMode,
) -> rusqlite::Result<String> {
    conn.query_row(&format!("PRAGMA journal_mode={};", mode.as_str()), [], |row| {
        row.get::<_, String>(0)
    })
}

impl SqliteConnection {
    /// Set `PRAGMA synchronous`.
    ///
    /// # Errors
    /// Returns `SqlExpanderError::ConnectionError` if the pragma cannot be applied.
    pub fn set_sync(&self, mode: SyncMode) -> Result<(), SqlExpanderError> {
        let conn = self.raw("set_sync")?;
        match apply_sync(conn, mode) {
            Ok(()) => {
                self.diag
                    .status(format_args!("[sqlite_con] Synchronous status: {mode}."));
                Ok(())
            }
            Err(err) => {
                let detail = describe(&err);
                self.diag
                    .error(format_args!("[sqlite_con] set_sync ERROR: {detail}"));
                Err(SqlExpanderError::ConnectionError(format!(
                    "cannot set synchronous={mode}: {detail}"
                )))
            }
        }
    }

    /// Read the current `PRAGMA synchronous` value.
    ///
    /// # Errors
    /// Returns `SqlExpanderError` if the pragma cannot be read or reports an unknown level.
    pub fn get_sync(&self) -> Result<SyncMode, SqlExpanderError> {
        let conn = self.raw("get_sync")?;
        let level: i64 = conn.query_row("PRAGMA synchronous;", [], |row| row.get(0))?;
        SyncMode::from_pragma(level).ok_or_else(|| {
            SqlExpanderError::ExecutionError(format!("unknown synchronous level {level}"))
        })
    }

    /// Set `PRAGMA journal_mode` and return the mode the engine settled on.
    ///
    /// The engine may keep a different mode (e.g. in-memory databases stay in MEMORY); that is
    /// reported as a status line, not an error.
    ///
    /// # Errors
    /// Returns `SqlExpanderError::ConnectionError` if the pragma fails.
    pub fn set_journal_mode(&self, mode: JournalMode) -> Result<String, SqlExpanderError> {
        let conn = self.raw("set_con_journal")?;
        match apply_journal_mode(conn, mode) {
            Ok(reported) => {
                if JournalMode::from_reported(&reported) == Some(mode) {
                    self.diag
                        .status(format_args!("[sqlite_con] Journal mode: {mode}"));
                } else {
                    self.diag.status(format_args!(
                        "[sqlite_con] Journal mode: requested {mode}, engine kept {reported}"
                    ));
                }
                Ok(reported)
            }
            Err(err) => {
                let detail = describe(&err);
                self.diag
                    .error(format_args!("[sqlite_con] set_con_journal ERROR: {detail}"));
                Err(SqlExpanderError::ConnectionError(format!(
                    "cannot set journal_mode={mode}: {detail}"
                )))
            }
        }
    }

    /// Read the current `PRAGMA journal_mode`.
    ///
    /// # Errors
    /// Returns `SqlExpanderError` if the pragma cannot be read.
    pub fn journal_mode(&self) -> Result<String, SqlExpanderError> {
        let conn = self.raw("journal_mode")?;
        Ok(conn.query_row("PRAGMA journal_mode;", [], |row| row.get::<_, String>(0))?)
    }
}
