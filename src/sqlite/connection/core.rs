use std::cell::Cell;
use std::fmt;

use crate::diagnostics::Diagnostics;
use crate::error::{SqlExpanderError, describe};
use crate::types::{JournalMode, SyncMode};

use super::admin::{apply_journal_mode, apply_sync};

/// Lifecycle of the underlying engine handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Closed,
    Open,
    /// The last `open` attempt failed.
    Error,
}

/// Transaction state; `begin`/`commit`/`rollback` are no-ops when already in the target state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    Committed,
    InTransaction,
}

/// A single `SQLite` session owning exactly one `rusqlite::Connection`.
///
/// Statements borrow the session, so they are finalized before it can be closed. Closing (and
/// dropping) an open session rolls back an unfinished transaction and restores
/// `synchronous=FULL` / `journal_mode=DELETE` before the handle is released.
pub struct SqliteConnection {
    db_path: String,
    pub(super) conn: Option<rusqlite::Connection>,
    status: ConnectionStatus,
    pub(super) tx: Cell<TxStatus>,
    pub(crate) diag: Diagnostics,
}

impl SqliteConnection {
    /// Create a closed session for `db_path`; call [`SqliteConnection::open`] next.
    pub fn new(db_path: impl Into<String>, diag: Diagnostics) -> Self {
        Self {
            db_path: db_path.into(),
            conn: None,
            status: ConnectionStatus::Closed,
            tx: Cell::new(TxStatus::Committed),
            diag,
        }
    }

    #[must_use]
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == ConnectionStatus::Open
    }

    #[must_use]
    pub fn tx_status(&self) -> TxStatus {
        self.tx.get()
    }

    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diag
    }

    /// Open (or create) the database file.
    ///
    /// # Errors
    /// Returns `SqlExpanderError::ConnectionError` if the engine cannot open the file.
    pub fn open(&mut self) -> Result<(), SqlExpanderError> {
        if self.conn.is_some() {
            self.diag
                .status(format_args!("[sqlite_con] Connection already open."));
            return Ok(());
        }
        match rusqlite::Connection::open(&self.db_path) {
            Ok(conn) => {
                self.conn = Some(conn);
                self.status = ConnectionStatus::Open;
                self.tx.set(TxStatus::Committed);
                self.diag.status(format_args!("[sqlite_con] Connection opened."));
                tracing::debug!(db_path = %self.db_path, "sqlite session opened");
                Ok(())
            }
            Err(err) => {
                self.status = ConnectionStatus::Error;
                let detail = describe(&err);
                self.diag.error(format_args!(
                    "[sqlite_con] Database connection could not be opened: {detail}"
                ));
                Err(SqlExpanderError::ConnectionError(format!(
                    "could not open SQLite database '{}': {detail}",
                    self.db_path
                )))
            }
        }
    }

    /// Restore default durability and release the handle.
    ///
    /// Returns `Ok(false)` when the session was not open.
    ///
    /// # Errors
    /// Returns `SqlExpanderError::ConnectionError` if resetting the pragmas or closing the handle
    /// fails. The handle is released either way.
    pub fn close(&mut self) -> Result<bool, SqlExpanderError> {
        let Some(conn) = self.conn.take() else {
            return Ok(false);
        };
        self.status = ConnectionStatus::Closed;
        release(conn, &self.tx, &self.diag)?;
        self.diag
            .status(format_args!("[sqlite_con] Database connection closed."));
        tracing::debug!(db_path = %self.db_path, "sqlite session closed");
        Ok(true)
    }

    pub(crate) fn raw(&self, ctx: &str) -> Result<&rusqlite::Connection, SqlExpanderError> {
        match self.conn.as_ref() {
            Some(conn) => Ok(conn),
            None => {
                self.diag.error(format_args!(
                    "[sqlite_con] {ctx} ERROR: Database connection is closed!"
                ));
                Err(SqlExpanderError::ConnectionError(format!(
                    "{ctx}: database connection is closed"
                )))
            }
        }
    }
}

fn release(
    conn: rusqlite::Connection,
    tx: &Cell<TxStatus>,
    diag: &Diagnostics,
) -> Result<(), SqlExpanderError> {
    let mut failures = Vec::new();

    if tx.get() == TxStatus::InTransaction {
        match conn.execute_batch("ROLLBACK") {
            Ok(()) => diag.status(format_args!(
                "[sqlite_con] Open transaction rolled back on close."
            )),
            Err(err) => failures.push(format!("rollback: {}", describe(&err))),
        }
        tx.set(TxStatus::Committed);
    }

    if let Err(err) = apply_sync(&conn, SyncMode::Full) {
        failures.push(format!("set_sync: {}", describe(&err)));
    }
    if let Err(err) = apply_journal_mode(&conn, JournalMode::Delete) {
        failures.push(format!("set_con_journal: {}", describe(&err)));
    }

    if let Err((_conn, err)) = conn.close() {
        failures.push(format!("close: {}", describe(&err)));
    }

    if failures.is_empty() {
        return Ok(());
    }
    let joined = failures.join("; ");
    diag.error(format_args!("[sqlite_con] Database closing error: {joined}"));
    Err(SqlExpanderError::ConnectionError(joined))
}

impl Drop for SqliteConnection {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            let _ = release(conn, &self.tx, &self.diag);
            self.diag.status(format_args!("[sqlite_con] Destructed."));
        }
    }
}

impl fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("db_path", &self.db_path)
            .field("status", &self.status)
            .field("tx", &self.tx.get())
            .finish()
    }
}
