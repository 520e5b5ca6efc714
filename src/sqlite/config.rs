use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::diagnostics::{DiagnosticSink, Diagnostics};
use crate::error::SqlExpanderError;
use crate::types::{JournalMode, SyncMode};

use super::connection::SqliteConnection;

/// Options for a bulk-load `SQLite` session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SqliteOptions {
    /// Write status lines to the diagnostic sink, not just errors.
    pub verbose: bool,
    /// Synchronous mode while rows are inserted; FULL is restored before close.
    pub bulk_sync: SyncMode,
    /// Journal mode while rows are inserted; DELETE is restored on close.
    pub bulk_journal_mode: Option<JournalMode>,
}

impl Default for SqliteOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            bulk_sync: SyncMode::Off,
            bulk_journal_mode: None,
        }
    }
}

impl SqliteOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn builder() -> SqliteOptionsBuilder {
        SqliteOptionsBuilder::new()
    }

    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Open a session on `db_path` reporting to `sink`.
    ///
    /// # Errors
    /// Returns `SqlExpanderError::ConnectionError` if the database cannot be opened or created.
    pub fn connect(
        &self,
        db_path: &str,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Result<SqliteConnection, SqlExpanderError> {
        let mut conn = SqliteConnection::new(db_path, Diagnostics::new(sink, self.verbose));
        conn.open()?;
        Ok(conn)
    }
}

/// Fluent builder for `SQLite` options.
#[derive(Debug, Clone, Default)]
pub struct SqliteOptionsBuilder {
    opts: SqliteOptions,
}

impl SqliteOptionsBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.opts.verbose = verbose;
        self
    }

    #[must_use]
    pub fn bulk_sync(mut self, mode: SyncMode) -> Self {
        self.opts.bulk_sync = mode;
        self
    }

    #[must_use]
    pub fn bulk_journal_mode(mut self, mode: Option<JournalMode>) -> Self {
        self.opts.bulk_journal_mode = mode;
        self
    }

    #[must_use]
    pub fn finish(self) -> SqliteOptions {
        self.opts
    }
}
