use thiserror::Error;

use crate::sqlite::result_code::ResultCode;

#[derive(Debug, Error)]
pub enum SqlExpanderError {
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[error(transparent)]
    JobFileError(#[from] serde_json::Error),

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Schema error: {0}")]
    SchemaError(String),

    #[error("Statement error: {0}")]
    StatementError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Wrong result dimension: nrows={rows}, ncols={columns}")]
    QueryShape { rows: usize, columns: usize },

    #[error("Scan aborted by row callback after {rows} row(s)")]
    ScanAborted { rows: usize },
}

impl SqlExpanderError {
    /// Engine result code behind this error, when it came from `SQLite`.
    #[must_use]
    pub fn result_code(&self) -> Option<ResultCode> {
        match self {
            SqlExpanderError::SqliteError(err) => ResultCode::from_rusqlite(err),
            _ => None,
        }
    }

    /// True when the engine reported a condition the session cannot recover from.
    #[must_use]
    pub fn is_hard_engine_error(&self) -> bool {
        self.result_code().is_some_and(ResultCode::is_fatal)
    }
}

/// Render an engine error together with its result-code description.
pub(crate) fn describe(err: &rusqlite::Error) -> String {
    match ResultCode::from_rusqlite(err) {
        Some(code) => format!("{} ({err})", code.describe()),
        None => err.to_string(),
    }
}
