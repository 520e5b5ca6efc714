//! Range expansion with proportional split for `SQLite` tables.
//!
//! A job reads `id, lo, hi, <copy>..., <expand>...` from a source table and writes one target
//! row per integer in `[lo, hi]`, all inside a single transaction.

pub mod diagnostics;
pub mod error;
pub mod expand;
pub mod prelude;
pub mod results;
pub mod sqlite;
pub mod types;

pub use diagnostics::{DiagnosticSink, Diagnostics, MemorySink, NullSink, TracingSink, WriterSink};
pub use error::SqlExpanderError;
pub use expand::{
    ColumnRole, ColumnSpec, ExpandJob, ExpandReport, ExpandStats, ExpansionTransform, JobFile,
    JobParams, RowLayout, expand_table, expand_table_async,
};
pub use results::ScanRow;
pub use sqlite::{
    ConnectionStatus, SqliteConnection, SqliteOptions, SqliteOptionsBuilder,
    SqlitePreparedStatement, StatementStatus, TxStatus,
};
pub use types::{JournalMode, RowValues, ScanControl, SqlType, SyncMode};
