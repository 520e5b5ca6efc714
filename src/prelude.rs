//! Convenient imports for common functionality.

pub use crate::diagnostics::{DiagnosticSink, MemorySink, NullSink, TracingSink, WriterSink};
pub use crate::error::SqlExpanderError;
pub use crate::expand::{ExpandJob, ExpandReport, ExpandStats, JobParams, expand_table};
pub use crate::results::ScanRow;
pub use crate::sqlite::{SqliteConnection, SqliteOptions, SqlitePreparedStatement};
pub use crate::types::{JournalMode, RowValues, ScanControl, SqlType, SyncMode};
