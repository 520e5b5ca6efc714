//! Range expansion with proportional split.
//!
//! Every source row with a range `[lo, hi]` becomes `hi - lo + 1` target rows. Copy columns
//! are repeated unchanged, expand columns are divided by the range width, and each target
//! row gets a fresh `id` plus the source `id` as `rid`.

pub mod job;
pub mod runner;
pub mod schema;
pub mod transform;

pub use job::{ColumnRole, ColumnSpec, ExpandJob, JobFile, JobParams};
pub use runner::{ExpandReport, expand_table, expand_table_async};
pub use schema::RowLayout;
pub use transform::{ExpandStats, ExpansionTransform};
