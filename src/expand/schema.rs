//! SQL text for the target table, its INSERT statement and the source scan.
//!
//! All three share one column order: `id, rid, <index>, <copy>..., <expand>...` on the target
//! side and `id, <lo>, <hi>, <copy>..., <expand>...` on the source side. [`RowLayout`] maps
//! between them.

use std::fmt::Write as _;

use super::job::ExpandJob;

#[must_use]
pub fn create_table_sql(job: &ExpandJob) -> String {
    let mut sql = format!(
        "CREATE TABLE IF NOT EXISTS {} (id INTEGER, rid INTEGER, {} TEXT, ",
        job.target_table(),
        job.index_column()
    );
    for col in job.copy_columns() {
        let _ = write!(sql, "{} {}, ", col.name, col.sql_type);
    }
    for col in job.expand_columns() {
        let _ = write!(sql, "{} REAL, ", col.name);
    }
    sql.push_str("PRIMARY KEY(id));");
    sql
}

#[must_use]
pub fn insert_sql(job: &ExpandJob) -> String {
    let columns = target_columns(job);
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({placeholders});",
        job.target_table(),
        columns.join(", ")
    )
}

#[must_use]
pub fn select_sql(job: &ExpandJob) -> String {
    let mut columns = vec!["id", job.lower_bound_column(), job.upper_bound_column()];
    columns.extend(job.copy_columns().iter().map(|c| c.name.as_str()));
    columns.extend(job.expand_columns().iter().map(|c| c.name.as_str()));
    format!("SELECT {} FROM {};", columns.join(", "), job.source_table())
}

fn target_columns(job: &ExpandJob) -> Vec<&str> {
    let mut columns = vec!["id", "rid", job.index_column()];
    columns.extend(job.copy_columns().iter().map(|c| c.name.as_str()));
    columns.extend(job.expand_columns().iter().map(|c| c.name.as_str()));
    columns
}

/// Positions of every value in the source scan (0-based) and the INSERT (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowLayout {
    copy_count: usize,
    expand_count: usize,
}

impl RowLayout {
    pub const PARAM_ID: usize = 1;
    pub const PARAM_RID: usize = 2;
    pub const PARAM_INDEX: usize = 3;

    pub const SOURCE_ID: usize = 0;
    pub const SOURCE_LOWER: usize = 1;
    pub const SOURCE_UPPER: usize = 2;

    const LEADING: usize = 3;

    #[must_use]
    pub fn new(copy_count: usize, expand_count: usize) -> Self {
        Self {
            copy_count,
            expand_count,
        }
    }

    #[must_use]
    pub fn for_job(job: &ExpandJob) -> Self {
        Self::new(job.copy_columns().len(), job.expand_columns().len())
    }

    #[must_use]
    pub fn copy_count(&self) -> usize {
        self.copy_count
    }

    #[must_use]
    pub fn expand_count(&self) -> usize {
        self.expand_count
    }

    #[must_use]
    pub fn copy_source(&self, i: usize) -> usize {
        Self::LEADING + i
    }

    #[must_use]
    pub fn expand_source(&self, i: usize) -> usize {
        Self::LEADING + self.copy_count + i
    }

    #[must_use]
    pub fn copy_param(&self, i: usize) -> usize {
        Self::LEADING + 1 + i
    }

    #[must_use]
    pub fn expand_param(&self, i: usize) -> usize {
        Self::LEADING + 1 + self.copy_count + i
    }

    /// Number of columns the source scan yields, which is also the INSERT parameter count.
    #[must_use]
    pub fn source_width(&self) -> usize {
        Self::LEADING + self.copy_count + self.expand_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SqlType;

    fn job() -> ExpandJob {
        ExpandJob::new(
            crate::expand::job::JobParams::from_slice(&[
                "db", "tbl", "rtbl", "min_woche", "max_woche", "woche",
            ])
            .unwrap(),
            &["cpy1".to_string(), "cpy2".to_string()],
            &[SqlType::Text, SqlType::Integer],
            &["exp1".to_string(), "exp2".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn create_table_lists_columns_in_order() {
        assert_eq!(
            create_table_sql(&job()),
            "CREATE TABLE IF NOT EXISTS rtbl (id INTEGER, rid INTEGER, woche TEXT, \
             cpy1 TEXT, cpy2 INTEGER, exp1 REAL, exp2 REAL, PRIMARY KEY(id));"
        );
    }

    #[test]
    fn insert_has_one_placeholder_per_column() {
        assert_eq!(
            insert_sql(&job()),
            "INSERT INTO rtbl (id, rid, woche, cpy1, cpy2, exp1, exp2) \
             VALUES (?, ?, ?, ?, ?, ?, ?);"
        );
    }

    #[test]
    fn select_reads_id_bounds_then_payload() {
        assert_eq!(
            select_sql(&job()),
            "SELECT id, min_woche, max_woche, cpy1, cpy2, exp1, exp2 FROM tbl;"
        );
    }

    #[test]
    fn layout_lines_up_source_and_parameters() {
        let layout = RowLayout::for_job(&job());
        assert_eq!(layout.source_width(), 7);
        assert_eq!((layout.copy_source(0), layout.copy_param(0)), (3, 4));
        assert_eq!((layout.copy_source(1), layout.copy_param(1)), (4, 5));
        assert_eq!((layout.expand_source(0), layout.expand_param(0)), (5, 6));
        assert_eq!((layout.expand_source(1), layout.expand_param(1)), (6, 7));
    }
}
