use std::sync::Arc;

use crate::error::{SqlExpanderError, describe};
use crate::results::ScanRow;
use crate::results::row::build_column_index;
use crate::types::ScanControl;

use super::SqliteConnection;
use crate::sqlite::query::{extract_row, extract_value, scalar_to_i64};

impl SqliteConnection {
    /// Stream the rows of `sql` through `callback` in storage order.
    ///
    /// Returns the number of rows handed to the callback. Each row is observed once; the scan
    /// cannot be restarted.
    ///
    /// # Errors
    /// Returns `SqlExpanderError::ScanAborted` when the callback answers [`ScanControl::Abort`],
    /// or the engine error if preparing or stepping the query fails.
    pub fn execute_with_row_callback<F>(
        &self,
        sql: &str,
        mut callback: F,
    ) -> Result<usize, SqlExpanderError>
    where
        F: FnMut(&ScanRow) -> ScanControl,
    {
        let conn = self.raw("exec_callback")?;
        let report = |err: rusqlite::Error| {
            self.diag.error(format_args!(
                "[sqlite_con] exec_callback ERROR: {}",
                describe(&err)
            ));
            self.diag.error(format_args!("[sqlite_con] SQL = '{sql}'."));
            SqlExpanderError::SqliteError(err)
        };

        let mut stmt = conn.prepare(sql).map_err(report)?;
        let column_names: Arc<Vec<String>> = Arc::new(
            stmt.column_names()
                .into_iter()
                .map(str::to_owned)
                .collect(),
        );
        let column_index = Arc::new(build_column_index(&column_names));
        let column_count = column_names.len();

        let mut rows = stmt.query([]).map_err(report)?;
        let mut visited = 0usize;
        while let Some(row) = rows.next().map_err(report)? {
            let values = extract_row(row, column_count)?;
            visited += 1;
            let scan_row =
                ScanRow::with_index(Arc::clone(&column_names), Arc::clone(&column_index), values);
            if callback(&scan_row) == ScanControl::Abort {
                self.diag.error(format_args!(
                    "[sqlite_con] exec_callback aborted by row callback after {visited} row(s)."
                ));
                return Err(SqlExpanderError::ScanAborted { rows: visited });
            }
        }
        Ok(visited)
    }

    /// Run a query that must yield exactly one row with one column, as an integer.
    ///
    /// # Errors
    /// Returns `SqlExpanderError::QueryShape` for any other result dimension, and
    /// `SqlExpanderError::ExecutionError` when the value is NULL or not numeric.
    pub fn scalar_query(&self, sql: &str) -> Result<i64, SqlExpanderError> {
        let conn = self.raw("scalar_query")?;
        let report = |err: rusqlite::Error| {
            self.diag.error(format_args!(
                "[sqlite_con] scalar_query ERROR: {}",
                describe(&err)
            ));
            self.diag.error(format_args!("[sqlite_con] SQL = '{sql}'."));
            SqlExpanderError::SqliteError(err)
        };

        let mut stmt = conn.prepare(sql).map_err(report)?;
        let columns = stmt.column_count();
        let mut rows = stmt.query([]).map_err(report)?;
        let mut row_count = 0usize;
        let mut first = None;
        while let Some(row) = rows.next().map_err(report)? {
            if row_count == 0 && columns == 1 {
                first = Some(extract_value(row, 0)?);
            }
            row_count += 1;
        }

        match first {
            Some(value) if row_count == 1 => scalar_to_i64(&value),
            _ => {
                self.diag.error(format_args!(
                    "[sqlite_con] scalar_query ERROR: Wrong result dimension: nrows={row_count}, ncols={columns}"
                ));
                Err(SqlExpanderError::QueryShape {
                    rows: row_count,
                    columns,
                })
            }
        }
    }

    /// Largest `id` in `table`, or 0 for an empty table.
    ///
    /// # Errors
    /// Returns `SqlExpanderError` if the table has no `id` column or the query fails.
    pub fn max_id(&self, table: &str) -> Result<u64, SqlExpanderError> {
        let max = self.scalar_query(&format!("SELECT COALESCE(max(id),0) FROM {table};"))?;
        u64::try_from(max).map_err(|_| {
            SqlExpanderError::ExecutionError(format!("negative max(id) {max} in table '{table}'"))
        })
    }

    /// Number of rows in `table`.
    ///
    /// # Errors
    /// Returns `SqlExpanderError` if the count query fails.
    pub fn row_count(&self, table: &str) -> Result<u64, SqlExpanderError> {
        let count = self.scalar_query(&format!("SELECT COUNT(*) FROM {table};"))?;
        u64::try_from(count).map_err(|_| {
            SqlExpanderError::ExecutionError(format!("negative row count for '{table}'"))
        })
    }
}
