use crate::error::{SqlExpanderError, describe};

use super::SqliteConnection;

impl SqliteConnection {
    /// Execute a batch of statements as-is (no implicit transaction).
    ///
    /// # Errors
    /// Returns `SqlExpanderError` if the connection is closed or any statement fails.
    pub fn execute_batch(&self, sql: &str) -> Result<(), SqlExpanderError> {
        let conn = self.raw("execute_batch")?;
        conn.execute_batch(sql).map_err(|err| {
            self.diag.error(format_args!(
                "[sqlite_con] execute_batch ERROR: {}",
                describe(&err)
            ));
            SqlExpanderError::SqliteError(err)
        })
    }

    /// Run one INSERT and return the rowid it produced.
    ///
    /// # Errors
    /// Returns `SqlExpanderError` if the connection is closed or the insert fails.
    pub fn insert_sql(&self, sql: &str) -> Result<i64, SqlExpanderError> {
        let conn = self.raw("insert_sql")?;
        match conn.execute(sql, []) {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(err) => {
                self.diag.error(format_args!(
                    "[sqlite_con] Database Insert ERROR: {}",
                    describe(&err)
                ));
                self.diag.error(format_args!("[sqlite_con] SQL = '{sql}'."));
                Err(SqlExpanderError::SqliteError(err))
            }
        }
    }
}
