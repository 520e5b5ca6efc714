use crate::error::{SqlExpanderError, describe};

use super::SqliteConnection;

impl SqliteConnection {
    /// Run a single `CREATE TABLE` statement.
    ///
    /// # Errors
    /// Returns `SqlExpanderError::SchemaError` if the statement cannot be prepared or executed.
    pub fn create_table(&self, sql: &str) -> Result<(), SqlExpanderError> {
        let conn = self.raw("create_table")?;
        if let Err(err) = conn.execute(sql, []) {
            let detail = describe(&err);
            self.diag
                .error(format_args!("[sqlite_con] Create_table ERROR: {detail}!"));
            self.diag.error(format_args!("[sqlite_con] SQL = '{sql}'."));
            return Err(SqlExpanderError::SchemaError(format!(
                "create table failed: {detail}"
            )));
        }
        self.diag
            .status(format_args!("[sqlite_con] Table creation success."));
        Ok(())
    }

    /// `DROP TABLE IF EXISTS`; dropping a missing table succeeds.
    ///
    /// # Errors
    /// Returns `SqlExpanderError::SchemaError` if the engine rejects the drop.
    pub fn drop_table(&self, table: &str) -> Result<(), SqlExpanderError> {
        let conn = self.raw("drop_table")?;
        if let Err(err) = conn.execute_batch(&format!("DROP TABLE IF EXISTS {table};")) {
            let detail = describe(&err);
            self.diag.error(format_args!(
                "[sqlite_con] drop_table '{table}' ERROR: {detail}!"
            ));
            return Err(SqlExpanderError::SchemaError(format!(
                "drop table '{table}' failed: {detail}"
            )));
        }
        self.diag
            .status(format_args!("[sqlite_con] drop_table '{table}' success."));
        Ok(())
    }

    /// `CREATE INDEX IF NOT EXISTS <index> on <table> (<columns>)`.
    ///
    /// # Errors
    /// Returns `SqlExpanderError::SchemaError` if no columns are given or the engine rejects the
    /// index.
    pub fn create_index(
        &self,
        index: &str,
        table: &str,
        columns: &[&str],
    ) -> Result<(), SqlExpanderError> {
        if columns.is_empty() {
            return Err(SqlExpanderError::SchemaError(format!(
                "index '{index}' on '{table}' needs at least one column"
            )));
        }
        let conn = self.raw("create_index")?;
        let sql = format!(
            "CREATE INDEX IF NOT EXISTS {index} on {table} ({});",
            columns.join(", ")
        );
        if let Err(err) = conn.execute(&sql, []) {
            let detail = describe(&err);
            self.diag
                .error(format_args!("[sqlite_con] create_index ERROR: {detail}!"));
            self.diag.error(format_args!(
                "[sqlite_con] Indexname '{index}' on table '{table}'."
            ));
            return Err(SqlExpanderError::SchemaError(format!(
                "create index '{index}' on '{table}' failed: {detail}"
            )));
        }
        self.diag.status(format_args!(
            "[sqlite_con] Created index '{index}' on table '{table}'"
        ));
        Ok(())
    }
}
