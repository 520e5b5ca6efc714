use crate::error::SqlExpanderError;
use crate::sqlite::prepared::SqlitePreparedStatement;

use super::SqliteConnection;

impl SqliteConnection {
    /// Compile `sql` into a statement that borrows this session.
    ///
    /// # Errors
    /// Returns `SqlExpanderError::StatementError` if the SQL does not compile.
    pub fn prepare_statement(
        &self,
        sql: &str,
    ) -> Result<SqlitePreparedStatement<'_>, SqlExpanderError> {
        let mut stmt = SqlitePreparedStatement::new(self);
        stmt.prepare(sql)?;
        Ok(stmt)
    }
}
