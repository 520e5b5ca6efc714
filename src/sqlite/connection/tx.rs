use crate::error::{SqlExpanderError, describe};

use super::{SqliteConnection, TxStatus};

impl SqliteConnection {
    /// Begin a transaction; a no-op when one is already open.
    ///
    /// # Errors
    /// Returns `SqlExpanderError::ExecutionError` if `BEGIN` fails.
    pub fn begin(&self) -> Result<(), SqlExpanderError> {
        if self.tx.get() == TxStatus::InTransaction {
            return Ok(());
        }
        self.transition("BEGIN", TxStatus::InTransaction)?;
        self.diag
            .status(format_args!("[sqlite_con] Begin Database transaction."));
        Ok(())
    }

    /// Commit the open transaction; a no-op when none is open.
    ///
    /// # Errors
    /// Returns `SqlExpanderError::ExecutionError` if `COMMIT` fails.
    pub fn commit(&self) -> Result<(), SqlExpanderError> {
        if self.tx.get() == TxStatus::Committed {
            return Ok(());
        }
        self.transition("COMMIT", TxStatus::Committed)?;
        self.diag
            .status(format_args!("[sqlite_con] Database transaction committed."));
        Ok(())
    }

    /// Discard the open transaction; a no-op when none is open.
    ///
    /// # Errors
    /// Returns `SqlExpanderError::ExecutionError` if `ROLLBACK` fails.
    pub fn rollback(&self) -> Result<(), SqlExpanderError> {
        if self.tx.get() == TxStatus::Committed {
            return Ok(());
        }
        self.transition("ROLLBACK", TxStatus::Committed)?;
        self.diag
            .status(format_args!("[sqlite_con] Database transaction rolled back."));
        Ok(())
    }

    fn transition(&self, sql: &str, next: TxStatus) -> Result<(), SqlExpanderError> {
        let conn = self.raw(sql)?;
        if let Err(err) = conn.execute_batch(sql) {
            let detail = describe(&err);
            self.diag
                .error(format_args!("[sqlite_con] {sql} ERROR: {detail}"));
            // The engine may already have ended the transaction on its own.
            if conn.is_autocommit() {
                self.tx.set(TxStatus::Committed);
            }
            return Err(SqlExpanderError::ExecutionError(format!("{sql} failed: {detail}")));
        }
        self.tx.set(next);
        Ok(())
    }
}
