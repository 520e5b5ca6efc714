use rusqlite::types::Value;

use crate::error::SqlExpanderError;
use crate::types::RowValues;

use super::params::sqlite_value_to_row_value;

/// Extract a `RowValues` from a `SQLite` row, keeping its storage class.
///
/// # Errors
///
/// Returns `SqlExpanderError` if the column index is out of range.
pub fn extract_value(row: &rusqlite::Row<'_>, idx: usize) -> Result<RowValues, SqlExpanderError> {
    let value: Value = row.get(idx).map_err(SqlExpanderError::SqliteError)?;
    Ok(sqlite_value_to_row_value(value))
}

/// Read every column of a row in select-list order.
///
/// # Errors
///
/// Returns `SqlExpanderError` if any column cannot be read.
pub fn extract_row(
    row: &rusqlite::Row<'_>,
    column_count: usize,
) -> Result<Vec<RowValues>, SqlExpanderError> {
    let mut values = Vec::with_capacity(column_count);
    for i in 0..column_count {
        values.push(extract_value(row, i)?);
    }
    Ok(values)
}

/// Interpret a single scalar result as an integer.
///
/// # Errors
///
/// Returns `SqlExpanderError::ExecutionError` for NULL or non-numeric values.
pub fn scalar_to_i64(value: &RowValues) -> Result<i64, SqlExpanderError> {
    match value {
        RowValues::Null => Err(SqlExpanderError::ExecutionError(
            "scalar query returned NULL".into(),
        )),
        other => other.as_bound().ok_or_else(|| {
            SqlExpanderError::ExecutionError(format!(
                "scalar query returned a non-numeric value: {other:?}"
            ))
        }),
    }
}
