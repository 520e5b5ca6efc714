use std::collections::HashMap;
use std::sync::Arc;

use crate::types::RowValues;

/// One row of a streaming scan.
///
/// Rows are only observed inside a row callback; the column names are shared by every row of
/// the scan.
#[derive(Debug, Clone)]
pub struct ScanRow {
    /// The column names for this row (shared across all rows in a scan)
    pub column_names: Arc<Vec<String>>,
    /// The values for this row, in select-list order
    pub values: Vec<RowValues>,
    column_index_cache: Arc<HashMap<String, usize>>,
}

impl ScanRow {
    /// Create a row with a freshly built column lookup.
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, values: Vec<RowValues>) -> Self {
        let cache = Arc::new(build_column_index(&column_names));
        Self::with_index(column_names, cache, values)
    }

    pub(crate) fn with_index(
        column_names: Arc<Vec<String>>,
        column_index_cache: Arc<HashMap<String, usize>>,
        values: Vec<RowValues>,
    ) -> Self {
        Self {
            column_names,
            values,
            column_index_cache,
        }
    }

    /// Get the index of a column by name
    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        if let Some(&idx) = self.column_index_cache.get(column_name) {
            return Some(idx);
        }
        self.column_names.iter().position(|col| col == column_name)
    }

    /// Get a value from the row by column name
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&RowValues> {
        self.get_column_index(column_name)
            .and_then(|idx| self.values.get(idx))
    }

    /// Get a value from the row by column index
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&RowValues> {
        self.values.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

pub(crate) fn build_column_index(column_names: &[String]) -> HashMap<String, usize> {
    column_names
        .iter()
        .enumerate()
        .map(|(i, name)| (name.clone(), i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name_and_position() {
        let names = Arc::new(vec!["id".to_string(), "lo".to_string(), "hi".to_string()]);
        let row = ScanRow::new(
            names,
            vec![RowValues::Int(7), RowValues::Int(3), RowValues::Int(5)],
        );
        assert_eq!(row.get("hi"), Some(&RowValues::Int(5)));
        assert_eq!(row.get_by_index(0), Some(&RowValues::Int(7)));
        assert_eq!(row.get("missing"), None);
        assert_eq!(row.len(), 3);
    }
}
