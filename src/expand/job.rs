use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::SqlExpanderError;
use crate::sqlite::config::SqliteOptions;
use crate::types::SqlType;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Invalid identifier regex"));

/// Column names the target table always carries.
const RESERVED: [&str; 2] = ["id", "rid"];

/// The six positional job parameters, in invocation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobParams {
    pub db_path: String,
    pub source_table: String,
    pub target_table: String,
    pub lower_bound_column: String,
    pub upper_bound_column: String,
    pub index_column: String,
}

impl JobParams {
    /// Read `[db_path, source, target, lower, upper, index]`.
    ///
    /// # Errors
    /// Returns `SqlExpanderError::ConfigError` unless exactly six values are given.
    pub fn from_slice<S: AsRef<str>>(params: &[S]) -> Result<Self, SqlExpanderError> {
        let [db, source, target, lower, upper, index] = params else {
            return Err(SqlExpanderError::ConfigError(format!(
                "params must have length 6, got {}",
                params.len()
            )));
        };
        Ok(Self {
            db_path: db.as_ref().to_owned(),
            source_table: source.as_ref().to_owned(),
            target_table: target.as_ref().to_owned(),
            lower_bound_column: lower.as_ref().to_owned(),
            upper_bound_column: upper.as_ref().to_owned(),
            index_column: index.as_ref().to_owned(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    /// Written unchanged into every expanded row.
    Copy,
    /// Divided by the range width; always stored as REAL.
    Expand,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub sql_type: SqlType,
    pub role: ColumnRole,
}

impl ColumnSpec {
    #[must_use]
    pub fn copy(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
            role: ColumnRole::Copy,
        }
    }

    #[must_use]
    pub fn expand(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: SqlType::Real,
            role: ColumnRole::Expand,
        }
    }
}

/// A validated, immutable description of one expansion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandJob {
    params: JobParams,
    copy_columns: Vec<ColumnSpec>,
    expand_columns: Vec<ColumnSpec>,
    seed_ids_from: Option<String>,
    index_rid: bool,
}

impl ExpandJob {
    /// Validate the invocation and build a job. Nothing is opened or touched.
    ///
    /// # Errors
    /// Returns `SqlExpanderError::ConfigError` when copy names and types differ in length, either
    /// column list is empty, an identifier is not a plain SQL name, or a column name is used
    /// twice (including `id`, `rid` and the index column).
    pub fn new(
        params: JobParams,
        copy_names: &[String],
        copy_types: &[SqlType],
        expand_names: &[String],
    ) -> Result<Self, SqlExpanderError> {
        if copy_names.len() != copy_types.len() {
            return Err(SqlExpanderError::ConfigError(format!(
                "copy columns and copy column types must have equal length ({} != {})",
                copy_names.len(),
                copy_types.len()
            )));
        }
        if copy_names.is_empty() {
            return Err(SqlExpanderError::ConfigError(
                "copy columns must not be empty".into(),
            ));
        }
        if expand_names.is_empty() {
            return Err(SqlExpanderError::ConfigError(
                "expand columns must not be empty".into(),
            ));
        }

        for (what, name) in [
            ("source table", &params.source_table),
            ("target table", &params.target_table),
            ("lower bound column", &params.lower_bound_column),
            ("upper bound column", &params.upper_bound_column),
            ("index column", &params.index_column),
        ] {
            check_identifier(what, name)?;
        }
        if params.db_path.trim().is_empty() {
            return Err(SqlExpanderError::ConfigError(
                "database path must not be empty".into(),
            ));
        }
        if params.source_table.eq_ignore_ascii_case(&params.target_table) {
            return Err(SqlExpanderError::ConfigError(format!(
                "target table '{}' must differ from the source table",
                params.target_table
            )));
        }

        let mut seen: HashSet<String> = RESERVED.iter().map(|s| (*s).to_owned()).collect();
        claim(&mut seen, "index column", &params.index_column)?;
        for name in copy_names {
            check_identifier("copy column", name)?;
            claim(&mut seen, "copy column", name)?;
        }
        for name in expand_names {
            check_identifier("expand column", name)?;
            claim(&mut seen, "expand column", name)?;
        }

        let copy_columns = copy_names
            .iter()
            .zip(copy_types)
            .map(|(name, ty)| ColumnSpec::copy(name.clone(), *ty))
            .collect();
        let expand_columns = expand_names.iter().map(ColumnSpec::expand).collect();

        Ok(Self {
            params,
            copy_columns,
            expand_columns,
            seed_ids_from: None,
            index_rid: false,
        })
    }

    /// Like [`ExpandJob::new`] with column types given as SQL type names.
    ///
    /// # Errors
    /// Returns `SqlExpanderError::ConfigError` for an unknown type name or any check of
    /// [`ExpandJob::new`].
    pub fn from_strings<S: AsRef<str>>(
        params: &[S],
        copy_names: &[String],
        copy_types: &[String],
        expand_names: &[String],
    ) -> Result<Self, SqlExpanderError> {
        let params = JobParams::from_slice(params)?;
        let types = copy_types
            .iter()
            .map(|ty| ty.parse::<SqlType>())
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(params, copy_names, &types, expand_names)
    }

    /// Continue ids after the largest `id` already present in `table`.
    ///
    /// # Errors
    /// Returns `SqlExpanderError::ConfigError` if `table` is not a plain SQL name.
    pub fn with_id_seed(mut self, table: impl Into<String>) -> Result<Self, SqlExpanderError> {
        let table = table.into();
        check_identifier("id seed table", &table)?;
        self.seed_ids_from = Some(table);
        Ok(self)
    }

    /// Create `<target>_rid_idx` in the same transaction as the rows.
    #[must_use]
    pub fn with_rid_index(mut self, index_rid: bool) -> Self {
        self.index_rid = index_rid;
        self
    }

    #[must_use]
    pub fn params(&self) -> &JobParams {
        &self.params
    }

    #[must_use]
    pub fn db_path(&self) -> &str {
        &self.params.db_path
    }

    #[must_use]
    pub fn source_table(&self) -> &str {
        &self.params.source_table
    }

    #[must_use]
    pub fn target_table(&self) -> &str {
        &self.params.target_table
    }

    #[must_use]
    pub fn lower_bound_column(&self) -> &str {
        &self.params.lower_bound_column
    }

    #[must_use]
    pub fn upper_bound_column(&self) -> &str {
        &self.params.upper_bound_column
    }

    #[must_use]
    pub fn index_column(&self) -> &str {
        &self.params.index_column
    }

    #[must_use]
    pub fn copy_columns(&self) -> &[ColumnSpec] {
        &self.copy_columns
    }

    #[must_use]
    pub fn expand_columns(&self) -> &[ColumnSpec] {
        &self.expand_columns
    }

    #[must_use]
    pub fn seed_ids_from(&self) -> Option<&str> {
        self.seed_ids_from.as_deref()
    }

    #[must_use]
    pub fn index_rid(&self) -> bool {
        self.index_rid
    }

    #[must_use]
    pub fn rid_index_name(&self) -> String {
        format!("{}_rid_idx", self.params.target_table)
    }
}

fn check_identifier(what: &str, name: &str) -> Result<(), SqlExpanderError> {
    if IDENTIFIER.is_match(name) {
        Ok(())
    } else {
        Err(SqlExpanderError::ConfigError(format!(
            "{what} '{name}' is not a valid SQL identifier"
        )))
    }
}

fn claim(seen: &mut HashSet<String>, what: &str, name: &str) -> Result<(), SqlExpanderError> {
    if seen.insert(name.to_ascii_lowercase()) {
        Ok(())
    } else {
        Err(SqlExpanderError::ConfigError(format!(
            "{what} '{name}' collides with another target column"
        )))
    }
}

/// A job as stored on disk.
///
/// ```json
/// {
///   "db_path": "sales.db",
///   "source_table": "orders",
///   "target_table": "orders_weekly",
///   "lower_bound_column": "first_week",
///   "upper_bound_column": "last_week",
///   "index_column": "week",
///   "copy_columns": ["region"],
///   "copy_types": ["TEXT"],
///   "expand_columns": ["amount"],
///   "options": { "verbose": true }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobFile {
    pub db_path: String,
    pub source_table: String,
    pub target_table: String,
    pub lower_bound_column: String,
    pub upper_bound_column: String,
    pub index_column: String,
    pub copy_columns: Vec<String>,
    pub copy_types: Vec<SqlType>,
    pub expand_columns: Vec<String>,
    #[serde(default)]
    pub seed_ids_from: Option<String>,
    #[serde(default)]
    pub index_rid: bool,
    #[serde(default)]
    pub options: SqliteOptions,
}

impl JobFile {
    /// # Errors
    /// Returns `SqlExpanderError::JobFileError` for malformed JSON.
    pub fn from_json(text: &str) -> Result<Self, SqlExpanderError> {
        Ok(serde_json::from_str(text)?)
    }

    /// # Errors
    /// Returns `SqlExpanderError::IoError` if the file cannot be read, or
    /// `SqlExpanderError::JobFileError` if it is not a valid job.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SqlExpanderError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Validate into a job plus the session options it carries.
    ///
    /// # Errors
    /// Returns `SqlExpanderError::ConfigError` for any check of [`ExpandJob::new`].
    pub fn into_job(self) -> Result<(ExpandJob, SqliteOptions), SqlExpanderError> {
        let params = JobParams {
            db_path: self.db_path,
            source_table: self.source_table,
            target_table: self.target_table,
            lower_bound_column: self.lower_bound_column,
            upper_bound_column: self.upper_bound_column,
            index_column: self.index_column,
        };
        let mut job = ExpandJob::new(
            params,
            &self.copy_columns,
            &self.copy_types,
            &self.expand_columns,
        )?
        .with_rid_index(self.index_rid);
        if let Some(table) = self.seed_ids_from {
            job = job.with_id_seed(table)?;
        }
        Ok((job, self.options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> JobParams {
        JobParams::from_slice(&["db.sqlite", "src", "dst", "lo", "hi", "week"]).unwrap()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn params_need_six_values() {
        let err = JobParams::from_slice(&["db", "src", "dst", "lo", "hi"]).unwrap_err();
        assert!(matches!(err, SqlExpanderError::ConfigError(_)));
        assert_eq!(params().index_column, "week");
    }

    #[test]
    fn copy_names_and_types_must_line_up() {
        let err = ExpandJob::new(
            params(),
            &names(&["a", "b"]),
            &[SqlType::Text],
            &names(&["x"]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("equal length"));
    }

    #[test]
    fn empty_column_lists_are_rejected() {
        assert!(ExpandJob::new(params(), &[], &[], &names(&["x"])).is_err());
        assert!(ExpandJob::new(params(), &names(&["a"]), &[SqlType::Text], &[]).is_err());
    }

    #[test]
    fn identifiers_must_be_plain_names() {
        let err = ExpandJob::new(
            params(),
            &names(&["a; DROP TABLE src"]),
            &[SqlType::Text],
            &names(&["x"]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("not a valid SQL identifier"));

        let bad = JobParams::from_slice(&["db", "src", "dst", "lo", "hi", "1week"]).unwrap();
        assert!(ExpandJob::new(bad, &names(&["a"]), &[SqlType::Text], &names(&["x"])).is_err());
    }

    #[test]
    fn reserved_and_duplicate_names_collide() {
        for copy in [&["ID"][..], &["week"][..], &["a", "A"][..]] {
            let types = vec![SqlType::Text; copy.len()];
            assert!(
                ExpandJob::new(params(), &names(copy), &types, &names(&["x"])).is_err(),
                "{copy:?} should collide"
            );
        }
        assert!(ExpandJob::new(params(), &names(&["a"]), &[SqlType::Text], &names(&["a"])).is_err());
    }

    #[test]
    fn type_names_parse_from_strings() {
        let job = ExpandJob::from_strings(
            &["db", "src", "dst", "lo", "hi", "week"],
            &names(&["region", "units"]),
            &names(&["text", "INTEGER"]),
            &names(&["amount"]),
        )
        .unwrap();
        assert_eq!(job.copy_columns()[1], ColumnSpec::copy("units", SqlType::Integer));
        assert_eq!(job.expand_columns()[0].sql_type, SqlType::Real);
        assert_eq!(job.rid_index_name(), "dst_rid_idx");
    }

    #[test]
    fn job_file_carries_options() {
        let file = JobFile::from_json(
            r#"{
                "db_path": "sales.db",
                "source_table": "orders",
                "target_table": "orders_weekly",
                "lower_bound_column": "first_week",
                "upper_bound_column": "last_week",
                "index_column": "week",
                "copy_columns": ["region"],
                "copy_types": ["TEXT"],
                "expand_columns": ["amount"],
                "seed_ids_from": "orders_weekly_archive",
                "index_rid": true,
                "options": { "verbose": true }
            }"#,
        )
        .unwrap();
        let (job, opts) = file.into_job().unwrap();
        assert!(opts.verbose);
        assert!(job.index_rid());
        assert_eq!(job.seed_ids_from(), Some("orders_weekly_archive"));
    }

    #[test]
    fn job_file_rejects_unknown_fields() {
        let err = JobFile::from_json(r#"{"db_path": "x", "colour": 1}"#).unwrap_err();
        assert!(matches!(err, SqlExpanderError::JobFileError(_)));
    }
}
