use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::SqlExpanderError;

/// Values read from a source row or bound to a statement parameter.
///
/// ```rust
/// use sql_expander::prelude::*;
///
/// let lo = RowValues::Text("3".into());
/// assert_eq!(lo.as_bound(), Some(3));
/// assert_eq!(RowValues::Int(9).as_real(), Some(9.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// NULL value
    Null,
    /// Binary data
    Blob(Vec<u8>),
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let RowValues::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let RowValues::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    /// Interpret the value as an integer range bound.
    ///
    /// Integers pass through, reals are truncated toward zero, numeric text is parsed.
    /// NULL, blobs, non-finite reals and non-numeric text yield `None`.
    #[must_use]
    pub fn as_bound(&self) -> Option<i64> {
        match self {
            RowValues::Int(i) => Some(*i),
            RowValues::Float(f) => real_to_bound(*f),
            RowValues::Text(s) => {
                let trimmed = s.trim();
                trimmed
                    .parse::<i64>()
                    .ok()
                    .or_else(|| trimmed.parse::<f64>().ok().and_then(real_to_bound))
            }
            RowValues::Null | RowValues::Blob(_) => None,
        }
    }

    /// Interpret the value as a floating point quantity.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_real(&self) -> Option<f64> {
        match self {
            RowValues::Int(i) => Some(*i as f64),
            RowValues::Float(f) => Some(*f),
            RowValues::Text(s) => s.trim().parse::<f64>().ok(),
            RowValues::Null | RowValues::Blob(_) => None,
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn real_to_bound(value: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, so the upper check is exclusive.
    if value.is_finite() && value >= i64::MIN as f64 && value < i64::MAX as f64 {
        Some(value.trunc() as i64)
    } else {
        None
    }
}

/// Declared storage type of a copied column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SqlType {
    Integer,
    Real,
    Text,
}

impl SqlType {
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
            SqlType::Text => "TEXT",
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for SqlType {
    type Err = SqlExpanderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INTEGER" | "INT" => Ok(SqlType::Integer),
            "REAL" | "DOUBLE" | "FLOAT" => Ok(SqlType::Real),
            "TEXT" => Ok(SqlType::Text),
            other => Err(SqlExpanderError::ConfigError(format!(
                "unsupported column type '{other}' (expected INTEGER, REAL or TEXT)"
            ))),
        }
    }
}

/// `PRAGMA synchronous` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SyncMode {
    Off,
    Normal,
    Full,
}

impl SyncMode {
    #[must_use]
    pub fn pragma_value(self) -> i32 {
        match self {
            SyncMode::Off => 0,
            SyncMode::Normal => 1,
            SyncMode::Full => 2,
        }
    }

    #[must_use]
    pub fn from_pragma(value: i64) -> Option<Self> {
        match value {
            0 => Some(SyncMode::Off),
            1 => Some(SyncMode::Normal),
            2 => Some(SyncMode::Full),
            _ => None,
        }
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncMode::Off => "OFF",
            SyncMode::Normal => "NORMAL",
            SyncMode::Full => "FULL",
        };
        f.write_str(name)
    }
}

/// `PRAGMA journal_mode` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JournalMode {
    Delete,
    Truncate,
    Memory,
    Persist,
    Wal,
    Off,
}

impl JournalMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            JournalMode::Delete => "DELETE",
            JournalMode::Truncate => "TRUNCATE",
            JournalMode::Memory => "MEMORY",
            JournalMode::Persist => "PERSIST",
            JournalMode::Wal => "WAL",
            JournalMode::Off => "OFF",
        }
    }

    /// Parse the mode name the engine reports back (lower case).
    #[must_use]
    pub fn from_reported(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "DELETE" => Some(JournalMode::Delete),
            "TRUNCATE" => Some(JournalMode::Truncate),
            "MEMORY" => Some(JournalMode::Memory),
            "PERSIST" => Some(JournalMode::Persist),
            "WAL" => Some(JournalMode::Wal),
            "OFF" => Some(JournalMode::Off),
            _ => None,
        }
    }
}

impl fmt::Display for JournalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned by a row callback to keep scanning or halt the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanControl {
    Continue,
    Abort,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_accept_integral_text_and_reals() {
        assert_eq!(RowValues::Int(-4).as_bound(), Some(-4));
        assert_eq!(RowValues::Float(5.9).as_bound(), Some(5));
        assert_eq!(RowValues::Text(" 12 ".into()).as_bound(), Some(12));
        assert_eq!(RowValues::Text("7.0".into()).as_bound(), Some(7));
        assert_eq!(RowValues::Text("week".into()).as_bound(), None);
        assert_eq!(RowValues::Float(f64::NAN).as_bound(), None);
        assert_eq!(RowValues::Null.as_bound(), None);
    }

    #[test]
    fn reals_parse_from_any_numeric_storage() {
        assert_eq!(RowValues::Int(3).as_real(), Some(3.0));
        assert_eq!(RowValues::Text("2.5".into()).as_real(), Some(2.5));
        assert_eq!(RowValues::Blob(vec![1]).as_real(), None);
    }

    #[test]
    fn sql_type_parses_case_insensitively() {
        assert_eq!("integer".parse::<SqlType>().unwrap(), SqlType::Integer);
        assert_eq!(" Text".parse::<SqlType>().unwrap(), SqlType::Text);
        assert!("VARCHAR(10)".parse::<SqlType>().is_err());
    }

    #[test]
    fn journal_mode_reads_engine_reply() {
        assert_eq!(JournalMode::from_reported("wal"), Some(JournalMode::Wal));
        assert_eq!(JournalMode::from_reported("bogus"), None);
        assert_eq!(SyncMode::from_pragma(2), Some(SyncMode::Full));
    }
}
