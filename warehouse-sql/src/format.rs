//! Permitted values of the `format` column.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a stored value is not an accepted [`TableFormat`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The value exceeds [`TableFormat::MAX_LENGTH`] characters.
    #[error("format is {len} characters long, at most {max} allowed", max = TableFormat::MAX_LENGTH)]
    TooLong { len: usize },

    /// The value is not one of the permitted stored values.
    #[error("'{0}' is not a valid format")]
    Unknown(String),
}

/// File format of the objects a data warehouse table reads from.
///
/// Each variant has a stored value, the literal persisted in the `format`
/// column, and a display label. They differ only for [`TableFormat::JsonEachRow`],
/// stored as `JSONEachRow` and labelled `JSON`.
///
/// ```
/// use warehouse_sql::TableFormat;
///
/// let format: TableFormat = "JSONEachRow".parse().unwrap();
/// assert_eq!(format.label(), "JSON");
/// assert!("JSON".parse::<TableFormat>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum TableFormat {
    Csv,
    CsvWithNames,
    Parquet,
    JsonEachRow,
}

impl TableFormat {
    /// Maximum length of the `format` column.
    pub const MAX_LENGTH: usize = 128;

    /// Every permitted format, in declaration order.
    pub const ALL: [TableFormat; 4] = [
        TableFormat::Csv,
        TableFormat::CsvWithNames,
        TableFormat::Parquet,
        TableFormat::JsonEachRow,
    ];

    /// Value persisted in the `format` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            TableFormat::Csv => "CSV",
            TableFormat::CsvWithNames => "CSVWithNames",
            TableFormat::Parquet => "Parquet",
            TableFormat::JsonEachRow => "JSONEachRow",
        }
    }

    /// Human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            TableFormat::JsonEachRow => "JSON",
            other => other.as_str(),
        }
    }

    /// `(stored value, label)` pairs in declaration order.
    pub fn choices() -> impl Iterator<Item = (&'static str, &'static str)> {
        Self::ALL.into_iter().map(|f| (f.as_str(), f.label()))
    }

    /// Stored values in declaration order.
    pub fn values() -> impl Iterator<Item = &'static str> {
        Self::ALL.into_iter().map(|f| f.as_str())
    }
}

impl FromStr for TableFormat {
    type Err = FormatError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let len = value.chars().count();
        if len > Self::MAX_LENGTH {
            return Err(FormatError::TooLong { len });
        }

        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == value)
            .ok_or_else(|| FormatError::Unknown(value.to_owned()))
    }
}

impl TryFrom<String> for TableFormat {
    type Error = FormatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TableFormat> for &'static str {
    fn from(value: TableFormat) -> Self {
        value.as_str()
    }
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
