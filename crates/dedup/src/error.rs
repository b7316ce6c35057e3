use std::fmt;

use sheetmerge_engine::ModelError;

#[derive(Debug)]
pub enum MergeError {
    /// Both workbooks have zero sheets.
    EmptyWorkbook,
    /// Strict alignment found differing column sets, or a column rename
    /// collided with an existing secondary column.
    SchemaConflict {
        sheet: String,
        primary_only: Vec<String>,
        secondary_only: Vec<String>,
    },
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty mapping, unknown target sheet, etc.).
    ConfigValidation(String),
    /// Table or workbook construction failed.
    Model(ModelError),
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyWorkbook => write!(f, "both workbooks contain zero sheets"),
            Self::SchemaConflict {
                sheet,
                primary_only,
                secondary_only,
            } => {
                write!(f, "sheet '{sheet}': column sets differ")?;
                if !primary_only.is_empty() {
                    write!(f, "; primary only: {}", primary_only.join(", "))?;
                }
                if !secondary_only.is_empty() {
                    write!(f, "; secondary only: {}", secondary_only.join(", "))?;
                }
                Ok(())
            }
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Model(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for MergeError {}

impl From<ModelError> for MergeError {
    fn from(err: ModelError) -> Self {
        Self::Model(err)
    }
}

/// A row that cannot be encoded under the column list it was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FingerprintError {
    /// Row width differs from the number of columns.
    SchemaMismatch { expected: usize, found: usize },
}

impl fmt::Display for FingerprintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SchemaMismatch { expected, found } => {
                write!(f, "row has {found} value(s) but the schema has {expected} column(s)")
            }
        }
    }
}

impl std::error::Error for FingerprintError {}
