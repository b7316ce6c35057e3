use std::fmt;

/// Structural errors raised while building tables and workbooks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Column name appears twice in one table (names are case-sensitive).
    DuplicateColumn(String),
    /// Sheet name appears twice in one workbook.
    DuplicateSheet(String),
    /// Row has a different number of values than the table has columns.
    RowWidth { expected: usize, found: usize },
    /// Record names a column the table does not have.
    UnknownColumn(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateColumn(name) => write!(f, "duplicate column '{name}'"),
            Self::DuplicateSheet(name) => write!(f, "duplicate sheet '{name}'"),
            Self::RowWidth { expected, found } => {
                write!(f, "row has {found} value(s), table has {expected} column(s)")
            }
            Self::UnknownColumn(name) => write!(f, "unknown column '{name}'"),
        }
    }
}

impl std::error::Error for ModelError {}
