//! Tabular data model shared by the merge engine, loader and CLI.
//!
//! A [`Workbook`] is an ordered set of named [`Table`]s; a table is a list of
//! columns plus positional rows of [`Value`]s.

pub mod error;
pub mod table;
pub mod value;
pub mod workbook;

pub use error::ModelError;
pub use table::Table;
pub use value::{Number, Value};
pub use workbook::Workbook;
