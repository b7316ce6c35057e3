// Workbook: an ordered collection of uniquely named sheets
//
// Sheets are held behind `Arc` so a merge result can pass a sheet through
// from its input without copying the rows.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::ModelError;
use crate::table::Table;

#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<(String, Arc<Table>)>,
    index: FxHashMap<String, usize>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sheet. Names are matched exactly (case-sensitive).
    pub fn add_sheet(&mut self, name: impl Into<String>, table: Table) -> Result<(), ModelError> {
        self.add_shared(name, Arc::new(table))
    }

    /// Append a sheet that is already shared with another workbook.
    pub fn add_shared(&mut self, name: impl Into<String>, table: Arc<Table>) -> Result<(), ModelError> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(ModelError::DuplicateSheet(name));
        }
        self.index.insert(name.clone(), self.sheets.len());
        self.sheets.push((name, table));
        Ok(())
    }

    /// Build a workbook from (name, table) pairs, keeping their order.
    pub fn from_sheets<I, S>(sheets: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = (S, Table)>,
        S: Into<String>,
    {
        let mut wb = Self::new();
        for (name, table) in sheets {
            wb.add_sheet(name, table)?;
        }
        Ok(wb)
    }

    pub fn sheet(&self, name: &str) -> Option<&Table> {
        self.shared(name).map(|t| t.as_ref())
    }

    pub fn shared(&self, name: &str) -> Option<&Arc<Table>> {
        self.index.get(name).map(|&i| &self.sheets[i].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|(n, _)| n.as_str())
    }

    /// Sheets in workbook order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Table)> {
        self.sheets.iter().map(|(n, t)| (n.as_str(), t.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Total data rows across every sheet.
    pub fn total_rows(&self) -> usize {
        self.sheets.iter().map(|(_, t)| t.row_count()).sum()
    }
}
