// In-memory table: one sheet's columns and rows
//
// Rows are stored positionally, one value per column, so a row can never be
// missing a column. Name-based access goes through the column index.

use rustc_hash::FxHashMap;

use crate::error::ModelError;
use crate::value::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    index: FxHashMap<String, usize>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create a table with the given column names and no rows.
    pub fn new<I, S>(columns: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::empty();
        for name in columns {
            table.add_column_name(name.into())?;
        }
        Ok(table)
    }

    /// A sheet with no columns and no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a table and fill it with positional rows.
    pub fn with_rows<I, S>(columns: I, rows: Vec<Vec<Value>>) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new(columns)?;
        table.rows.reserve(rows.len());
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    fn add_column_name(&mut self, name: String) -> Result<usize, ModelError> {
        if self.index.contains_key(&name) {
            return Err(ModelError::DuplicateColumn(name));
        }
        let idx = self.columns.len();
        self.index.insert(name.clone(), idx);
        self.columns.push(name);
        Ok(idx)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// True when the table has no rows (it may still have columns).
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row(&self, idx: usize) -> Option<&[Value]> {
        self.rows.get(idx).map(|r| r.as_slice())
    }

    /// Value at (row, column name).
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let col = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// A row as ordered (column, value) pairs.
    pub fn record(&self, row: usize) -> Option<Vec<(&str, &Value)>> {
        let values = self.rows.get(row)?;
        Some(
            self.columns
                .iter()
                .map(|c| c.as_str())
                .zip(values.iter())
                .collect(),
        )
    }

    pub fn reserve(&mut self, additional: usize) {
        self.rows.reserve(additional);
    }

    /// Append a positional row. Width must match the column count.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), ModelError> {
        if row.len() != self.columns.len() {
            return Err(ModelError::RowWidth {
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Append a row given as (column, value) pairs. Columns not named are Null.
    pub fn push_record<I, K>(&mut self, record: I) -> Result<(), ModelError>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        let mut row = vec![Value::Null; self.columns.len()];
        for (name, value) in record {
            let name = name.as_ref();
            let col = self
                .column_index(name)
                .ok_or_else(|| ModelError::UnknownColumn(name.to_string()))?;
            row[col] = value;
        }
        self.rows.push(row);
        Ok(())
    }

    /// Add a column at the end, filling existing rows with `fill`.
    pub fn append_column(&mut self, name: impl Into<String>, fill: Value) -> Result<(), ModelError> {
        self.add_column_name(name.into())?;
        for row in &mut self.rows {
            row.push(fill.clone());
        }
        Ok(())
    }

    /// Append every name that is not already a column, filling existing rows
    /// with Null. Returns the names that were added, in order.
    pub fn extend_columns<I, S>(&mut self, names: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut added = Vec::new();
        for name in names {
            let name = name.into();
            if self.index.contains_key(&name) {
                continue;
            }
            self.index.insert(name.clone(), self.columns.len());
            self.columns.push(name.clone());
            added.push(name);
        }
        if !added.is_empty() {
            let width = self.columns.len();
            for row in &mut self.rows {
                row.resize(width, Value::Null);
            }
        }
        added
    }

    /// Rebuild this table's rows over `schema`'s columns.
    ///
    /// Columns present in both keep their values; schema columns this table
    /// lacks are Null; columns outside the schema are dropped. Row order is
    /// unchanged and `schema`'s rows are ignored.
    pub fn conform_to(&self, schema: &Table) -> Table {
        let sources: Vec<Option<usize>> = schema
            .columns
            .iter()
            .map(|c| self.column_index(c))
            .collect();

        let rows = self
            .rows
            .iter()
            .map(|row| {
                sources
                    .iter()
                    .map(|src| src.map(|i| row[i].clone()).unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Table {
            columns: schema.columns.clone(),
            index: schema.index.clone(),
            rows,
        }
    }

    /// Append the rows of `other` at `indices`, matching columns by name.
    /// Columns `other` lacks are Null; its extra columns are dropped.
    pub fn append_rows_from<I>(&mut self, other: &Table, indices: I)
    where
        I: IntoIterator<Item = usize>,
    {
        let sources: Vec<Option<usize>> = self
            .columns
            .iter()
            .map(|c| other.column_index(c))
            .collect();

        for idx in indices {
            let Some(row) = other.rows.get(idx) else {
                continue;
            };
            self.rows.push(
                sources
                    .iter()
                    .map(|src| src.map(|i| row[i].clone()).unwrap_or(Value::Null))
                    .collect(),
            );
        }
    }

    /// Copy of the table with columns renamed through `rename`.
    ///
    /// Names the closure maps to `None` are kept. Fails if two columns end up
    /// with the same name.
    pub fn rename_columns<F>(&self, mut rename: F) -> Result<Table, ModelError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let names: Vec<String> = self
            .columns
            .iter()
            .map(|c| rename(c).unwrap_or_else(|| c.clone()))
            .collect();
        let mut renamed = Table::new(names)?;
        renamed.rows = self.rows.clone();
        Ok(renamed)
    }

    pub fn into_rows(self) -> Vec<Vec<Value>> {
        self.rows
    }
}
