// Column Aligner
//
// Brings two tables onto one schema: the primary's columns in their original
// order, then the secondary-only columns in the secondary's order. Cells a
// table did not have become Null. Rows are never reordered.

use sheetmerge_engine::Table;

use crate::config::MergeConfig;
use crate::error::MergeError;

/// Two tables sharing one column schema.
#[derive(Debug, Clone)]
pub struct Alignment {
    pub primary: Table,
    pub secondary: Table,
    /// Secondary-only columns appended to the primary.
    pub columns_added_to_primary: Vec<String>,
    /// Primary-only columns filled with Null in the secondary.
    pub columns_added_to_secondary: Vec<String>,
}

impl Alignment {
    pub fn columns(&self) -> &[String] {
        self.primary.columns()
    }
}

/// Unite the two schemas. Never fails; inputs are left untouched.
pub fn align(primary: &Table, secondary: &Table) -> Alignment {
    let mut aligned_primary = primary.clone();
    let columns_added_to_primary = aligned_primary.extend_columns(secondary.columns().iter().cloned());
    let aligned_secondary = secondary.conform_to(&aligned_primary);

    let columns_added_to_secondary = primary
        .columns()
        .iter()
        .filter(|c| !secondary.has_column(c))
        .cloned()
        .collect();

    Alignment {
        primary: aligned_primary,
        secondary: aligned_secondary,
        columns_added_to_primary,
        columns_added_to_secondary,
    }
}

/// Columns unique to each side, each in its table's order.
pub fn column_difference(primary: &Table, secondary: &Table) -> (Vec<String>, Vec<String>) {
    let primary_only = primary
        .columns()
        .iter()
        .filter(|c| !secondary.has_column(c))
        .cloned()
        .collect();
    let secondary_only = secondary
        .columns()
        .iter()
        .filter(|c| !primary.has_column(c))
        .cloned()
        .collect();
    (primary_only, secondary_only)
}

/// Strict mode: the column sets must be equal (order may differ).
pub fn check_strict(sheet: &str, primary: &Table, secondary: &Table) -> Result<(), MergeError> {
    let (primary_only, secondary_only) = column_difference(primary, secondary);
    if primary_only.is_empty() && secondary_only.is_empty() {
        return Ok(());
    }
    Err(MergeError::SchemaConflict {
        sheet: sheet.to_string(),
        primary_only,
        secondary_only,
    })
}

/// Rename secondary columns through `config.column_map`.
///
/// A rename onto a column the secondary table already has is a schema
/// conflict for that sheet.
pub fn apply_column_map(sheet: &str, secondary: &Table, config: &MergeConfig) -> Result<Table, MergeError> {
    if !secondary.columns().iter().any(|c| config.mapped_column(c).is_some()) {
        return Ok(secondary.clone());
    }

    secondary
        .rename_columns(|c| config.mapped_column(c).map(str::to_string))
        .map_err(|_| {
            let clashing: Vec<String> = secondary
                .columns()
                .iter()
                .filter_map(|c| config.mapped_column(c).map(|to| (c, to)))
                .filter(|(_, to)| secondary.has_column(to))
                .flat_map(|(from, to)| [from.clone(), to.to_string()])
                .collect();
            MergeError::SchemaConflict {
                sheet: sheet.to_string(),
                primary_only: Vec::new(),
                secondary_only: clashing,
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetmerge_engine::Value;

    fn table(columns: &[&str], rows: Vec<Vec<Value>>) -> Table {
        Table::with_rows(columns.iter().copied(), rows).unwrap()
    }

    #[test]
    fn union_keeps_primary_order_then_secondary_extras() {
        let a = table(&["id", "name"], vec![vec![Value::int(1), Value::text("A")]]);
        let b = table(
            &["email", "id", "phone"],
            vec![vec![Value::text("x@y"), Value::int(2), Value::Null]],
        );
        let al = align(&a, &b);

        assert_eq!(al.columns(), &["id", "name", "email", "phone"]);
        assert_eq!(al.secondary.columns(), al.primary.columns());
        assert_eq!(al.columns_added_to_primary, vec!["email", "phone"]);
        assert_eq!(al.columns_added_to_secondary, vec!["name"]);

        assert_eq!(
            al.primary.row(0).unwrap(),
            &[Value::int(1), Value::text("A"), Value::Null, Value::Null]
        );
        assert_eq!(
            al.secondary.row(0).unwrap(),
            &[Value::int(2), Value::Null, Value::text("x@y"), Value::Null]
        );
    }

    #[test]
    fn identical_schemas_add_nothing() {
        let a = table(&["id"], vec![vec![Value::int(1)]]);
        let b = table(&["id"], vec![vec![Value::int(1)], vec![Value::int(2)]]);
        let al = align(&a, &b);
        assert!(al.columns_added_to_primary.is_empty());
        assert!(al.columns_added_to_secondary.is_empty());
        assert_eq!(al.secondary.row_count(), 2);
    }

    #[test]
    fn empty_sheet_takes_other_schema() {
        let a = Table::empty();
        let b = table(&["id"], vec![vec![Value::int(7)]]);
        let al = align(&a, &b);
        assert_eq!(al.columns(), &["id"]);
        assert!(al.primary.is_empty());
        assert_eq!(al.secondary.row(0).unwrap(), &[Value::int(7)]);
    }

    #[test]
    fn strict_reports_both_sides() {
        let a = table(&["id", "name"], vec![]);
        let b = table(&["id", "email"], vec![]);
        match check_strict("Data", &a, &b).unwrap_err() {
            MergeError::SchemaConflict {
                sheet,
                primary_only,
                secondary_only,
            } => {
                assert_eq!(sheet, "Data");
                assert_eq!(primary_only, vec!["name"]);
                assert_eq!(secondary_only, vec!["email"]);
            }
            other => panic!("expected SchemaConflict, got {other:?}"),
        }

        let reordered = table(&["name", "id"], vec![]);
        assert!(check_strict("Data", &a, &reordered).is_ok());
    }

    #[test]
    fn column_map_renames_secondary() {
        let config = MergeConfig::from_toml("[column_map]\n\"E-mail\" = \"email\"\n").unwrap();
        let b = table(&["id", "E-mail"], vec![vec![Value::int(1), Value::text("a@b")]]);
        let renamed = apply_column_map("S", &b, &config).unwrap();
        assert_eq!(renamed.columns(), &["id", "email"]);
        assert_eq!(renamed.value(0, "email"), Some(&Value::text("a@b")));
    }

    #[test]
    fn column_map_collision_is_conflict() {
        let config = MergeConfig::from_toml("[column_map]\n\"E-mail\" = \"email\"\n").unwrap();
        let b = table(&["email", "E-mail"], vec![]);
        match apply_column_map("S", &b, &config).unwrap_err() {
            MergeError::SchemaConflict { secondary_only, .. } => {
                assert_eq!(secondary_only, vec!["E-mail", "email"]);
            }
            other => panic!("expected SchemaConflict, got {other:?}"),
        }
    }
}
