use sheetmerge_engine::Table;

use crate::align::Alignment;
use crate::merge::MergeResult;
use crate::model::{Disposition, MergeTotals, SheetReport};

/// Report for a sheet that went through alignment and deduplication.
pub fn merged_sheet(name: &str, alignment: &Alignment, result: &MergeResult) -> SheetReport {
    SheetReport {
        name: name.to_string(),
        disposition: Disposition::Merged,
        rows_before: result.rows_before,
        rows_added: result.rows_added,
        rows_skipped_as_duplicate: result.rows_skipped_as_duplicate,
        final_row_count: result.final_row_count,
        duplicates_within_secondary: result.duplicates_within_secondary,
        fingerprint_failures: result.fingerprint_failures,
        columns_added_to_primary: alignment.columns_added_to_primary.clone(),
        columns_added_to_secondary: alignment.columns_added_to_secondary.clone(),
    }
}

/// Report for a primary sheet passed through unchanged.
pub fn primary_only_sheet(name: &str, table: &Table) -> SheetReport {
    SheetReport {
        name: name.to_string(),
        disposition: Disposition::PrimaryOnly,
        rows_before: table.row_count(),
        rows_added: 0,
        rows_skipped_as_duplicate: 0,
        final_row_count: table.row_count(),
        duplicates_within_secondary: 0,
        fingerprint_failures: 0,
        columns_added_to_primary: Vec::new(),
        columns_added_to_secondary: Vec::new(),
    }
}

/// Report for a secondary sheet added wholesale.
pub fn secondary_only_sheet(name: &str, table: &Table) -> SheetReport {
    SheetReport {
        name: name.to_string(),
        disposition: Disposition::SecondaryOnly,
        rows_before: 0,
        rows_added: table.row_count(),
        rows_skipped_as_duplicate: 0,
        final_row_count: table.row_count(),
        duplicates_within_secondary: 0,
        fingerprint_failures: 0,
        columns_added_to_primary: Vec::new(),
        columns_added_to_secondary: Vec::new(),
    }
}

/// Sum per-sheet counts.
pub fn compute_totals(sheets: &[SheetReport]) -> MergeTotals {
    sheets.iter().fold(MergeTotals::default(), |mut t, s| {
        t.sheets_processed += 1;
        t.rows_before += s.rows_before;
        t.rows_added += s.rows_added;
        t.rows_skipped_as_duplicate += s.rows_skipped_as_duplicate;
        t.final_row_count += s.final_row_count;
        t.duplicates_within_secondary += s.duplicates_within_secondary;
        t.fingerprint_failures += s.fingerprint_failures;
        t
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetmerge_engine::Value;

    fn rows(n: i64) -> Table {
        Table::with_rows(["id"], (0..n).map(|i| vec![Value::int(i)]).collect()).unwrap()
    }

    #[test]
    fn pass_through_counts_hold_invariants() {
        let p = primary_only_sheet("P", &rows(3));
        assert_eq!(p.rows_before + p.rows_added, p.final_row_count);
        assert_eq!(p.final_row_count, 3);

        let s = secondary_only_sheet("S", &rows(4));
        assert_eq!(s.rows_before, 0);
        assert_eq!(s.rows_added, 4);
        assert_eq!(s.rows_added + s.rows_skipped_as_duplicate, 4);
        assert_eq!(s.disposition, Disposition::SecondaryOnly);
    }

    #[test]
    fn totals_sum_sheets() {
        let sheets = vec![primary_only_sheet("P", &rows(3)), secondary_only_sheet("S", &rows(4))];
        let totals = compute_totals(&sheets);
        assert_eq!(totals.sheets_processed, 2);
        assert_eq!(totals.rows_before, 3);
        assert_eq!(totals.rows_added, 4);
        assert_eq!(totals.final_row_count, 7);
        assert_eq!(totals.rows_skipped_as_duplicate, 0);
    }

    #[test]
    fn disposition_serializes_snake_case() {
        let json = serde_json::to_string(&Disposition::PrimaryOnly).unwrap();
        assert_eq!(json, r#""primary_only""#);
        assert_eq!(Disposition::SecondaryOnly.to_string(), "secondary_only");
    }
}
