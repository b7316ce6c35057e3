// Sheet Merger
//
// Appends the secondary rows whose fingerprint is not already present. The
// seen-set grows as rows are added, so repeats inside the secondary collapse
// too. Primary rows are never removed or reordered.
//
// A secondary row that repeats any earlier secondary row counts as a
// within-secondary duplicate, whether the earlier copy was added or skipped.

use rustc_hash::FxHashSet;
use sheetmerge_engine::Table;

use crate::fingerprint::{fingerprint_row, RowFingerprint};

/// Output table plus counts for one merged sheet.
#[derive(Debug, Clone)]
pub struct MergeResult {
    pub table: Table,
    pub rows_before: usize,
    pub rows_added: usize,
    pub rows_skipped_as_duplicate: usize,
    pub final_row_count: usize,
    pub duplicates_within_secondary: usize,
    pub fingerprint_failures: usize,
}

/// Merge two aligned tables. Total: an empty secondary adds nothing, and rows
/// that cannot be fingerprinted are kept.
pub fn merge_sheet(sheet: &str, primary: &Table, secondary: &Table) -> MergeResult {
    let columns = primary.columns();
    let mut seen: FxHashSet<RowFingerprint> = FxHashSet::default();
    seen.reserve(primary.row_count() + secondary.row_count());
    let mut fingerprint_failures = 0;

    for (idx, row) in primary.rows().iter().enumerate() {
        match fingerprint_row(row, columns) {
            Ok(fp) => {
                seen.insert(fp);
            }
            Err(e) => {
                log::warn!("sheet '{sheet}': primary row {}: {e}; kept as unique", idx + 1);
                fingerprint_failures += 1;
            }
        }
    }

    // Every fingerprint met so far in the secondary
    let mut secondary_seen: FxHashSet<RowFingerprint> = FxHashSet::default();
    let mut keep = Vec::new();
    let mut duplicates_within_secondary = 0;

    for (idx, row) in secondary.rows().iter().enumerate() {
        match fingerprint_row(row, secondary.columns()) {
            Ok(fp) => {
                if !secondary_seen.insert(fp) {
                    duplicates_within_secondary += 1;
                }
                if seen.insert(fp) {
                    keep.push(idx);
                } else {
                    log::debug!("sheet '{sheet}': secondary row {} is a duplicate ({fp})", idx + 1);
                }
            }
            Err(e) => {
                log::warn!("sheet '{sheet}': secondary row {}: {e}; kept as unique", idx + 1);
                fingerprint_failures += 1;
                keep.push(idx);
            }
        }
    }

    let rows_before = primary.row_count();
    let rows_added = keep.len();

    let mut table = primary.clone();
    table.reserve(rows_added);
    table.append_rows_from(secondary, keep);

    MergeResult {
        rows_before,
        rows_added,
        rows_skipped_as_duplicate: secondary.row_count() - rows_added,
        final_row_count: table.row_count(),
        duplicates_within_secondary,
        fingerprint_failures,
        table,
    }
}
