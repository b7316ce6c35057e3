use serde::Serialize;
use sheetmerge_engine::Workbook;

// ---------------------------------------------------------------------------
// Per-sheet report
// ---------------------------------------------------------------------------

/// How a sheet reached the output workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// Present in both workbooks; aligned and deduplicated.
    Merged,
    /// Taken from the primary unchanged.
    PrimaryOnly,
    /// Added wholesale from the secondary.
    SecondaryOnly,
}

impl std::fmt::Display for Disposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Merged => write!(f, "merged"),
            Self::PrimaryOnly => write!(f, "primary_only"),
            Self::SecondaryOnly => write!(f, "secondary_only"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetReport {
    pub name: String,
    pub disposition: Disposition,
    pub rows_before: usize,
    pub rows_added: usize,
    pub rows_skipped_as_duplicate: usize,
    pub final_row_count: usize,
    /// Skipped secondary rows repeating an earlier secondary row, whether
    /// that earlier copy was added or itself skipped.
    pub duplicates_within_secondary: usize,
    /// Rows kept as unique because they could not be fingerprinted.
    pub fingerprint_failures: usize,
    pub columns_added_to_primary: Vec<String>,
    pub columns_added_to_secondary: Vec<String>,
}

// ---------------------------------------------------------------------------
// Workbook report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct MergeMeta {
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeTotals {
    pub sheets_processed: usize,
    pub rows_before: usize,
    pub rows_added: usize,
    pub rows_skipped_as_duplicate: usize,
    pub final_row_count: usize,
    pub duplicates_within_secondary: usize,
    pub fingerprint_failures: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkbookMergeReport {
    pub meta: MergeMeta,
    /// One entry per output sheet, in output order.
    pub sheets: Vec<SheetReport>,
    /// Secondary sheets left out of the output.
    pub ignored_sheets: Vec<String>,
    pub totals: MergeTotals,
}

impl WorkbookMergeReport {
    pub fn sheet(&self, name: &str) -> Option<&SheetReport> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Output of a workbook merge.
#[derive(Debug, Clone)]
pub struct WorkbookMerge {
    pub workbook: Workbook,
    pub report: WorkbookMergeReport,
}
