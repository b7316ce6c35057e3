// File I/O: load spreadsheets into workbooks and save them back

pub mod csv;
pub mod headers;
pub mod save;
pub mod xlsx;

use std::path::Path;

use serde::Serialize;
use sheetmerge_engine::{Table, Workbook};

pub use save::{backup_path, save_workbook, SaveOutcome};

/// File formats recognised by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Xlsx,
    Xlsm,
    Xls,
    Xlsb,
    Ods,
    Csv,
    Tsv,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" => Some(Self::Xlsx),
            "xlsm" => Some(Self::Xlsm),
            "xls" => Some(Self::Xls),
            "xlsb" => Some(Self::Xlsb),
            "ods" => Some(Self::Ods),
            "csv" => Some(Self::Csv),
            "tsv" | "tab" => Some(Self::Tsv),
            _ => None,
        }
    }

    /// Whether the saver can write this format.
    pub fn is_writable(&self) -> bool {
        matches!(self, Self::Xlsx | Self::Csv | Self::Tsv)
    }
}

/// Per-sheet counts from a load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetSummary {
    pub name: String,
    pub rows: usize,
    pub columns: usize,
}

impl SheetSummary {
    pub fn of(name: &str, table: &Table) -> Self {
        Self {
            name: name.to_string(),
            rows: table.row_count(),
            columns: table.column_count(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
    pub sheets: Vec<SheetSummary>,
}

/// Load a spreadsheet or delimited file into a workbook.
pub fn load_workbook(path: &Path) -> Result<(Workbook, ImportSummary), String> {
    let format = FileFormat::from_path(path)
        .ok_or_else(|| format!("{}: unsupported file type", path.display()))?;

    let (workbook, summary) = match format {
        FileFormat::Csv | FileFormat::Tsv => {
            let table = if format == FileFormat::Tsv {
                csv::import_tsv(path)?
            } else {
                csv::import(path)?
            };
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .filter(|s| !s.is_empty())
                .unwrap_or("Sheet1")
                .to_string();
            let summary = ImportSummary {
                sheets: vec![SheetSummary::of(&name, &table)],
            };
            let workbook = Workbook::from_sheets([(name, table)]).map_err(|e| e.to_string())?;
            (workbook, summary)
        }
        _ => xlsx::import(path)?,
    };

    log::info!(
        "loaded {}: {} sheet(s), {} row(s)",
        path.display(),
        workbook.len(),
        workbook.total_rows()
    );
    Ok((workbook, summary))
}
