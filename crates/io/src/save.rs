// Saving with backup-before-overwrite
//
// An existing target is copied to `<stem>.backup.<ext>` next to it before the
// new content is written.

use std::path::{Path, PathBuf};

use sheetmerge_engine::Workbook;

use crate::FileFormat;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveOutcome {
    pub backup_path: Option<PathBuf>,
    pub sheets_written: usize,
    pub rows_written: usize,
}

/// `data/book.xlsx` -> `data/book.backup.xlsx`
pub fn backup_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}.backup.{}", ext.to_string_lossy()),
        None => format!("{stem}.backup"),
    };
    path.with_file_name(name)
}

/// Write `workbook` to `path` in the format its extension names. An existing
/// file at `path` is always backed up first.
pub fn save_workbook(workbook: &Workbook, path: &Path) -> Result<SaveOutcome, String> {
    let format = FileFormat::from_path(path)
        .filter(FileFormat::is_writable)
        .ok_or_else(|| format!("{}: cannot write this file type (use .xlsx, .csv or .tsv)", path.display()))?;

    if matches!(format, FileFormat::Csv | FileFormat::Tsv) && workbook.len() != 1 {
        return Err(format!(
            "{}: delimited files hold one sheet, workbook has {}",
            path.display(),
            workbook.len()
        ));
    }

    let mut outcome = SaveOutcome::default();

    if path.exists() {
        let backup = backup_path(path);
        std::fs::copy(path, &backup)
            .map_err(|e| format!("Failed to back up {} to {}: {}", path.display(), backup.display(), e))?;
        log::info!("backed up {} to {}", path.display(), backup.display());
        outcome.backup_path = Some(backup);
    }

    match format {
        FileFormat::Csv | FileFormat::Tsv => {
            if let Some((_, table)) = workbook.iter().next() {
                outcome.rows_written = if format == FileFormat::Tsv {
                    crate::csv::export_tsv(table, path)?
                } else {
                    crate::csv::export(table, path)?
                };
                outcome.sheets_written = 1;
            }
        }
        _ => {
            let result = crate::xlsx::export(workbook, path)?;
            outcome.sheets_written = result.sheets_exported;
            outcome.rows_written = result.rows_exported;
        }
    }

    log::info!(
        "saved {}: {} sheet(s), {} row(s)",
        path.display(),
        outcome.sheets_written,
        outcome.rows_written
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetmerge_engine::{Table, Value};
    use std::fs;
    use tempfile::tempdir;

    fn one_sheet() -> Workbook {
        let t = Table::with_rows(["id"], vec![vec![Value::int(1)], vec![Value::int(2)]]).unwrap();
        Workbook::from_sheets([("Data", t)]).unwrap()
    }

    #[test]
    fn backup_name_keeps_extension() {
        assert_eq!(backup_path(Path::new("/tmp/book.xlsx")), PathBuf::from("/tmp/book.backup.xlsx"));
        assert_eq!(backup_path(Path::new("data.csv")), PathBuf::from("data.backup.csv"));
        assert_eq!(backup_path(Path::new("/tmp/README")), PathBuf::from("/tmp/README.backup"));
    }

    #[test]
    fn overwrite_creates_backup_of_previous_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        fs::write(&path, "old,content\n").unwrap();

        let outcome = save_workbook(&one_sheet(), &path).unwrap();
        let backup = dir.path().join("out.backup.csv");
        assert_eq!(outcome.backup_path.as_deref(), Some(backup.as_path()));
        assert_eq!(fs::read_to_string(&backup).unwrap(), "old,content\n");
        assert_eq!(fs::read_to_string(&path).unwrap(), "id\n1\n2\n");
        assert_eq!(outcome.rows_written, 2);
    }

    #[test]
    fn backup_only_when_target_exists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("new.xlsx");
        let outcome = save_workbook(&one_sheet(), &path).unwrap();
        assert!(outcome.backup_path.is_none());
        assert_eq!(outcome.sheets_written, 1);
        assert!(!dir.path().join("new.backup.xlsx").exists());

        let outcome = save_workbook(&one_sheet(), &path).unwrap();
        assert_eq!(outcome.backup_path, Some(dir.path().join("new.backup.xlsx")));
    }

    #[test]
    fn csv_refuses_multi_sheet_workbooks() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("multi.csv");
        let wb = Workbook::from_sheets([("A", Table::empty()), ("B", Table::empty())]).unwrap();
        let err = save_workbook(&wb, &path).unwrap_err();
        assert!(err.contains("one sheet"), "{err}");
        assert!(!path.exists());
    }

    #[test]
    fn unwritable_formats_are_rejected_before_backup() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("legacy.xls");
        fs::write(&path, b"binary").unwrap();
        let err = save_workbook(&one_sheet(), &path).unwrap_err();
        assert!(err.contains("cannot write"), "{err}");
        assert!(!dir.path().join("legacy.backup.xls").exists());
    }
}
