// Excel file import (xlsx, xlsm, xls, xlsb, ods) and export (xlsx only)
//
// Import: the first row of each sheet's used range is the header, the rest
// are data rows. Formatting and formulas are not read; cached values are.
// Date cells become ISO text so they survive a save.
// Export: header row plus values. Null cells are left blank.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use chrono::{NaiveDate, TimeDelta};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};
use sheetmerge_engine::{Number, Table, Value, Workbook};

use crate::headers::normalize_headers;
use crate::{ImportSummary, SheetSummary};

/// Worksheet limits of the xlsx format
const MAX_ROWS: usize = 1_048_576;
const MAX_COLS: usize = 16_384;

/// Import every sheet of a spreadsheet file, in workbook order.
pub fn import(path: &Path) -> Result<(Workbook, ImportSummary), String> {
    let mut source: Sheets<_> =
        open_workbook_auto(path).map_err(|e| format!("Failed to open spreadsheet: {}", e))?;

    let sheet_names: Vec<String> = source.sheet_names().to_vec();
    let mut workbook = Workbook::new();
    let mut summary = ImportSummary::default();

    for sheet_name in &sheet_names {
        let range = source
            .worksheet_range(sheet_name)
            .map_err(|e| format!("Failed to read sheet '{}': {}", sheet_name, e))?;

        let (height, width) = range.get_size();
        let table = if height == 0 || width == 0 {
            // Empty sheets are kept so the output keeps every sheet
            Table::empty()
        } else {
            let mut rows = range.rows();
            let header: Vec<String> = rows
                .next()
                .map(|cells| cells.iter().map(|c| cell_value(c).display()).collect())
                .unwrap_or_default();

            let mut body: Vec<Vec<Value>> = rows
                .map(|cells| cells.iter().map(cell_value).collect())
                .collect();
            while body.last().is_some_and(|r| r.iter().all(Value::is_null)) {
                body.pop();
            }

            Table::with_rows(normalize_headers(header), body)
                .map_err(|e| format!("Sheet '{}': {}", sheet_name, e))?
        };

        log::debug!(
            "imported sheet '{}': {} row(s), {} column(s)",
            sheet_name,
            table.row_count(),
            table.column_count()
        );
        summary.sheets.push(SheetSummary::of(sheet_name, &table));
        workbook
            .add_sheet(sheet_name.clone(), table)
            .map_err(|e| e.to_string())?;
    }

    Ok((workbook, summary))
}

/// Map one calamine cell onto a value.
fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) if s.is_empty() => Value::Null,
        Data::String(s) => Value::text(s.clone()),
        Data::Float(n) => Value::float(*n),
        Data::Int(n) => Value::int(*n),
        Data::Bool(b) => Value::Boolean(*b),
        Data::Error(e) => Value::text(format!("#{:?}", e)),
        Data::DateTime(dt) => excel_serial_to_iso(dt.as_f64())
            .map(Value::Text)
            .unwrap_or_else(|| Value::float(dt.as_f64())),
        Data::DateTimeIso(s) => Value::text(s.clone()),
        Data::DurationIso(s) => Value::text(s.clone()),
    }
}

/// Excel serial number to ISO text: `2023-07-16`, `18:00:00` or
/// `2023-07-16 18:00:00` depending on which parts the serial carries.
/// The 1900 date system is assumed.
fn excel_serial_to_iso(serial: f64) -> Option<String> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let seconds = (serial * 86_400.0).round() as i64;
    let dt = epoch.checked_add_signed(TimeDelta::try_seconds(seconds)?)?;

    let has_date = seconds >= 86_400;
    let has_time = seconds % 86_400 != 0;
    let pattern = match (has_date, has_time) {
        (true, true) => "%Y-%m-%d %H:%M:%S",
        (false, true) => "%H:%M:%S",
        _ => "%Y-%m-%d",
    };
    Some(dt.format(pattern).to_string())
}

/// Result of an xlsx export
#[derive(Debug, Default)]
pub struct ExportResult {
    pub sheets_exported: usize,
    pub rows_exported: usize,
}

/// Export a workbook to xlsx, one worksheet per sheet in workbook order.
pub fn export(workbook: &Workbook, path: &Path) -> Result<ExportResult, String> {
    let mut result = ExportResult::default();
    let mut xlsx_workbook = XlsxWorkbook::new();
    let header_format = Format::new().set_bold();

    for (name, table) in workbook.iter() {
        if table.row_count() + 1 > MAX_ROWS || table.column_count() > MAX_COLS {
            return Err(format!(
                "Sheet '{}' is too large for xlsx ({} rows x {} columns)",
                name,
                table.row_count(),
                table.column_count()
            ));
        }

        let worksheet = xlsx_workbook
            .add_worksheet()
            .set_name(name)
            .map_err(|e| format!("Failed to create sheet '{}': {}", name, e))?;

        for (col, column) in table.columns().iter().enumerate() {
            worksheet
                .write_string_with_format(0, col as u16, column, &header_format)
                .map_err(|e| format!("Failed to write header in '{}': {}", name, e))?;
        }

        for (row_idx, row) in table.rows().iter().enumerate() {
            let row32 = (row_idx + 1) as u32;
            for (col, value) in row.iter().enumerate() {
                let col16 = col as u16;
                let written = match value {
                    Value::Null => continue,
                    Value::Text(s) => worksheet.write_string(row32, col16, s),
                    Value::Number(Number::Int(i)) => worksheet.write_number(row32, col16, *i as f64),
                    Value::Number(Number::Float(f)) => worksheet.write_number(row32, col16, *f),
                    Value::Boolean(b) => worksheet.write_boolean(row32, col16, *b),
                };
                written.map_err(|e| format!("Failed to write cell in '{}': {}", name, e))?;
            }
        }

        result.sheets_exported += 1;
        result.rows_exported += table.row_count();
    }

    // An xlsx file needs at least one worksheet
    if workbook.is_empty() {
        xlsx_workbook.add_worksheet();
    }

    xlsx_workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {}", e))?;

    Ok(result)
}
