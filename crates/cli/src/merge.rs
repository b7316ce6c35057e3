//! `sheetmerge merge` / `validate` / `sheets`

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sheetmerge_dedup::config::{AlignMode, SecondaryOnlySheets};
use sheetmerge_dedup::{Disposition, MergeConfig, WorkbookMergeReport};
use sheetmerge_engine::Workbook;
use sheetmerge_io::{load_workbook, save_workbook, FileFormat};

use crate::exit_codes::{merge_exit_code, EXIT_CONFIG, EXIT_IO};
use crate::CliError;

/// Flags of `sheetmerge merge`.
pub struct MergeArgs {
    pub primary: PathBuf,
    pub secondary: PathBuf,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub sheet: Option<String>,
    pub map: Vec<String>,
    pub ignore_new_sheets: bool,
    pub strict_columns: bool,
    pub parallel: bool,
    pub dry_run: bool,
    pub json: bool,
    pub report: Option<PathBuf>,
}

/// JSON emitted by `--json` / `--report`: the merge report plus where it went.
#[derive(Serialize)]
struct MergeOutput<'a> {
    output: Option<String>,
    backup: Option<String>,
    dry_run: bool,
    #[serde(flatten)]
    report: &'a WorkbookMergeReport,
}

fn err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

pub fn cmd_merge(args: MergeArgs) -> Result<(), CliError> {
    let config = build_config(&args)?;
    let output_path = args.output.clone().unwrap_or_else(|| args.primary.clone());

    if !args.dry_run {
        let writable = FileFormat::from_path(&output_path).is_some_and(|f| f.is_writable());
        if !writable {
            return Err(CliError::args(format!(
                "cannot write merged output to {}",
                output_path.display()
            ))
            .with_hint("pass -o with a .xlsx, .csv or .tsv path"));
        }
    }

    let (primary, _) = load_workbook(&args.primary).map_err(|e| err(EXIT_IO, e))?;
    let (secondary, _) = load_workbook(&args.secondary).map_err(|e| err(EXIT_IO, e))?;
    let delimited = is_delimited(&args.primary) || is_delimited(&args.secondary);
    let secondary = pair_single_sheets(&primary, secondary, delimited)?;

    let merged = sheetmerge_dedup::run(&config, &primary, &secondary).map_err(|e| {
        let code = merge_exit_code(&e);
        let hint = match &e {
            sheetmerge_dedup::MergeError::SchemaConflict { .. } => {
                Some("drop --strict-columns, or rename columns with --map SRC=DST")
            }
            sheetmerge_dedup::MergeError::EmptyWorkbook => Some("check that both files contain sheets"),
            _ => None,
        };
        CliError { code, message: e.to_string(), hint: hint.map(str::to_string) }
    })?;

    let mut saved_to = None;
    let mut backup = None;
    if !args.dry_run {
        let outcome = save_workbook(&merged.workbook, &output_path).map_err(|e| err(EXIT_IO, e))?;
        saved_to = Some(output_path.display().to_string());
        backup = outcome.backup_path.map(|p| p.display().to_string());
    }

    let output = MergeOutput {
        output: saved_to,
        backup,
        dry_run: args.dry_run,
        report: &merged.report,
    };

    if let Some(path) = &args.report {
        write_json(path, &output)?;
    }

    if args.json {
        let json = serde_json::to_string_pretty(&output).map_err(|e| err(EXIT_IO, e.to_string()))?;
        println!("{json}");
    } else {
        eprint!("{}", render_summary(&output));
    }

    Ok(())
}

fn is_delimited(path: &Path) -> bool {
    matches!(FileFormat::from_path(path), Some(FileFormat::Csv | FileFormat::Tsv))
}

/// A delimited file loads as one sheet named after its file stem, so two CSVs
/// would never share a sheet name. When either input is delimited and both
/// hold exactly one sheet, the secondary sheet takes the primary's name.
fn pair_single_sheets(primary: &Workbook, secondary: Workbook, delimited: bool) -> Result<Workbook, CliError> {
    if !delimited || primary.len() != 1 || secondary.len() != 1 {
        return Ok(secondary);
    }
    let (Some(target), Some(source)) = (primary.sheet_names().next(), secondary.sheet_names().next()) else {
        return Ok(secondary);
    };
    if target == source {
        return Ok(secondary);
    }
    let Some(table) = secondary.shared(source).cloned() else {
        return Ok(secondary);
    };

    log::info!("pairing secondary sheet '{source}' with primary sheet '{target}'");
    let mut paired = Workbook::new();
    paired.add_shared(target, table).map_err(|e| err(EXIT_IO, e.to_string()))?;
    Ok(paired)
}

/// Config file (if any) with command-line flags layered on top.
fn build_config(args: &MergeArgs) -> Result<MergeConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => read_config(path)?,
        None => MergeConfig::default(),
    };

    if let Some(sheet) = &args.sheet {
        config.target_sheet = Some(sheet.clone());
    }
    for entry in &args.map {
        let (from, to) = parse_mapping(entry)?;
        config.column_map.insert(from, to);
    }
    if args.ignore_new_sheets {
        config.secondary_only_sheets = SecondaryOnlySheets::Ignore;
    }
    if args.strict_columns {
        config.align = AlignMode::Strict;
    }
    if args.parallel {
        config.parallel = true;
    }

    config.validate().map_err(|e| err(EXIT_CONFIG, e.to_string()))?;
    Ok(config)
}

fn read_config(path: &Path) -> Result<MergeConfig, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| err(EXIT_IO, format!("cannot read config {}: {e}", path.display())))?;
    MergeConfig::from_toml(&text).map_err(|e| err(EXIT_CONFIG, format!("{}: {e}", path.display())))
}

/// `SRC=DST` -> (SRC, DST)
fn parse_mapping(entry: &str) -> Result<(String, String), CliError> {
    match entry.split_once('=') {
        Some((from, to)) if !from.is_empty() && !to.is_empty() => Ok((from.to_string(), to.to_string())),
        _ => Err(CliError::args(format!("invalid --map {entry:?}")).with_hint("expected SRC=DST, e.g. --map E-mail=email")),
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| err(EXIT_IO, e.to_string()))?;
    std::fs::write(path, json + "\n")
        .map_err(|e| err(EXIT_IO, format!("cannot write report {}: {e}", path.display())))
}

/// Human-readable merge summary, one line per sheet plus totals.
fn render_summary(output: &MergeOutput<'_>) -> String {
    let report = output.report;
    let width = report.sheets.iter().map(|s| s.name.chars().count()).max().unwrap_or(0);
    let mut out = String::new();

    for sheet in &report.sheets {
        let note = match sheet.disposition {
            Disposition::Merged => String::new(),
            Disposition::PrimaryOnly => "  [primary only]".to_string(),
            Disposition::SecondaryOnly => "  [new sheet]".to_string(),
        };
        out.push_str(&format!(
            "{:<width$}  {} -> {}  (+{} added, {} skipped){}\n",
            sheet.name, sheet.rows_before, sheet.final_row_count, sheet.rows_added, sheet.rows_skipped_as_duplicate, note,
        ));
        if !sheet.columns_added_to_primary.is_empty() {
            out.push_str(&format!(
                "{:<width$}  new columns: {}\n",
                "",
                sheet.columns_added_to_primary.join(", ")
            ));
        }
        if sheet.fingerprint_failures > 0 {
            out.push_str(&format!(
                "{:<width$}  {} row(s) kept without a fingerprint\n",
                "", sheet.fingerprint_failures
            ));
        }
    }

    for name in &report.ignored_sheets {
        out.push_str(&format!("{name:<width$}  ignored\n"));
    }

    let t = &report.totals;
    out.push_str(&format!(
        "total: {} sheet(s), {} -> {} rows (+{} added, {} skipped as duplicate)\n",
        t.sheets_processed, t.rows_before, t.final_row_count, t.rows_added, t.rows_skipped_as_duplicate
    ));

    match (&output.output, &output.backup) {
        (Some(path), Some(backup)) => out.push_str(&format!("saved {path} (backup: {backup})\n")),
        (Some(path), None) => out.push_str(&format!("saved {path}\n")),
        (None, _) => out.push_str("dry run: nothing written\n"),
    }
    out
}

// ============================================================================
// validate
// ============================================================================

pub fn cmd_validate(path: PathBuf) -> Result<(), CliError> {
    let config = read_config(&path)?;
    println!("{}: ok", path.display());
    if let Some(target) = &config.target_sheet {
        println!("  target_sheet: {target}");
    }
    println!("  secondary_only_sheets: {}", policy_name(config.secondary_only_sheets));
    println!("  align: {}", config.align);
    println!("  parallel: {}", config.parallel);
    for (from, to) in &config.column_map {
        println!("  map: {from} -> {to}");
    }
    Ok(())
}

fn policy_name(policy: SecondaryOnlySheets) -> &'static str {
    match policy {
        SecondaryOnlySheets::Include => "include",
        SecondaryOnlySheets::Ignore => "ignore",
    }
}

// ============================================================================
// sheets
// ============================================================================

pub fn cmd_sheets(file: PathBuf, json: bool) -> Result<(), CliError> {
    let (_, summary) = load_workbook(&file).map_err(|e| err(EXIT_IO, e))?;

    if json {
        let json = serde_json::to_string_pretty(&summary.sheets).map_err(|e| err(EXIT_IO, e.to_string()))?;
        println!("{json}");
        return Ok(());
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let width = summary.sheets.iter().map(|s| s.name.chars().count()).max().unwrap_or(0);
    for sheet in &summary.sheets {
        writeln!(out, "{:<width$}  {} rows x {} columns", sheet.name, sheet.rows, sheet.columns)
            .map_err(|e| err(EXIT_IO, e.to_string()))?;
    }
    Ok(())
}
