use std::sync::Arc;

use sheetmerge_engine::{Table, Workbook};

use crate::align::{align, apply_column_map, check_strict};
use crate::config::{AlignMode, MergeConfig, SecondaryOnlySheets};
use crate::error::MergeError;
use crate::merge::merge_sheet;
use crate::model::{MergeMeta, SheetReport, WorkbookMerge, WorkbookMergeReport};
use crate::report::{compute_totals, merged_sheet, primary_only_sheet, secondary_only_sheet};

/// One output sheet and how to produce it.
enum SheetTask<'a> {
    Merge {
        name: &'a str,
        primary: &'a Arc<Table>,
        secondary: &'a Table,
    },
    PrimaryOnly {
        name: &'a str,
        table: &'a Arc<Table>,
    },
    SecondaryOnly {
        name: &'a str,
        table: &'a Arc<Table>,
    },
}

type SheetOutcome = Result<(Arc<Table>, SheetReport), MergeError>;

/// Merge `secondary` into `primary` per config. Inputs are not modified;
/// sheets that pass through unchanged are shared with the input workbooks.
pub fn run(config: &MergeConfig, primary: &Workbook, secondary: &Workbook) -> Result<WorkbookMerge, MergeError> {
    if primary.is_empty() && secondary.is_empty() {
        return Err(MergeError::EmptyWorkbook);
    }
    config.validate()?;

    if let Some(target) = &config.target_sheet {
        if !primary.contains(target) && !secondary.contains(target) {
            return Err(MergeError::ConfigValidation(format!(
                "target sheet '{target}' not found in either workbook"
            )));
        }
    }

    let (tasks, ignored_sheets) = plan(config, primary, secondary);

    let outcomes: Vec<SheetOutcome> = if config.parallel && tasks.len() > 1 {
        run_parallel(config, &tasks)
    } else {
        tasks.iter().map(|task| execute(config, task)).collect()
    };

    let mut workbook = Workbook::new();
    let mut sheets = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        let (table, report) = outcome?;
        workbook.add_shared(report.name.clone(), table)?;
        sheets.push(report);
    }

    for name in &ignored_sheets {
        log::info!("sheet '{name}': ignored (secondary only)");
    }

    let totals = compute_totals(&sheets);
    log::info!(
        "merged {} sheet(s): {} row(s) added, {} duplicate(s) skipped",
        totals.sheets_processed,
        totals.rows_added,
        totals.rows_skipped_as_duplicate
    );

    Ok(WorkbookMerge {
        workbook,
        report: WorkbookMergeReport {
            meta: MergeMeta {
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
                run_at: chrono::Utc::now().to_rfc3339(),
            },
            sheets,
            ignored_sheets,
            totals,
        },
    })
}

/// Decide each output sheet: primary sheets in primary order, then
/// secondary-only sheets in secondary order. Returns the tasks plus the
/// secondary sheets left out.
fn plan<'a>(
    config: &MergeConfig,
    primary: &'a Workbook,
    secondary: &'a Workbook,
) -> (Vec<SheetTask<'a>>, Vec<String>) {
    let mut tasks = Vec::with_capacity(primary.len() + secondary.len());
    let mut ignored = Vec::new();

    for name in primary.sheet_names() {
        let Some(table) = primary.shared(name) else {
            continue;
        };
        match secondary.sheet(name) {
            Some(other) if config.selects(name) => tasks.push(SheetTask::Merge {
                name,
                primary: table,
                secondary: other,
            }),
            _ => tasks.push(SheetTask::PrimaryOnly { name, table }),
        }
    }

    for name in secondary.sheet_names() {
        if primary.contains(name) {
            if !config.selects(name) {
                ignored.push(name.to_string());
            }
            continue;
        }
        let Some(table) = secondary.shared(name) else {
            continue;
        };
        if config.selects(name) && config.secondary_only_sheets == SecondaryOnlySheets::Include {
            tasks.push(SheetTask::SecondaryOnly { name, table });
        } else {
            ignored.push(name.to_string());
        }
    }

    (tasks, ignored)
}

fn execute(config: &MergeConfig, task: &SheetTask<'_>) -> SheetOutcome {
    match *task {
        SheetTask::Merge {
            name,
            primary,
            secondary,
        } => {
            let secondary = apply_column_map(name, secondary, config)?;
            if config.align == AlignMode::Strict {
                check_strict(name, primary, &secondary)?;
            }

            let alignment = align(primary, &secondary);
            for column in &alignment.columns_added_to_primary {
                log::info!("sheet '{name}': added column '{column}' from secondary");
            }
            for column in &alignment.columns_added_to_secondary {
                log::debug!("sheet '{name}': secondary rows get null '{column}'");
            }

            let result = merge_sheet(name, &alignment.primary, &alignment.secondary);
            log::info!(
                "sheet '{name}': {} -> {} (+{}, {} duplicate(s) skipped)",
                result.rows_before,
                result.final_row_count,
                result.rows_added,
                result.rows_skipped_as_duplicate
            );

            let report = merged_sheet(name, &alignment, &result);
            Ok((Arc::new(result.table), report))
        }
        SheetTask::PrimaryOnly { name, table } => {
            log::info!("sheet '{name}': kept from primary ({} rows)", table.row_count());
            Ok((Arc::clone(table), primary_only_sheet(name, table)))
        }
        SheetTask::SecondaryOnly { name, table } => {
            log::info!("sheet '{name}': added from secondary ({} rows)", table.row_count());
            Ok((Arc::clone(table), secondary_only_sheet(name, table)))
        }
    }
}

/// Merge sheets on scoped workers. Each worker owns a contiguous run of tasks
/// and returns its outcomes; concatenating them restores output order.
fn run_parallel(config: &MergeConfig, tasks: &[SheetTask<'_>]) -> Vec<SheetOutcome> {
    let workers = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(tasks.len())
        .max(1);
    let chunk_size = tasks.len().div_ceil(workers);

    std::thread::scope(|scope| {
        let handles: Vec<_> = tasks
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || chunk.iter().map(|task| execute(config, task)).collect::<Vec<_>>())
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|handle| match handle.join() {
                Ok(outcomes) => outcomes,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    })
}
