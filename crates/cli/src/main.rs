// sheetmerge CLI - merge two spreadsheets without duplicate rows

mod exit_codes;
mod logger;
mod merge;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_SUCCESS, EXIT_USAGE};
use merge::MergeArgs;

#[derive(Parser)]
#[command(name = "sheetmerge")]
#[command(about = "Merge two spreadsheets sheet by sheet, skipping duplicate rows")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Debug logging to stderr (otherwise SHEETMERGE_LOG decides)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge SECONDARY into PRIMARY and save the result
    #[command(after_help = "\
Examples:
  sheetmerge merge customers.xlsx export.xlsx
  sheetmerge merge customers.xlsx export.xlsx -o merged.xlsx --json
  sheetmerge merge master.csv new.csv --map E-mail=email --dry-run
  sheetmerge merge book.xlsx other.xlsx -c merge.toml --report merge.json")]
    Merge {
        /// File being updated
        primary: PathBuf,

        /// File supplying candidate rows
        secondary: PathBuf,

        /// Write here instead of overwriting PRIMARY
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Merge config (TOML)
        #[arg(long, short = 'c', env = "SHEETMERGE_CONFIG")]
        config: Option<PathBuf>,

        /// Merge only this sheet
        #[arg(long)]
        sheet: Option<String>,

        /// Rename a secondary column before aligning (repeatable)
        #[arg(long, value_name = "SRC=DST")]
        map: Vec<String>,

        /// Leave out sheets that exist only in SECONDARY
        #[arg(long)]
        ignore_new_sheets: bool,

        /// Fail unless both sides of a sheet have the same columns
        #[arg(long)]
        strict_columns: bool,

        /// Merge sheets on worker threads
        #[arg(long)]
        parallel: bool,

        /// Merge and report, but write nothing
        #[arg(long)]
        dry_run: bool,

        /// Print the report as JSON to stdout
        #[arg(long)]
        json: bool,

        /// Also write the JSON report to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Check a merge config without running it
    #[command(after_help = "\
Examples:
  sheetmerge validate merge.toml")]
    Validate {
        /// Path to the merge config
        config: PathBuf,
    },

    /// List the sheets of a file with row and column counts
    Sheets {
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    let result = match cli.command {
        Commands::Merge {
            primary,
            secondary,
            output,
            config,
            sheet,
            map,
            ignore_new_sheets,
            strict_columns,
            parallel,
            dry_run,
            json,
            report,
        } => merge::cmd_merge(MergeArgs {
            primary,
            secondary,
            output,
            config,
            sheet,
            map,
            ignore_new_sheets,
            strict_columns,
            parallel,
            dry_run,
            json,
            report,
        }),
        Commands::Validate { config } => merge::cmd_validate(config),
        Commands::Sheets { file, json } => merge::cmd_sheets(file, json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
