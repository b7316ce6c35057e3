//! Duplicate-eliminating workbook merge engine.
//!
//! Pure engine crate: receives pre-loaded workbooks, returns the merged
//! workbook plus a per-sheet report. No CLI or IO dependencies.

pub mod align;
pub mod config;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod merge;
pub mod model;
pub mod report;

pub use config::MergeConfig;
pub use engine::run;
pub use error::{FingerprintError, MergeError};
pub use fingerprint::{fingerprint_row, RowFingerprint};
pub use model::{Disposition, SheetReport, WorkbookMerge, WorkbookMergeReport};
