//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                         |
//! |------|-------------------------------------------------|
//! | 0    | Success                                         |
//! | 1    | General error (unspecified)                     |
//! | 2    | CLI usage error (bad args, unwritable output)   |
//! | 3    | I/O error (load, save, backup, report file)     |
//! | 4    | Merge config invalid                            |
//! | 5    | Both workbooks have zero sheets                 |
//! | 6    | Schema conflict (strict columns, rename clash)  |

use sheetmerge_dedup::MergeError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// A file could not be read or written.
pub const EXIT_IO: u8 = 3;

/// Config file failed to parse or validate.
pub const EXIT_CONFIG: u8 = 4;

/// Nothing to merge: both inputs have no sheets.
pub const EXIT_EMPTY_WORKBOOKS: u8 = 5;

/// Column sets could not be reconciled under the chosen policy.
pub const EXIT_SCHEMA_CONFLICT: u8 = 6;

/// Map a merge engine error to its exit code.
pub fn merge_exit_code(err: &MergeError) -> u8 {
    match err {
        MergeError::EmptyWorkbook => EXIT_EMPTY_WORKBOOKS,
        MergeError::SchemaConflict { .. } => EXIT_SCHEMA_CONFLICT,
        MergeError::ConfigParse(_) | MergeError::ConfigValidation(_) => EXIT_CONFIG,
        MergeError::Model(_) => EXIT_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_USAGE,
            EXIT_IO,
            EXIT_CONFIG,
            EXIT_EMPTY_WORKBOOKS,
            EXIT_SCHEMA_CONFLICT,
        ];
        let mut sorted = codes.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), codes.len());
    }

    #[test]
    fn merge_errors_map_to_codes() {
        assert_eq!(merge_exit_code(&MergeError::EmptyWorkbook), EXIT_EMPTY_WORKBOOKS);
        assert_eq!(merge_exit_code(&MergeError::ConfigParse("x".into())), EXIT_CONFIG);
        assert_eq!(
            merge_exit_code(&MergeError::SchemaConflict {
                sheet: "S".into(),
                primary_only: vec![],
                secondary_only: vec![],
            }),
            EXIT_SCHEMA_CONFLICT
        );
    }
}
