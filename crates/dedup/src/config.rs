use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::MergeError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Settings for one workbook merge. Every field has a default, so an empty
/// TOML document is a valid config.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MergeConfig {
    /// Merge only this sheet. Other primary sheets pass through; other
    /// secondary sheets are ignored.
    #[serde(default)]
    pub target_sheet: Option<String>,
    /// Secondary column name -> primary column name, applied before alignment.
    #[serde(default)]
    pub column_map: BTreeMap<String, String>,
    #[serde(default)]
    pub secondary_only_sheets: SecondaryOnlySheets,
    #[serde(default)]
    pub align: AlignMode,
    /// Merge sheets on scoped worker threads.
    #[serde(default)]
    pub parallel: bool,
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// What to do with a sheet that exists only in the secondary workbook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SecondaryOnlySheets {
    /// Add it wholesale to the output.
    #[default]
    Include,
    /// Leave it out and list it in the report.
    Ignore,
}

/// How differing column sets are reconciled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignMode {
    /// Union of both schemas; missing cells become Null.
    #[default]
    Union,
    /// Column sets must match exactly (order may differ).
    Strict,
}

impl std::fmt::Display for AlignMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Union => write!(f, "union"),
            Self::Strict => write!(f, "strict"),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl MergeConfig {
    pub fn from_toml(input: &str) -> Result<Self, MergeError> {
        let config: MergeConfig =
            toml::from_str(input).map_err(|e| MergeError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MergeError> {
        if let Some(target) = &self.target_sheet {
            if target.is_empty() {
                return Err(MergeError::ConfigValidation(
                    "target_sheet must not be empty".into(),
                ));
            }
        }

        let mut targets = BTreeSet::new();
        for (from, to) in &self.column_map {
            if from.is_empty() || to.is_empty() {
                return Err(MergeError::ConfigValidation(format!(
                    "column_map entry '{from}' -> '{to}': column names must not be empty"
                )));
            }
            if !targets.insert(to.as_str()) {
                return Err(MergeError::ConfigValidation(format!(
                    "column_map: more than one column maps to '{to}'"
                )));
            }
        }

        Ok(())
    }

    /// Target name for a secondary column, if it is remapped.
    pub fn mapped_column(&self, secondary: &str) -> Option<&str> {
        self.column_map
            .get(secondary)
            .map(|s| s.as_str())
            .filter(|to| *to != secondary)
    }

    /// True when `sheet` takes part in the merge.
    pub fn selects(&self, sheet: &str) -> bool {
        self.target_sheet.as_deref().map_or(true, |t| t == sheet)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
