//! Configuration for the syncer and the stores it writes to.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A field holds a value outside its allowed range
    #[error("Invalid value for '{field}': {constraint}")]
    InvalidFieldValue { field: String, constraint: String },

    /// The configuration file could not be read
    #[error("Failed to read configuration from '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration text is not valid JSON for this structure
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Grid size given to worksheets created on first reference.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SheetCapacity {
    #[serde(default = "default_rows")]
    pub rows: usize,
    #[serde(default = "default_columns")]
    pub columns: usize,
}

impl SheetCapacity {
    pub const DEFAULT_ROWS: usize = 1000;
    pub const DEFAULT_COLUMNS: usize = 26;
}

impl Default for SheetCapacity {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            columns: default_columns(),
        }
    }
}

fn default_rows() -> usize {
    SheetCapacity::DEFAULT_ROWS
}

fn default_columns() -> usize {
    SheetCapacity::DEFAULT_COLUMNS
}

/// Options for merging a batch into a sheet.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MergeConfig {
    /// Columns whose combined values identify a logical record.
    /// When empty, whole rows are compared.
    #[serde(default)]
    pub key_columns: Vec<String>,
}

impl MergeConfig {
    pub fn with_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key_columns: keys.into_iter().map(Into::into).collect(),
        }
    }

    fn validate(&self, sheet: &str) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for key in &self.key_columns {
            if key.trim().is_empty() {
                return Err(ConfigError::InvalidFieldValue {
                    field: format!("merge.{sheet}.key_columns"),
                    constraint: "must not contain blank names".to_owned(),
                });
            }
            if !seen.insert(key) {
                return Err(ConfigError::InvalidFieldValue {
                    field: format!("merge.{sheet}.key_columns"),
                    constraint: format!("lists '{key}' more than once"),
                });
            }
        }
        Ok(())
    }
}

/// Top-level configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SyncConfig {
    /// Spreadsheet URL or bare spreadsheet key
    pub spreadsheet_url: String,
    /// Size of worksheets created on first reference
    #[serde(default)]
    pub capacity: SheetCapacity,
    /// Timeout applied to every remote request, in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Per-sheet merge options
    #[serde(default)]
    pub merge: BTreeMap<String, MergeConfig>,
}

impl SyncConfig {
    pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

    /// Parses configuration from JSON text and validates it.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: SyncConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads configuration from a JSON file and validates it.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Merge options for a sheet; sheets without an entry compare whole rows.
    pub fn merge_config(&self, sheet: &str) -> MergeConfig {
        self.merge.get(sheet).cloned().unwrap_or_default()
    }

    /// Validates configuration settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spreadsheet_url.trim().is_empty() {
            return Err(ConfigError::InvalidFieldValue {
                field: "spreadsheet_url".to_owned(),
                constraint: "must not be empty".to_owned(),
            });
        }
        if self.capacity.rows == 0 {
            return Err(ConfigError::InvalidFieldValue {
                field: "capacity.rows".to_owned(),
                constraint: "must be greater than 0".to_owned(),
            });
        }
        if self.capacity.columns == 0 {
            return Err(ConfigError::InvalidFieldValue {
                field: "capacity.columns".to_owned(),
                constraint: "must be greater than 0".to_owned(),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidFieldValue {
                field: "request_timeout_ms".to_owned(),
                constraint: "must be greater than 0".to_owned(),
            });
        }
        for (sheet, merge) in &self.merge {
            merge.validate(sheet)?;
        }
        Ok(())
    }
}

fn default_request_timeout_ms() -> u64 {
    SyncConfig::DEFAULT_REQUEST_TIMEOUT_MS
}
