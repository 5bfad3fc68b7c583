//! Configuration surface for the split transform.
//!
//! [`SplitConfig`] describes one split: which field to split, on what delimiter, into which typed
//! output columns, and what to do when a value splits into the wrong number of parts.
//! [`JobConfig`] wraps it with the input column layout for file-to-file runs.
//!
//! Both deserialize from JSON:
//!
//! ```rust
//! use split_column::config::SplitConfig;
//!
//! let config: SplitConfig = serde_json::from_str(r#"{
//!     "target_key": "payload",
//!     "delimiter": "|",
//!     "is_skip": false,
//!     "output_columns": [
//!         {"name": "id", "type": "long"},
//!         {"name": "seen_at", "type": "timestamp", "format": "%Y-%m-%d"}
//!     ]
//! }"#).unwrap();
//!
//! assert_eq!(config.delimiter, "|");
//! assert!(!config.skip_on_mismatch);
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SplitError, SplitResult};
use crate::timestamp::{DEFAULT_TIMESTAMP_FORMAT, DEFAULT_TIMEZONE};
use crate::types::{DataType, Field, Schema};

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_skip_on_mismatch() -> bool {
    true
}

fn default_timestamp_format() -> String {
    DEFAULT_TIMESTAMP_FORMAT.to_string()
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_batch_size() -> usize {
    4_096
}

/// One output column produced from a split part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputColumnConfig {
    /// Output field name.
    pub name: String,
    /// Declared type name (`string`, `boolean`, `double`, `long`, `timestamp`).
    ///
    /// Kept as text so that an unknown type surfaces as a config error at planning time.
    #[serde(rename = "type")]
    pub type_name: String,
    /// strftime format for `timestamp` columns. Falls back to
    /// [`SplitConfig::default_timestamp_format`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Timezone for `timestamp` columns whose format has no offset. Falls back to
    /// [`SplitConfig::default_timezone`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl OutputColumnConfig {
    /// A column with a textual type name.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            format: None,
            timezone: None,
        }
    }

    /// A column of a known [`DataType`].
    pub fn typed(name: impl Into<String>, data_type: DataType) -> Self {
        Self::new(name, data_type.name())
    }

    /// A `timestamp` column with an explicit format.
    pub fn timestamp(name: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            format: Some(format.into()),
            ..Self::typed(name, DataType::Timestamp)
        }
    }

    /// Set the timezone used when the format has no offset.
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }
}

/// Configuration for splitting one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SplitConfig {
    /// Name of the input field holding the delimited text.
    pub target_key: String,
    /// Plain substring delimiter.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    /// When `true`, records whose part count does not match `output_columns` are skipped with a
    /// warning; when `false`, they abort the stream.
    #[serde(default = "default_skip_on_mismatch", alias = "is_skip")]
    pub skip_on_mismatch: bool,
    /// Output columns, in the order the split parts are assigned to them.
    pub output_columns: Vec<OutputColumnConfig>,
    /// Format for timestamp columns that do not set their own.
    #[serde(default = "default_timestamp_format")]
    pub default_timestamp_format: String,
    /// Timezone for timestamp columns that do not set their own.
    #[serde(default = "default_timezone")]
    pub default_timezone: String,
}

impl SplitConfig {
    /// Create a config with the default delimiter (`,`) and skip-on-mismatch policy.
    pub fn new(target_key: impl Into<String>, output_columns: Vec<OutputColumnConfig>) -> Self {
        Self {
            target_key: target_key.into(),
            delimiter: default_delimiter(),
            skip_on_mismatch: default_skip_on_mismatch(),
            output_columns,
            default_timestamp_format: default_timestamp_format(),
            default_timezone: default_timezone(),
        }
    }

    /// Set the delimiter.
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Set the mismatch policy.
    pub fn with_skip_on_mismatch(mut self, skip: bool) -> Self {
        self.skip_on_mismatch = skip;
        self
    }

    /// Set the fallback timestamp format.
    pub fn with_default_timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.default_timestamp_format = format.into();
        self
    }

    /// Set the fallback timezone.
    pub fn with_default_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.default_timezone = timezone.into();
        self
    }
}

/// An input column declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputColumnConfig {
    /// Column name (must match the CSV header).
    pub name: String,
    /// Declared type name.
    #[serde(rename = "type")]
    pub type_name: String,
}

/// A complete file-to-file job: input layout plus split settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    /// Input column layout, in record order.
    pub input_columns: Vec<InputColumnConfig>,
    /// Split settings.
    pub split: SplitConfig,
    /// Records handed to the stream per `add` call.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl JobConfig {
    /// Load a job from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> SplitResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parse a job from JSON text.
    pub fn from_json_str(text: &str) -> SplitResult<Self> {
        let job: Self = serde_json::from_str(text)?;
        if job.batch_size == 0 {
            return Err(SplitError::config("batch_size must be > 0"));
        }
        Ok(job)
    }

    /// Build the input [`Schema`] from `input_columns`.
    pub fn input_schema(&self) -> SplitResult<Schema> {
        let fields = self
            .input_columns
            .iter()
            .map(|c| {
                let data_type = c.type_name.parse::<DataType>().map_err(|e| {
                    SplitError::config(format!("input column '{}': {e}", c.name))
                })?;
                Ok(Field::new(c.name.clone(), data_type))
            })
            .collect::<SplitResult<Vec<_>>>()?;
        let schema = Schema::new(fields);
        if let Some(name) = schema.duplicate_name() {
            return Err(SplitError::config(format!(
                "input column '{name}' is declared more than once"
            )));
        }
        Ok(schema)
    }
}
