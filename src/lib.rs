//! `split-column` splits one delimited text field of every record into several typed fields,
//! passing every other field through unchanged.
//!
//! Work happens in two stages:
//!
//! 1. **Planning** ([`planner::plan`]) runs once per pipeline. It checks a
//!    [`config::SplitConfig`] against the input [`types::Schema`] and produces an immutable
//!    [`planner::SplitPlan`]: the output schema plus, for every output position, whether it is
//!    copied from an input field or derived from a split part.
//! 2. **Streaming** ([`processing::SplitStream`]) runs once per record. It splits the target
//!    value on the delimiter, applies the mismatch policy, coerces each part into its declared
//!    type and writes the assembled record to a [`output::RecordSink`].
//!
//! ## Declared types
//!
//! | config name | [`types::DataType`] | split-part coercion                                 |
//! |-------------|---------------------|-----------------------------------------------------|
//! | `string`    | `Utf8`              | verbatim                                            |
//! | `boolean`   | `Bool`              | `"true"` (any case) is `true`, anything else `false` |
//! | `double`    | `Float64`           | base-10 float, error if unparsable                  |
//! | `long`      | `Int64`             | base-10 signed integer, error if unparsable         |
//! | `timestamp` | `Timestamp`         | column format + timezone, error if unparsable       |
//!
//! ## Mismatch policy
//!
//! When a value splits into a different number of parts than there are output columns:
//!
//! - `skip_on_mismatch = true` (default): the record is dropped and a
//!   [`observability::SkipEvent`] goes to the stream's observer (a `tracing` warning by
//!   default).
//! - `skip_on_mismatch = false`: the stream fails with [`SplitError::SplitValidation`].
//!
//! A null target value counts as zero parts. Type coercion failures are always fatal
//! ([`SplitError::TypeCoercion`]), whatever the mismatch policy.
//!
//! ## Example
//!
//! ```rust
//! use split_column::config::{OutputColumnConfig, SplitConfig};
//! use split_column::planner::plan;
//! use split_column::processing::split_dataset;
//! use split_column::types::{DataSet, DataType, Field, Schema, Value};
//!
//! # fn main() -> Result<(), split_column::SplitError> {
//! let schema = Schema::new(vec![
//!     Field::new("a", DataType::Int64),
//!     Field::new("target", DataType::Utf8),
//!     Field::new("c", DataType::Bool),
//! ]);
//! let config = SplitConfig::new(
//!     "target",
//!     vec![
//!         OutputColumnConfig::typed("x", DataType::Utf8),
//!         OutputColumnConfig::typed("y", DataType::Utf8),
//!     ],
//! );
//! let plan = plan(&schema, &config)?;
//! assert_eq!(
//!     plan.output_schema().field_names().collect::<Vec<_>>(),
//!     vec!["a", "x", "y", "c"]
//! );
//!
//! let ds = DataSet::new(
//!     schema,
//!     vec![vec![Value::Int64(1), Value::Utf8("p,q".to_string()), Value::Null]],
//! );
//! let out = split_dataset(&ds, &plan)?;
//! assert_eq!(
//!     out.rows[0],
//!     vec![
//!         Value::Int64(1),
//!         Value::Utf8("p".to_string()),
//!         Value::Utf8("q".to_string()),
//!         Value::Null,
//!     ]
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`types`]: schema, values and the in-memory dataset
//! - [`config`]: split and job configuration (serde/JSON)
//! - [`planner`]: schema planning
//! - [`processing`]: splitting, coercion and the streaming transformer
//! - [`output`]: record sinks (in-memory, CSV)
//! - [`ingestion`]: CSV record source
//! - [`observability`]: skip/finish/failure diagnostics
//! - [`job`]: CSV-to-CSV runs used by the `split-column` binary
//! - [`logging`]: `tracing-subscriber` setup for the binary
//! - [`error`]: the crate error type

pub mod config;
pub mod error;
pub mod ingestion;
pub mod job;
pub mod logging;
pub mod observability;
pub mod output;
pub mod planner;
pub mod processing;
pub mod timestamp;
pub mod types;

pub use error::{SplitError, SplitResult};
