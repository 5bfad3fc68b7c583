//! Per-record split transform.
//!
//! - [`split_parts()`]: plain substring split of the target value
//! - [`coerce_part()`] / [`copy_pass_through()`]: type dispatch for split parts and pass-through
//!   fields
//! - [`SplitStream`]: the streaming transformer (open → finish → close)
//! - [`split_dataset()`]: one-shot transform of an in-memory [`crate::types::DataSet`]
//!
//! ## Example
//!
//! ```rust
//! use split_column::config::{OutputColumnConfig, SplitConfig};
//! use split_column::planner::plan;
//! use split_column::processing::split_dataset;
//! use split_column::types::{DataSet, DataType, Field, Schema, Value};
//!
//! let schema = Schema::new(vec![
//!     Field::new("id", DataType::Int64),
//!     Field::new("csv", DataType::Utf8),
//!     Field::new("note", DataType::Utf8),
//! ]);
//! let ds = DataSet::new(
//!     schema.clone(),
//!     vec![
//!         vec![Value::Int64(1), Value::Utf8("1,true,2.5".to_string()), Value::Null],
//!         vec![Value::Int64(2), Value::Utf8("only-one".to_string()), Value::Null],
//!     ],
//! );
//!
//! let config = SplitConfig::new(
//!     "csv",
//!     vec![
//!         OutputColumnConfig::typed("n", DataType::Int64),
//!         OutputColumnConfig::typed("flag", DataType::Bool),
//!         OutputColumnConfig::typed("score", DataType::Float64),
//!     ],
//! );
//! let plan = plan(&schema, &config).unwrap();
//!
//! // Row 2 splits into one part instead of three and is skipped (default policy).
//! let out = split_dataset(&ds, &plan).unwrap();
//! assert_eq!(
//!     out.rows,
//!     vec![vec![
//!         Value::Int64(1),
//!         Value::Int64(1),
//!         Value::Bool(true),
//!         Value::Float64(2.5),
//!         Value::Null,
//!     ]]
//! );
//! ```

pub mod coerce;
pub mod dataset;
pub mod split;
pub mod stream;

pub use coerce::{coerce_part, copy_pass_through, parse_bool_lenient};
pub use dataset::{split_dataset, split_dataset_with_observer};
pub use split::split_parts;
pub use stream::{SplitStream, StreamState};
