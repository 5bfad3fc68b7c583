//! Core data model types for the split transform.
//!
//! Records flow through the transform as rows of typed [`Value`]s laid out according to a
//! [`Schema`] (an ordered list of typed [`Field`]s).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

/// Logical data type for a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// UTF-8 string.
    Utf8,
    /// Boolean.
    Bool,
    /// 64-bit floating point number.
    Float64,
    /// 64-bit signed integer.
    Int64,
    /// Instant in time, normalized to UTC.
    Timestamp,
}

impl DataType {
    /// Canonical configuration name for this type.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Utf8 => "string",
            Self::Bool => "boolean",
            Self::Float64 => "double",
            Self::Int64 => "long",
            Self::Timestamp => "timestamp",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a type name is not one of the supported declared types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDataType(pub String);

impl fmt::Display for UnknownDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown type '{}' (expected string, boolean, double, long or timestamp)",
            self.0
        )
    }
}

impl std::error::Error for UnknownDataType {}

impl FromStr for DataType {
    type Err = UnknownDataType;

    /// Parse a type name (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" | "text" | "utf8" => Ok(Self::Utf8),
            "boolean" | "bool" => Ok(Self::Bool),
            "double" | "float" | "float64" => Ok(Self::Float64),
            "long" | "int" | "integer" | "int64" => Ok(Self::Int64),
            "timestamp" => Ok(Self::Timestamp),
            _ => Err(UnknownDataType(s.to_owned())),
        }
    }
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// An ordered list of fields. Order defines the physical record layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` when the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Returns the first field name that appears more than once, if any.
    pub fn duplicate_name(&self) -> Option<&str> {
        self.fields.iter().enumerate().find_map(|(i, f)| {
            self.fields[..i]
                .iter()
                .any(|prev| prev.name == f.name)
                .then_some(f.name.as_str())
        })
    }
}

/// A single typed value in a record.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicit null marker.
    Null,
    /// UTF-8 string.
    Utf8(String),
    /// Boolean.
    Bool(bool),
    /// 64-bit float.
    Float64(f64),
    /// 64-bit signed integer.
    Int64(i64),
    /// UTC timestamp.
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Utf8(_) => "string",
            Self::Bool(_) => "boolean",
            Self::Float64(_) => "double",
            Self::Int64(_) => "long",
            Self::Timestamp(_) => "timestamp",
        }
    }
}

/// In-memory batch of records.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Create an empty dataset for `schema`.
    pub fn empty(schema: Schema) -> Self {
        Self::new(schema, Vec::new())
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Values of one column by name, in row order.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.schema.index_of(name)?;
        Some(self.rows.iter().filter_map(|row| row.get(idx)).collect())
    }
}
