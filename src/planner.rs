//! Schema planning: compute the output layout once per pipeline.
//!
//! [`plan`] walks the input schema left to right. The target field is replaced in place by the
//! configured output columns; every other field passes through in its original relative order.
//! For input `[a, b, target, c]` and outputs `[x, y]` the output layout is `[a, b, x, y, c]`.
//!
//! The resulting [`SplitPlan`] is immutable and can be shared by reference (or behind an
//! `Arc`) across any number of concurrent streams.

use tracing::debug;

use crate::config::SplitConfig;
use crate::error::{SplitError, SplitResult};
use crate::timestamp::TimestampParser;
use crate::types::{DataType, Field, Schema};

/// Provenance of one output position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSlot {
    /// Copy the input value at `input_index` unchanged.
    PassThrough { input_index: usize },
    /// Coerce split part `part_index` into its declared type.
    SplitPart { part_index: usize },
}

/// A compiled output column fed by one split part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartSpec {
    /// Output field name.
    pub name: String,
    /// Declared output type.
    pub data_type: DataType,
    /// Parser for `timestamp` columns; `None` for every other type.
    pub timestamp: Option<TimestampParser>,
}

/// Immutable result of planning: output schema plus per-position provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPlan {
    input_schema: Schema,
    output_schema: Schema,
    slots: Vec<OutputSlot>,
    parts: Vec<PartSpec>,
    target_index: usize,
    delimiter: String,
    skip_on_mismatch: bool,
}

impl SplitPlan {
    /// Layout of incoming records.
    pub fn input_schema(&self) -> &Schema {
        &self.input_schema
    }

    /// Layout of emitted records.
    pub fn output_schema(&self) -> &Schema {
        &self.output_schema
    }

    /// One slot per output position, in output order.
    pub fn slots(&self) -> &[OutputSlot] {
        &self.slots
    }

    /// Compiled output columns, in split-part order.
    pub fn parts(&self) -> &[PartSpec] {
        &self.parts
    }

    /// Position of the target field in the input schema.
    pub fn target_index(&self) -> usize {
        self.target_index
    }

    /// Name of the target field.
    pub fn target_name(&self) -> &str {
        &self.input_schema.fields[self.target_index].name
    }

    /// Plain substring delimiter.
    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Whether a part-count mismatch skips the record (`true`) or aborts the stream.
    pub fn skip_on_mismatch(&self) -> bool {
        self.skip_on_mismatch
    }
}

/// Compile `config` against `input_schema`.
///
/// # Errors
///
/// Returns [`SplitError::Config`] when:
///
/// - the delimiter is empty or no output columns are configured
/// - the target field is missing from the input schema, or is not a `string` field
/// - an output column declares an unknown type
/// - a timestamp column has an empty/malformed format or an unknown timezone
/// - an output name collides with another output or a pass-through field
pub fn plan(input_schema: &Schema, config: &SplitConfig) -> SplitResult<SplitPlan> {
    if config.delimiter.is_empty() {
        return Err(SplitError::config("delimiter must not be empty"));
    }
    if config.output_columns.is_empty() {
        return Err(SplitError::config("output_columns must not be empty"));
    }

    let target_index = input_schema.index_of(&config.target_key).ok_or_else(|| {
        SplitError::config(format!(
            "target field '{}' not found in input schema. fields={:?}",
            config.target_key,
            input_schema.field_names().collect::<Vec<_>>()
        ))
    })?;
    let target_type = input_schema.fields[target_index].data_type;
    if target_type != DataType::Utf8 {
        return Err(SplitError::config(format!(
            "target field '{}' must be a string field, found {target_type}",
            config.target_key
        )));
    }

    let parts = config
        .output_columns
        .iter()
        .map(|col| {
            let data_type = col.type_name.parse::<DataType>().map_err(|e| {
                SplitError::config(format!("output column '{}': {e}", col.name))
            })?;
            let timestamp = match data_type {
                DataType::Timestamp => {
                    let format = col
                        .format
                        .as_deref()
                        .unwrap_or(&config.default_timestamp_format);
                    let timezone = col.timezone.as_deref().unwrap_or(&config.default_timezone);
                    let parser = TimestampParser::new(format, timezone)
                        .map_err(|e| e.in_context(format_args!("output column '{}'", col.name)))?;
                    Some(parser)
                }
                _ => None,
            };
            Ok(PartSpec {
                name: col.name.clone(),
                data_type,
                timestamp,
            })
        })
        .collect::<SplitResult<Vec<_>>>()?;

    let mut fields = Vec::with_capacity(input_schema.len() + parts.len() - 1);
    let mut slots = Vec::with_capacity(fields.capacity());
    for (input_index, field) in input_schema.fields.iter().enumerate() {
        if input_index == target_index {
            for (part_index, part) in parts.iter().enumerate() {
                fields.push(Field::new(part.name.clone(), part.data_type));
                slots.push(OutputSlot::SplitPart { part_index });
            }
            continue;
        }
        fields.push(field.clone());
        slots.push(OutputSlot::PassThrough { input_index });
    }

    let output_schema = Schema::new(fields);
    if let Some(name) = output_schema.duplicate_name() {
        return Err(SplitError::config(format!(
            "output field '{name}' appears more than once in the output schema"
        )));
    }

    debug!(
        target_key = %config.target_key,
        target_index,
        input_fields = input_schema.len(),
        output_fields = output_schema.len(),
        "planned split"
    );

    Ok(SplitPlan {
        input_schema: input_schema.clone(),
        output_schema,
        slots,
        parts,
        target_index,
        delimiter: config.delimiter.clone(),
        skip_on_mismatch: config.skip_on_mismatch,
    })
}
