//! Type dispatch for split parts and pass-through values.
//!
//! Both directions go through a single `match` on [`DataType`]: [`coerce_part`] turns a split
//! part into a typed [`Value`], and [`copy_pass_through`] checks and copies an input value into
//! the output record unchanged.

use crate::planner::PartSpec;
use crate::types::{DataType, Value};

/// Coerce one split part into the declared type of `spec`.
///
/// | type        | rule                                                              |
/// |-------------|-------------------------------------------------------------------|
/// | `string`    | verbatim                                                          |
/// | `boolean`   | `true` iff the part equals `"true"` ignoring case; else `false`   |
/// | `double`    | surrounding whitespace trimmed, then parsed as a base-10 float    |
/// | `long`      | parsed as a base-10 signed integer, no trimming                   |
/// | `timestamp` | parsed with the column's format and timezone                      |
///
/// `double` accepts `inf`, `infinity` and `nan` in any case, optionally signed. Type suffixes
/// (`1.5d`, `1.5f`) and hexadecimal floats are rejected.
///
/// Returns the parser's message on failure; the caller attaches row and column context.
pub fn coerce_part(spec: &PartSpec, raw: &str) -> Result<Value, String> {
    match spec.data_type {
        DataType::Utf8 => Ok(Value::Utf8(raw.to_owned())),
        DataType::Bool => Ok(Value::Bool(parse_bool_lenient(raw))),
        DataType::Float64 => raw
            .trim()
            .parse::<f64>()
            .map(Value::Float64)
            .map_err(|e| e.to_string()),
        DataType::Int64 => raw.parse::<i64>().map(Value::Int64).map_err(|e| e.to_string()),
        DataType::Timestamp => match &spec.timestamp {
            Some(parser) => parser.parse(raw).map(Value::Timestamp),
            None => Err("timestamp column has no parser".to_string()),
        },
    }
}

/// Lenient boolean: only `"true"` (any case) is `true`. Everything else, including `"yes"`,
/// `"1"` and `""`, is `false`.
pub fn parse_bool_lenient(raw: &str) -> bool {
    raw.eq_ignore_ascii_case("true")
}

/// Copy an input value for a field declared as `data_type`.
///
/// `Null` is copied for every type. A non-null value whose variant does not match the declared
/// type yields `Err` with the value's kind.
pub fn copy_pass_through(data_type: DataType, value: &Value) -> Result<Value, &'static str> {
    match (data_type, value) {
        (_, Value::Null) => Ok(Value::Null),
        (DataType::Utf8, Value::Utf8(s)) => Ok(Value::Utf8(s.clone())),
        (DataType::Bool, Value::Bool(b)) => Ok(Value::Bool(*b)),
        (DataType::Float64, Value::Float64(f)) => Ok(Value::Float64(*f)),
        (DataType::Int64, Value::Int64(i)) => Ok(Value::Int64(*i)),
        (DataType::Timestamp, Value::Timestamp(ts)) => Ok(Value::Timestamp(*ts)),
        (_, other) => Err(other.kind()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{coerce_part, copy_pass_through, parse_bool_lenient};
    use crate::planner::PartSpec;
    use crate::timestamp::TimestampParser;
    use crate::types::{DataType, Value};

    fn spec(data_type: DataType) -> PartSpec {
        PartSpec {
            name: "p".to_string(),
            data_type,
            timestamp: None,
        }
    }

    #[test]
    fn text_is_verbatim() {
        assert_eq!(
            coerce_part(&spec(DataType::Utf8), " a b ").unwrap(),
            Value::Utf8(" a b ".to_string())
        );
        assert_eq!(coerce_part(&spec(DataType::Utf8), "").unwrap(), Value::Utf8(String::new()));
    }

    #[test]
    fn boolean_is_lenient() {
        assert!(parse_bool_lenient("true"));
        assert!(parse_bool_lenient("TRUE"));
        assert!(parse_bool_lenient("True"));
        assert!(!parse_bool_lenient("false"));
        // Anything that is not "true" is false rather than an error.
        assert!(!parse_bool_lenient("yes"));
        assert!(!parse_bool_lenient("1"));
        assert!(!parse_bool_lenient(" true"));
        assert!(!parse_bool_lenient(""));
        assert_eq!(coerce_part(&spec(DataType::Bool), "yes").unwrap(), Value::Bool(false));
    }

    #[test]
    fn double_trims_and_parses() {
        assert_eq!(coerce_part(&spec(DataType::Float64), "2.5").unwrap(), Value::Float64(2.5));
        assert_eq!(coerce_part(&spec(DataType::Float64), " -1e3 ").unwrap(), Value::Float64(-1000.0));
        assert!(coerce_part(&spec(DataType::Float64), "2,5").is_err());
        assert!(coerce_part(&spec(DataType::Float64), "").is_err());
    }

    #[test]
    fn double_accepts_non_finite_words_and_rejects_suffixes() {
        let double = spec(DataType::Float64);
        for raw in ["NaN", "nan", " NAN "] {
            assert!(matches!(coerce_part(&double, raw).unwrap(), Value::Float64(f) if f.is_nan()));
        }
        assert_eq!(coerce_part(&double, "inf").unwrap(), Value::Float64(f64::INFINITY));
        assert_eq!(coerce_part(&double, "Infinity").unwrap(), Value::Float64(f64::INFINITY));
        assert_eq!(coerce_part(&double, "-INF").unwrap(), Value::Float64(f64::NEG_INFINITY));
        assert!(coerce_part(&double, "1.5d").is_err());
        assert!(coerce_part(&double, "1.5f").is_err());
        assert!(coerce_part(&double, "0x1p3").is_err());
    }

    #[test]
    fn long_is_strict() {
        assert_eq!(coerce_part(&spec(DataType::Int64), "-42").unwrap(), Value::Int64(-42));
        assert_eq!(coerce_part(&spec(DataType::Int64), "+7").unwrap(), Value::Int64(7));
        assert!(coerce_part(&spec(DataType::Int64), "1.0").is_err());
        assert!(coerce_part(&spec(DataType::Int64), " 1").is_err());
        assert!(coerce_part(&spec(DataType::Int64), "99999999999999999999").is_err());
    }

    #[test]
    fn timestamp_uses_column_parser() {
        let mut ts_spec = spec(DataType::Timestamp);
        ts_spec.timestamp = Some(TimestampParser::new("%Y-%m-%d %H:%M", "UTC").unwrap());
        assert_eq!(
            coerce_part(&ts_spec, "2024-05-06 07:08").unwrap(),
            Value::Timestamp(Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 0).unwrap())
        );
        assert!(coerce_part(&ts_spec, "06/05/2024").is_err());
    }

    #[test]
    fn pass_through_copies_matching_values_and_nulls() {
        let ts = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let cases = [
            (DataType::Utf8, Value::Utf8("x".to_string())),
            (DataType::Bool, Value::Bool(true)),
            (DataType::Float64, Value::Float64(1.5)),
            (DataType::Int64, Value::Int64(9)),
            (DataType::Timestamp, Value::Timestamp(ts)),
        ];
        for (dt, value) in cases {
            assert_eq!(copy_pass_through(dt, &value).unwrap(), value);
            assert_eq!(copy_pass_through(dt, &Value::Null).unwrap(), Value::Null);
        }
    }

    #[test]
    fn pass_through_rejects_mismatched_variant() {
        assert_eq!(
            copy_pass_through(DataType::Int64, &Value::Utf8("1".to_string())).unwrap_err(),
            "string"
        );
    }
}
