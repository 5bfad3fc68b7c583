//! Timestamp parsing for `timestamp`-typed columns.
//!
//! Formats use `chrono` strftime syntax. When a format carries no UTC offset (`%z`, `%:z`, ...),
//! parsed values are interpreted in the parser's configured timezone. Date-only formats resolve
//! to midnight in that timezone.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};

use crate::error::{SplitError, SplitResult};

/// Default format for timestamp columns without an explicit `format`.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f %z";

/// Default timezone for formats without a UTC offset.
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// A validated timestamp format bound to a timezone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampParser {
    format: String,
    offset: FixedOffset,
}

impl TimestampParser {
    /// Build a parser, rejecting empty or malformed formats and unknown timezones.
    pub fn new(format: &str, timezone: &str) -> SplitResult<Self> {
        if format.trim().is_empty() {
            return Err(SplitError::config("timestamp format must not be empty"));
        }
        if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
            return Err(SplitError::config(format!(
                "invalid timestamp format '{format}'"
            )));
        }
        let offset = parse_timezone(timezone).ok_or_else(|| {
            SplitError::config(format!(
                "invalid timezone '{timezone}' (expected UTC or an offset like +09:00)"
            ))
        })?;
        Ok(Self {
            format: format.to_owned(),
            offset,
        })
    }

    /// The strftime format this parser applies.
    pub fn format(&self) -> &str {
        &self.format
    }

    /// Parse `raw` into a UTC instant.
    pub fn parse(&self, raw: &str) -> Result<DateTime<Utc>, String> {
        let zoned_err = match DateTime::parse_from_str(raw, &self.format) {
            Ok(dt) => return Ok(dt.with_timezone(&Utc)),
            Err(e) => e,
        };
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, &self.format) {
            return self.localize(naive);
        }
        if let Ok(date) = NaiveDate::parse_from_str(raw, &self.format) {
            return self.localize(date.and_time(NaiveTime::MIN));
        }
        Err(format!("{zoned_err} (format '{}')", self.format))
    }

    /// Shift a local time to UTC. Fails when the shift leaves chrono's supported range.
    fn localize(&self, naive: NaiveDateTime) -> Result<DateTime<Utc>, String> {
        naive
            .checked_sub_offset(self.offset)
            .map(|utc| Utc.from_utc_datetime(&utc))
            .ok_or_else(|| {
                format!(
                    "timestamp out of range after applying timezone {}",
                    self.offset
                )
            })
    }
}

impl Default for TimestampParser {
    fn default() -> Self {
        Self {
            format: DEFAULT_TIMESTAMP_FORMAT.to_owned(),
            offset: Utc.fix(),
        }
    }
}

/// Parse `UTC`/`Z`/`GMT` or a fixed offset such as `+09:00`, `-0530` or `+09`.
pub fn parse_timezone(tz: &str) -> Option<FixedOffset> {
    let tz = tz.trim();
    if ["utc", "z", "gmt"].iter().any(|n| tz.eq_ignore_ascii_case(n)) {
        return FixedOffset::east_opt(0);
    }
    let (sign, rest) = match tz.as_bytes().first()? {
        b'+' => (1, &tz[1..]),
        b'-' => (-1, &tz[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes): (i32, i32) = match digits.len() {
        2 => (digits.parse().ok()?, 0),
        4 => (digits[..2].parse().ok()?, digits[2..].parse().ok()?),
        _ => return None,
    };
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
