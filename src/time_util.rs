/*!
 * Time model.
 *
 * All times in a draft are integer microseconds. Human input such as `"3s"`
 * or `"1h2m0.5s"` is converted through [`parse_time`]; subtitle timestamps
 * (`HH:MM:SS,mmm`) through [`parse_subtitle_timestamp`].
 */

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::errors::DraftError;

/// One second in micro-units
pub const SEC: i64 = 1_000_000;

// @const: compound duration, e.g. "1h", "2m30s", "1.5s"
static DURATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(\d+(?:\.\d+)?)h)?(?:(\d+(?:\.\d+)?)m)?(?:(\d+(?:\.\d+)?)s)?$").unwrap()
});

// @const: SRT timestamp, HH:MM:SS,mmm
static SUBTITLE_TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{2}):(\d{2}),(\d{3})$").unwrap()
});

/// A time value as accepted by the public API: either raw micro-units or a
/// string with unit suffixes.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeValue {
    Micros(i64),
    Text(String),
}

impl From<i64> for TimeValue {
    fn from(value: i64) -> Self {
        Self::Micros(value)
    }
}

impl From<&str> for TimeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for TimeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Convert a time value into micro-units.
///
/// Strings accept an optional leading `-` followed by any combination of
/// `h`, `m` and `s` components in that order. Fractional components are
/// rounded to the nearest micro-unit.
pub fn parse_time<T: Into<TimeValue>>(value: T) -> Result<i64, DraftError> {
    let text = match value.into() {
        TimeValue::Micros(micros) => return Ok(micros),
        TimeValue::Text(text) => text,
    };

    let normalized = text.trim().to_lowercase();
    let (sign, body) = match normalized.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, normalized.as_str()),
    };

    if body.is_empty() {
        return Err(DraftError::InvalidTimeFormat(text));
    }

    let caps = DURATION_REGEX
        .captures(body)
        .ok_or_else(|| DraftError::InvalidTimeFormat(text.clone()))?;

    let factors = [3600.0 * SEC as f64, 60.0 * SEC as f64, SEC as f64];
    let mut total = 0.0_f64;
    for (group, factor) in (1..=3).zip(factors) {
        if let Some(m) = caps.get(group) {
            let amount: f64 = m
                .as_str()
                .parse()
                .map_err(|_| DraftError::InvalidTimeFormat(text.clone()))?;
            total += amount * factor;
        }
    }

    Ok(sign * total.round() as i64)
}

/// Parse an SRT `HH:MM:SS,mmm` timestamp into micro-units
pub fn parse_subtitle_timestamp(text: &str) -> Result<i64, DraftError> {
    let trimmed = text.trim();
    let caps = SUBTITLE_TIMESTAMP_REGEX
        .captures(trimmed)
        .ok_or_else(|| DraftError::InvalidTimestamp(trimmed.to_string()))?;

    let field = |i: usize| -> Result<i64, DraftError> {
        caps[i]
            .parse::<i64>()
            .map_err(|_| DraftError::InvalidTimestamp(trimmed.to_string()))
    };
    let (hours, minutes, seconds, millis) = (field(1)?, field(2)?, field(3)?, field(4)?);

    if minutes >= 60 || seconds >= 60 {
        return Err(DraftError::InvalidTimestamp(trimmed.to_string()));
    }

    Ok(((hours * 60 + minutes) * 60 + seconds) * SEC + millis * 1000)
}

/// Format micro-units as an SRT timestamp, truncating below milliseconds
pub fn format_subtitle_timestamp(micros: i64) -> String {
    let millis_total = micros.max(0) / 1000;
    let millis = millis_total % 1000;
    let seconds_total = millis_total / 1000;
    format!(
        "{:02}:{:02}:{:02},{:03}",
        seconds_total / 3600,
        (seconds_total % 3600) / 60,
        seconds_total % 60,
        millis
    )
}

/// A span on a timeline, in micro-units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    /// Start time
    pub start: i64,
    /// Length, never negative
    pub duration: i64,
}

impl TimeRange {
    /// Create a range, rejecting negative durations
    pub fn new(start: i64, duration: i64) -> Result<Self, DraftError> {
        if duration < 0 {
            return Err(DraftError::InvalidRange(format!(
                "duration must not be negative (start={}, duration={})",
                start, duration
            )));
        }
        Ok(Self { start, duration })
    }

    /// End time (exclusive)
    pub fn end(&self) -> i64 {
        self.start + self.duration
    }

    /// Whether two ranges share any instant. Touching ranges do not overlap.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        !(self.end() <= other.start || other.end() <= self.start)
    }

    pub fn export_json(&self) -> Value {
        json!({ "start": self.start, "duration": self.duration })
    }

    /// Read a range from its exported form
    pub fn import_json(value: &Value) -> Result<Self, DraftError> {
        let read = |key: &str| -> Result<i64, DraftError> {
            value
                .get(key)
                .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
                .ok_or_else(|| DraftError::InvalidTemplate(format!("time range lacks '{}'", key)))
        };
        Ok(Self {
            start: read("start")?,
            duration: read("duration")?,
        })
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end())
    }
}

/// Build a [`TimeRange`] from two time values
pub fn timerange<S: Into<TimeValue>, D: Into<TimeValue>>(start: S, duration: D) -> Result<TimeRange, DraftError> {
    TimeRange::new(parse_time(start)?, parse_time(duration)?)
}

/// Shorthand for [`timerange`]
pub fn trange<S: Into<TimeValue>, D: Into<TimeValue>>(start: S, duration: D) -> Result<TimeRange, DraftError> {
    timerange(start, duration)
}
