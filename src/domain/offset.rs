use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Inclusive resume point for one log stream, in epoch milliseconds.
///
/// Fetching resumes at the first record whose event time is `>=` the offset,
/// so a record sitting exactly on the offset may be delivered twice but never
/// skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Offset(i64);

impl Offset {
    pub const START: Offset = Offset(0);

    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub fn millis(&self) -> i64 {
        self.0
    }

    /// The offset immediately after this one.
    pub fn successor(&self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Interpret an event time field as epoch milliseconds.
///
/// Integers (or all-digit strings) up to 11 digits are treated as seconds,
/// longer ones as milliseconds; other strings are parsed as RFC 3339.
pub fn event_time_millis(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().map(scale_epoch),
        Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            s.parse::<i64>().ok().map(scale_epoch)
        }
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.timestamp_millis()),
        _ => None,
    }
}

fn scale_epoch(raw: i64) -> i64 {
    if raw.abs() < 100_000_000_000 {
        raw.saturating_mul(1000)
    } else {
        raw
    }
}
