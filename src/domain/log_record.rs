use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One upstream log record: an arbitrarily nested JSON tree.
///
/// Records have no fixed schema; the shape depends on the log type that
/// produced them. A record is immutable once it has been enqueued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogRecord(Value);

/// Result of walking a key path through a [`LogRecord`].
///
/// `Absent` means some key along the path did not exist, which is distinct
/// from a path that exists and holds `null` or an empty string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    Present(&'a Value),
    Absent,
}

impl<'a> Lookup<'a> {
    pub fn value(self) -> Option<&'a Value> {
        match self {
            Lookup::Present(value) => Some(value),
            Lookup::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Lookup::Absent)
    }

    pub fn as_str(self) -> Option<&'a str> {
        self.value().and_then(Value::as_str)
    }
}

impl LogRecord {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn from_json(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line).map(Self)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Walk `path` one key at a time. Objects are indexed by key, arrays by
    /// a decimal position; any other node ends the walk as `Absent`.
    pub fn lookup<S: AsRef<str>>(&self, path: &[S]) -> Lookup<'_> {
        let mut current = &self.0;
        for key in path {
            let key = key.as_ref();
            let next = match current {
                Value::Object(map) => map.get(key),
                Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            };
            match next {
                Some(value) => current = value,
                None => return Lookup::Absent,
            }
        }
        Lookup::Present(current)
    }

    /// Top-level string field, `None` when missing or not a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.lookup(&[key]).as_str()
    }
}

impl From<Value> for LogRecord {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
