use super::mapping::MappingTable;
use crate::domain::{LogRecord, Lookup};
use chrono::{DateTime, Local, TimeZone};
use serde_json::Value;
use std::fmt::Display;

pub const CEF_VERSION: &str = "CEF:0";
pub const DEVICE_VENDOR: &str = "Duo Security";
pub const DEVICE_PRODUCT: &str = "DuoLogSync";
/// 0 - 10, where 10 marks the most important events.
pub const SEVERITY: &str = "5";
/// CEF receipt time; must be epoch milliseconds on the wire.
pub const EVENT_TIME_LABEL: &str = "rt";

const SYSLOG_TIME_FORMAT: &str = "%b %d %H:%M:%S";
const EVENT_TYPE_FIELD: &str = "eventtype";
const ACTION_FIELD: &str = "action";
const ADMINISTRATOR_EVENT: &str = "administrator";

/// Turns a [`LogRecord`] into a single syslog-prefixed CEF line.
#[derive(Debug, Clone)]
pub struct CefEncoder {
    hostname: String,
    device_version: String,
}

impl CefEncoder {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            device_version: crate::VERSION.to_string(),
        }
    }

    /// Encoder stamped with this machine's host name.
    pub fn for_local_host() -> Self {
        let hostname = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "localhost".to_string());
        Self::new(hostname)
    }

    pub fn with_device_version(mut self, version: impl Into<String>) -> Self {
        self.device_version = version.into();
        self
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn encode(&self, record: &LogRecord, table: &MappingTable) -> String {
        self.encode_at(record, table, &Local::now())
    }

    /// Encode with an explicit syslog header time.
    pub fn encode_at<Tz>(&self, record: &LogRecord, table: &MappingTable, now: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let syslog_header = format!("{} {}", now.format(SYSLOG_TIME_FORMAT), self.hostname);

        let signature_id = render(record.lookup(&[EVENT_TYPE_FIELD]));
        let name = if signature_id == ADMINISTRATOR_EVENT {
            render(record.lookup(&[ACTION_FIELD]))
        } else {
            signature_id.clone()
        };

        let header = [
            CEF_VERSION,
            DEVICE_VENDOR,
            DEVICE_PRODUCT,
            self.device_version.as_str(),
            signature_id.as_str(),
            name.as_str(),
            SEVERITY,
        ]
        .join("|");

        let extension = build_extension(record, table);
        format!("{syslog_header} {header}|{extension}")
    }
}

/// Space-joined `label=value` tokens for every entry of `table`, in order.
///
/// Custom entries take the next `csN` slot and emit a `csNLabel=` declaration
/// ahead of the value token.
pub fn build_extension(record: &LogRecord, table: &MappingTable) -> String {
    let mut tokens = Vec::with_capacity(table.len() + table.custom_count());
    let mut custom_slot = 1;

    for entry in table.iter() {
        let found = record.lookup(entry.key_path);
        let value = match found.value() {
            Some(raw) if entry.label == EVENT_TIME_LABEL => match seconds_to_millis(raw) {
                Some(millis) => millis.to_string(),
                None => render(found),
            },
            _ => render(found),
        };

        if entry.custom {
            let slot = format!("cs{custom_slot}");
            tokens.push(format!("{slot}Label={}", entry.label));
            tokens.push(format!("{slot}={value}"));
            custom_slot += 1;
        } else {
            tokens.push(format!("{}={value}", entry.label));
        }
    }

    tokens.join(" ")
}

/// A 10-digit integer is a second-resolution epoch; scale it to millis.
/// Anything else is left for the caller to render unchanged.
fn seconds_to_millis(value: &Value) -> Option<u64> {
    let seconds = match value {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) if s.bytes().all(|b| b.is_ascii_digit()) => s.parse().ok()?,
        _ => return None,
    };
    (seconds.to_string().len() == 10).then(|| seconds * 1000)
}

fn render(found: Lookup<'_>) -> String {
    match found {
        Lookup::Absent | Lookup::Present(Value::Null) => String::new(),
        Lookup::Present(Value::String(s)) => s.clone(),
        Lookup::Present(other @ (Value::Number(_) | Value::Bool(_))) => other.to_string(),
        Lookup::Present(nested) => serde_json::to_string(nested).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cef::FieldMapping;
    use chrono::{NaiveDate, Utc};
    use serde_json::json;

    fn fixed_now() -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2024, 3, 7)
            .and_then(|d| d.and_hms_opt(9, 5, 1))
            .unwrap()
            .and_utc()
    }

    fn table(entries: &[FieldMapping]) -> MappingTable {
        MappingTable::new(entries.iter().copied()).unwrap()
    }

    #[test]
    fn test_scenario_extension() {
        let table = table(&[
            FieldMapping::standard(&["ts"], "rt"),
            FieldMapping::custom(&["application", "name"], "integration_name"),
        ]);
        let record = LogRecord::new(json!({"ts": 1690000000, "application": {"name": "MyApp"}}));

        assert_eq!(
            build_extension(&record, &table),
            "rt=1690000000000 cs1Label=integration_name cs1=MyApp"
        );
    }

    #[test]
    fn test_full_line_layout() {
        let encoder = CefEncoder::new("siem-host").with_device_version("2.3.0");
        let table = table(&[FieldMapping::standard(&["result"], "outcome")]);
        let record = LogRecord::new(json!({"eventtype": "authentication", "result": "success"}));

        let line = encoder.encode_at(&record, &table, &fixed_now());
        assert_eq!(
            line,
            "Mar 07 09:05:01 siem-host CEF:0|Duo Security|DuoLogSync|2.3.0|authentication|authentication|5|outcome=success"
        );
    }

    #[test]
    fn test_administrator_name_comes_from_action() {
        let encoder = CefEncoder::new("h").with_device_version("1");
        let table = table(&[FieldMapping::standard(&["username"], "suser")]);
        let record = LogRecord::new(json!({
            "eventtype": "administrator",
            "action": "user_update",
            "username": "alice"
        }));

        let line = encoder.encode_at(&record, &table, &fixed_now());
        assert!(line.contains("|1|administrator|user_update|5|suser=alice"), "{line}");
    }

    #[test]
    fn test_missing_eventtype_renders_empty_prefix_fields() {
        let encoder = CefEncoder::new("h").with_device_version("1");
        let table = table(&[FieldMapping::standard(&["result"], "outcome")]);
        let line = encoder.encode_at(&LogRecord::new(json!({})), &table, &fixed_now());
        assert!(line.ends_with("|DuoLogSync|1|||5|outcome="), "{line}");
    }

    #[test]
    fn test_custom_slots_ignore_interleaved_standard_fields() {
        let table = table(&[
            FieldMapping::custom(&["a"], "alpha"),
            FieldMapping::standard(&["x"], "src"),
            FieldMapping::custom(&["b"], "beta"),
            FieldMapping::standard(&["y"], "dst"),
            FieldMapping::custom(&["c"], "gamma"),
        ]);
        let record = LogRecord::new(json!({"a": 1, "b": 2, "c": 3, "x": "s", "y": "d"}));

        assert_eq!(
            build_extension(&record, &table),
            "cs1Label=alpha cs1=1 src=s cs2Label=beta cs2=2 dst=d cs3Label=gamma cs3=3"
        );
    }

    #[test]
    fn test_event_time_normalization() {
        let table = table(&[FieldMapping::standard(&["t"], "rt")]);
        let cases = [
            (json!({"t": 1690000000}), "rt=1690000000000"),
            (json!({"t": "1690000000"}), "rt=1690000000000"),
            (json!({"t": 1690000000123_u64}), "rt=1690000000123"),
            (json!({"t": 169000000}), "rt=169000000"),
            (json!({"t": "2023-07-22T04:26:40Z"}), "rt=2023-07-22T04:26:40Z"),
            (json!({"t": null}), "rt="),
            (json!({}), "rt="),
        ];

        for (record, expected) in cases {
            assert_eq!(build_extension(&LogRecord::new(record), &table), expected);
        }
    }

    #[test]
    fn test_ten_digit_value_on_other_labels_is_untouched() {
        let table = table(&[FieldMapping::standard(&["t"], "end")]);
        let record = LogRecord::new(json!({"t": 1690000000}));
        assert_eq!(build_extension(&record, &table), "end=1690000000");
    }

    #[test]
    fn test_missing_paths_render_empty() {
        let table = table(&[
            FieldMapping::standard(&["access_device", "ip", "address"], "src"),
            FieldMapping::custom(&["application", "type"], "integration_type"),
        ]);
        let record = LogRecord::new(json!({"access_device": null}));

        assert_eq!(
            build_extension(&record, &table),
            "src= cs1Label=integration_type cs1="
        );
    }

    #[test]
    fn test_value_rendering() {
        let table = table(&[
            FieldMapping::standard(&["flag"], "cat"),
            FieldMapping::standard(&["credits"], "cnt"),
            FieldMapping::standard(&["nested"], "msg"),
        ]);
        let record = LogRecord::new(json!({"flag": true, "credits": 2.5, "nested": {"k": [1, 2]}}));

        assert_eq!(
            build_extension(&record, &table),
            r#"cat=true cnt=2.5 msg={"k":[1,2]}"#
        );
    }
}
