use crate::cef::{CefEncoder, MappingTable};
use crate::domain::LogRecord;
use serde::{Deserialize, Serialize};

/// How records are rendered on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// The record as compact JSON, one per line
    #[default]
    Json,
    /// Syslog-prefixed Common Event Format
    Cef,
}

/// Turns one record into the newline-terminated bytes handed to a transport.
#[derive(Debug, Clone)]
pub struct RecordSerializer {
    format: LogFormat,
    encoder: CefEncoder,
}

impl RecordSerializer {
    pub fn new(format: LogFormat, encoder: CefEncoder) -> Self {
        Self { format, encoder }
    }

    pub fn json() -> Self {
        Self::new(LogFormat::Json, CefEncoder::for_local_host())
    }

    pub fn cef(encoder: CefEncoder) -> Self {
        Self::new(LogFormat::Cef, encoder)
    }

    pub fn format(&self) -> LogFormat {
        self.format
    }

    pub fn serialize(&self, record: &LogRecord, table: &MappingTable) -> Vec<u8> {
        let mut line = match self.format {
            LogFormat::Json => record.as_value().to_string(),
            LogFormat::Cef => self.encoder.encode(record, table),
        }
        .into_bytes();
        line.push(b'\n');
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cef::FieldMapping;
    use serde_json::json;

    #[test]
    fn test_json_line_keeps_field_order() {
        let table = MappingTable::new([]).unwrap();
        let record = LogRecord::from_json(r#"{"txid":"abc","eventtype":"authentication"}"#).unwrap();

        let bytes = RecordSerializer::json().serialize(&record, &table);
        assert_eq!(bytes, b"{\"txid\":\"abc\",\"eventtype\":\"authentication\"}\n");
    }

    #[test]
    fn test_cef_line_is_newline_terminated() {
        let table = MappingTable::new([FieldMapping::standard(&["result"], "outcome")]).unwrap();
        let record = LogRecord::new(json!({"eventtype": "authentication", "result": "denied"}));

        let serializer = RecordSerializer::cef(CefEncoder::new("collector"));
        let bytes = serializer.serialize(&record, &table);
        let line = String::from_utf8(bytes).unwrap();

        assert!(line.ends_with("|5|outcome=denied\n"), "{line}");
        assert!(line.contains(" collector CEF:0|Duo Security|DuoLogSync|"));
        assert_eq!(line.matches('\n').count(), 1);
    }
}
