//! Built-in field mappings for each supported log type.

use super::mapping::{FieldMapping, MappingError, MappingTable};
use crate::domain::LogType;

// `target.details` appears twice; the repeat is collapsed when the table is built.
const ACTIVITY: &[FieldMapping] = &[
    FieldMapping::standard(&["access_device", "ip", "address"], "src"),
    FieldMapping::standard(&["action", "name"], "act"),
    FieldMapping::standard(&["actor", "name"], "suser"),
    FieldMapping::standard(&["ts"], "rt"),
    FieldMapping::standard(&["target", "details"], "msg"),
    FieldMapping::standard(&["result"], "outcome"),
    FieldMapping::standard(&["target", "details"], "msg"),
    FieldMapping::custom(&["application", "name"], "integration_name"),
    FieldMapping::custom(&["application", "type"], "integration_type"),
];

const AUTHENTICATION: &[FieldMapping] = &[
    FieldMapping::standard(&["access_device", "ip"], "src"),
    FieldMapping::standard(&["user", "name"], "suser"),
    FieldMapping::standard(&["timestamp"], "rt"),
    FieldMapping::standard(&["result"], "outcome"),
    FieldMapping::standard(&["txid"], "externalId"),
    FieldMapping::custom(&["reason"], "reason"),
    FieldMapping::custom(&["factor"], "factor"),
    FieldMapping::custom(&["application", "name"], "integration_name"),
    FieldMapping::custom(&["auth_device", "name"], "auth_device"),
];

const ADMINISTRATOR: &[FieldMapping] = &[
    FieldMapping::standard(&["action"], "act"),
    FieldMapping::standard(&["username"], "suser"),
    FieldMapping::standard(&["timestamp"], "rt"),
    FieldMapping::standard(&["description"], "msg"),
    FieldMapping::custom(&["object"], "object"),
];

const TELEPHONY: &[FieldMapping] = &[
    FieldMapping::custom(&["context"], "context"),
    FieldMapping::custom(&["credits"], "credits"),
    FieldMapping::custom(&["eventtype"], "event_type"),
    FieldMapping::custom(&["phone"], "phone"),
    FieldMapping::standard(&["timestamp"], "rt"),
    FieldMapping::custom(&["type"], "type"),
];

pub fn raw_entries(log_type: LogType) -> &'static [FieldMapping] {
    match log_type {
        LogType::Activity => ACTIVITY,
        LogType::Authentication => AUTHENTICATION,
        LogType::Administrator => ADMINISTRATOR,
        LogType::Telephony => TELEPHONY,
    }
}

/// Build the validated mapping table for `log_type`.
pub fn mapping_table(log_type: LogType) -> Result<MappingTable, MappingError> {
    MappingTable::new(raw_entries(log_type).iter().copied())
}
