use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kinds of Duo log streams this forwarder knows how to ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogType {
    Activity,
    #[serde(rename = "auth", alias = "authentication")]
    Authentication,
    #[serde(rename = "adminaction", alias = "administrator")]
    Administrator,
    Telephony,
}

impl LogType {
    pub const ALL: [LogType; 4] = [
        LogType::Activity,
        LogType::Authentication,
        LogType::Administrator,
        LogType::Telephony,
    ];

    /// Canonical short name, used in checkpoint file names and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogType::Activity => "activity",
            LogType::Authentication => "auth",
            LogType::Administrator => "adminaction",
            LogType::Telephony => "telephony",
        }
    }

    /// Path to the record field holding the event time.
    pub fn timestamp_path(&self) -> &'static [&'static str] {
        match self {
            LogType::Activity => &["ts"],
            LogType::Authentication | LogType::Administrator | LogType::Telephony => {
                &["timestamp"]
            }
        }
    }

    /// Whether records of this type can be scoped to a child account.
    pub fn accepts_account_id(&self) -> bool {
        !matches!(self, LogType::Telephony)
    }
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "activity" => Ok(LogType::Activity),
            "auth" | "authentication" => Ok(LogType::Authentication),
            "adminaction" | "administrator" => Ok(LogType::Administrator),
            "telephony" => Ok(LogType::Telephony),
            other => Err(format!(
                "Unknown log type '{other}'. Valid values: activity, auth, adminaction, telephony"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_canonical_and_long_names() {
        assert_eq!("auth".parse::<LogType>(), Ok(LogType::Authentication));
        assert_eq!("Authentication".parse::<LogType>(), Ok(LogType::Authentication));
        assert_eq!("adminaction".parse::<LogType>(), Ok(LogType::Administrator));
        assert!("trust_monitor".parse::<LogType>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for log_type in LogType::ALL {
            assert_eq!(log_type.to_string().parse::<LogType>(), Ok(log_type));
        }
    }

    #[test]
    fn test_telephony_has_no_child_accounts() {
        assert!(!LogType::Telephony.accepts_account_id());
        assert!(LogType::Activity.accepts_account_id());
    }

    #[test]
    fn test_serde_aliases() {
        let parsed: LogType = serde_json::from_str("\"adminaction\"").unwrap();
        assert_eq!(parsed, LogType::Administrator);
        let parsed: LogType = serde_json::from_str("\"telephony\"").unwrap();
        assert_eq!(parsed, LogType::Telephony);
        let parsed: LogType = serde_json::from_str("\"authentication\"").unwrap();
        assert_eq!(parsed, LogType::Authentication);
    }

    #[test]
    fn test_serialized_name_matches_canonical_name() {
        for log_type in LogType::ALL {
            assert_eq!(
                serde_json::to_string(&log_type).unwrap(),
                format!("\"{}\"", log_type.as_str())
            );
        }
    }
}
