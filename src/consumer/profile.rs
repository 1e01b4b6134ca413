use crate::cef::{MappingError, MappingTable, mapping_table};
use crate::domain::LogType;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfileError {
    #[error("Invalid mapping table for {log_type}: {source}")]
    Mapping {
        log_type: LogType,
        #[source]
        source: MappingError,
    },
    #[error("{0} logs cannot be scoped to a child account")]
    AccountNotSupported(LogType),
}

/// What specializes one consumer instance: the log type, its mapping table
/// and, for multi-tenant streams, the child account being forwarded.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumerProfile {
    log_type: LogType,
    table: MappingTable,
    account_id: Option<String>,
}

impl ConsumerProfile {
    /// Profile using the built-in table for `log_type`.
    pub fn new(log_type: LogType, account_id: Option<String>) -> Result<Self, ProfileError> {
        let table = mapping_table(log_type)
            .map_err(|source| ProfileError::Mapping { log_type, source })?;
        Self::with_table(log_type, table, account_id)
    }

    pub fn with_table(
        log_type: LogType,
        table: MappingTable,
        account_id: Option<String>,
    ) -> Result<Self, ProfileError> {
        if account_id.is_some() && !log_type.accepts_account_id() {
            return Err(ProfileError::AccountNotSupported(log_type));
        }
        Ok(Self {
            log_type,
            table,
            account_id,
        })
    }

    pub fn activity(account_id: Option<String>) -> Result<Self, ProfileError> {
        Self::new(LogType::Activity, account_id)
    }

    pub fn authentication(account_id: Option<String>) -> Result<Self, ProfileError> {
        Self::new(LogType::Authentication, account_id)
    }

    pub fn administrator(account_id: Option<String>) -> Result<Self, ProfileError> {
        Self::new(LogType::Administrator, account_id)
    }

    pub fn telephony() -> Result<Self, ProfileError> {
        Self::new(LogType::Telephony, None)
    }

    pub fn log_type(&self) -> LogType {
        self.log_type
    }

    pub fn table(&self) -> &MappingTable {
        &self.table
    }

    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }
}

impl fmt::Display for ConsumerProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.account_id {
            Some(account) => write!(f, "{}[{}]", self.log_type, account),
            None => write!(f, "{}", self.log_type),
        }
    }
}
