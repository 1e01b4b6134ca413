use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingError {
    #[error(
        "Key path {path:?} is mapped twice with different targets: '{first}' and '{second}'"
    )]
    ConflictingKeyPath {
        path: Vec<String>,
        first: String,
        second: String,
    },
    #[error("Empty key path for label '{label}'")]
    EmptyKeyPath { label: String },
}

/// One declarative rule: read the value at `key_path` and emit it under
/// `label`. Custom labels are not native CEF keys and get a `csN` slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMapping {
    pub key_path: &'static [&'static str],
    pub label: &'static str,
    pub custom: bool,
}

impl FieldMapping {
    pub const fn standard(key_path: &'static [&'static str], label: &'static str) -> Self {
        Self {
            key_path,
            label,
            custom: false,
        }
    }

    pub const fn custom(key_path: &'static [&'static str], label: &'static str) -> Self {
        Self {
            key_path,
            label,
            custom: true,
        }
    }

    fn describe(&self) -> String {
        if self.custom {
            format!("{} (custom)", self.label)
        } else {
            self.label.to_string()
        }
    }
}

/// Ordered, validated set of field mappings for one log type.
///
/// Entry order is emission order. Key paths are unique: an exact repeat of an
/// earlier entry is dropped, a repeat with a different target is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingTable {
    entries: Vec<FieldMapping>,
}

impl MappingTable {
    pub fn new<I>(entries: I) -> Result<Self, MappingError>
    where
        I: IntoIterator<Item = FieldMapping>,
    {
        let mut accepted: Vec<FieldMapping> = Vec::new();

        for entry in entries {
            if entry.key_path.is_empty() {
                return Err(MappingError::EmptyKeyPath {
                    label: entry.label.to_string(),
                });
            }

            match accepted.iter().find(|e| e.key_path == entry.key_path) {
                Some(existing) if existing == &entry => {
                    debug!(path = ?entry.key_path, label = entry.label, "Dropping repeated mapping");
                }
                Some(existing) => {
                    return Err(MappingError::ConflictingKeyPath {
                        path: entry.key_path.iter().map(|k| (*k).to_string()).collect(),
                        first: existing.describe(),
                        second: entry.describe(),
                    });
                }
                None => accepted.push(entry),
            }
        }

        Ok(Self { entries: accepted })
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldMapping> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn custom_count(&self) -> usize {
        self.entries.iter().filter(|e| e.custom).count()
    }
}
