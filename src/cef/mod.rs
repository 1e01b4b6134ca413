//! Log-to-CEF transformation.
//!
//! - `mapping`: declarative key-path → label tables and their validation
//! - `tables`: the built-in table for every `LogType`
//! - `encoder`: renders one record as a syslog-prefixed CEF line

pub mod encoder;
pub mod mapping;
pub mod tables;

pub use encoder::{CefEncoder, build_extension};
pub use mapping::{FieldMapping, MappingError, MappingTable};
pub use tables::mapping_table;
