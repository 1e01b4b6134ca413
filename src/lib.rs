#![deny(rust_2024_compatibility)]
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
#![allow(
    clippy::cast_possible_truncation, // Epoch millis and counters stay well inside the target width
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,  // e.g. CefEncoder in cef module
    clippy::must_use_candidate,
    clippy::doc_markdown
)]

pub mod app;
pub mod cef;
pub mod consumer;
pub mod domain;
pub mod producer;
pub mod reliability;
pub mod sender;

pub use app::{App, Config};
pub use domain::SyncError;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
