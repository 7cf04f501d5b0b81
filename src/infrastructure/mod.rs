//! Infrastructure layer module
//!
//! - Configuration management (figment)
//! - Logging infrastructure (tracing)
//!
//! Database adapters live in `crate::adapters`.

pub mod config;
pub mod logging;
