//! CLI command implementations.

pub mod changes;
pub mod jvm_options;
