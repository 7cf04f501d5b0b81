//! Domain layer for procopts
//!
//! This module contains the option resolution rules, the issue-change model
//! and the port traits infrastructure adapters implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
