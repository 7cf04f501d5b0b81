//! Domain errors for option resolution and the issue-change store.

use std::path::PathBuf;

use thiserror::Error;

/// Domain-level errors that can occur while assembling process options or
/// talking to the issue-change store.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Raw option text could not be accepted. Aborts the offending add only.
    #[error("Invalid option '{raw}': {reason}")]
    InvalidOption { raw: String, reason: String },

    /// Static option configuration is inconsistent (e.g. duplicate mandatory keys).
    #[error("Invalid option configuration: {0}")]
    Configuration(String),

    /// The rendered options file could not be persisted.
    #[error("Cannot write options file {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl DomainError {
    pub(crate) fn invalid_option(raw: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            raw: raw.into(),
            reason: reason.into(),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}
