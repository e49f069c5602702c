//! Common error types for Patrimoni

use thiserror::Error;

use crate::models::EntityKind;

/// Common result type for Patrimoni operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the Patrimoni crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid caller-supplied input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A wire record could not be mapped onto its canonical shape
    #[error("Cannot normalize {kind}: {message}")]
    Normalize {
        /// Entity kind being normalized
        kind: EntityKind,
        /// What went wrong
        message: String,
    },
}

impl Error {
    pub(crate) fn normalize(kind: EntityKind, message: impl Into<String>) -> Self {
        Error::Normalize {
            kind,
            message: message.into(),
        }
    }
}
