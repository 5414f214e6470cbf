//! Error types for the content module.

use dataloader::LoaderError;
use thiserror::Error;

/// Errors surfaced by repositories, loaders and the permitter.
///
/// Clonable: one cached loader result is handed to every waiter.
/// `WrongType`, `ConnClosed` and `NilPermitter` report wiring bugs and are
/// never recovered from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error("access denied")]
    AccessDenied,

    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("connection closed")]
    ConnClosed,

    #[error("nil permitter")]
    NilPermitter,

    #[error("wrong type: expected {expected}, found {found}")]
    WrongType { expected: String, found: String },

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("storage error: {message}")]
    Storage { message: String },

    #[error("invalid input: {message}")]
    Invalid { message: String },
}

impl ContentError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn wrong_type(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::WrongType {
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    #[must_use]
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::AccessDenied)
    }
}

impl From<LoaderError> for ContentError {
    fn from(e: LoaderError) -> Self {
        tracing::warn!(error = %e, "loader failed");
        match e {
            LoaderError::DeadlineExceeded { .. } => Self::DeadlineExceeded,
            LoaderError::Cancelled { .. } => Self::ConnClosed,
            LoaderError::MissingResult { loader, key } => {
                Self::storage(format!("{loader} returned no result for {key}"))
            }
            LoaderError::FetchPanicked { loader, key } => {
                Self::storage(format!("{loader} fetch for {key} did not complete"))
            }
        }
    }
}
