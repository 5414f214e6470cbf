//! Errors raised by the loader machinery itself.

use thiserror::Error;

/// Failures that originate in a [`BatchLoader`](crate::BatchLoader) rather
/// than in the caller-supplied fetch function.
///
/// Loader error types must implement `From<LoaderError>` so these can be
/// delivered to waiters through the same result channel as fetch errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoaderError {
    /// The dispatcher for a pending key went away before producing a result.
    #[error("loader `{loader}` dropped the pending fetch for key `{key}`")]
    Cancelled { loader: &'static str, key: String },

    /// The fetch function returned fewer results than it was given keys.
    #[error("loader `{loader}` returned no result for key `{key}`")]
    MissingResult { loader: &'static str, key: String },

    /// The per-key unit of work panicked or was aborted.
    #[error("loader `{loader}` fetch for key `{key}` did not complete")]
    FetchPanicked { loader: &'static str, key: String },

    /// The request deadline passed before the fetch completed.
    #[error("loader `{loader}` deadline exceeded")]
    DeadlineExceeded { loader: &'static str },
}
