use thiserror::Error;

/// Classified outcome of a processing attempt.
///
/// Classification happens at the point of origin (validator or ledger) and is
/// carried as a typed value; the worker is the single place that maps it to a
/// queue action. Retryable failures go through the backoff schedule, permanent
/// failures are dead-lettered immediately.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    #[error("retryable failure: {0}")]
    Retryable(String),
    #[error("permanent failure: {0}")]
    Permanent(String),
}

impl Failure {
    pub fn retryable(reason: impl Into<String>) -> Self {
        Self::Retryable(reason.into())
    }

    pub fn permanent(reason: impl Into<String>) -> Self {
        Self::Permanent(reason.into())
    }
}

/// Errors surfaced by an [`AccountStore`](crate::domain::ports::AccountStore).
///
/// A version conflict must be distinguishable from a generic I/O failure: the
/// ledger retries conflicts and I/O errors but treats anything else as
/// permanent.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("version conflict")]
    VersionConflict,
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(String),
}
