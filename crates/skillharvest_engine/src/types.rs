use std::fmt;

use skillharvest_core::JobRecord;
use thiserror::Error;

/// Classification of one successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// 2xx payload with `active == true`.
    Found(JobRecord),
    /// HTTP 404: no such job.
    NotFound,
    /// 2xx payload with `active == false`.
    Inactive,
}

/// Whether a fetch failure is worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Rate limit, server overload, or a connection-level failure.
    Transient,
    /// Malformed payload or an unexpected status.
    Fatal,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Transient => write!(f, "transient"),
            FailureKind::Fatal => write!(f, "fatal"),
        }
    }
}

/// Error from the wire-level job fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Error from the persistence gateway.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying storage failure.
    #[error("storage backend: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Batch-level failure: the harvest environment itself is broken.
///
/// Per-item fetch and store errors never surface here; they are folded into
/// the report's failure count.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// The HTTP client could not be constructed.
    #[error("http client: {0}")]
    Client(String),
    /// The store could not be opened or migrated.
    #[error("store unavailable: {0}")]
    Store(#[from] StoreError),
    /// A scheduler worker could not be joined.
    #[error("worker failed: {0}")]
    Worker(String),
}
