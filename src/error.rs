//! Unified error types.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// The error type returned by ripple's fallible builder operations.
///
/// Malformed URL *literals* are not represented here — they panic at the
/// call site (see [`url`](crate::url)), since a bad literal is a coding
/// defect, not runtime input. Controller-side failures have their own type,
/// [`ProcessError`], because they travel inside published snapshots.
#[derive(Debug)]
pub enum Error {
    /// A body value could not be serialized to JSON.
    Json(serde_json::Error),

    /// A header name or value is not representable on the wire.
    Header { name: String },

    /// The descriptor could not be assembled into an `http::Request`.
    Http(http::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Json(e) => write!(f, "json body: {e}"),
            Error::Header { name } => write!(f, "invalid header `{name}`"),
            Error::Http(e) => write!(f, "http: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Json(e) => Some(e),
            Error::Header { .. } => None,
            Error::Http(e) => Some(e),
        }
    }
}

impl From<http::Error> for Error {
    fn from(e: http::Error) -> Self {
        Self::Http(e)
    }
}

/// A terminal failure surfaced through a controller's `error` facet.
///
/// `Clone` because the value lives inside the published
/// [`Snapshot`](crate::Snapshot); the opaque work failure is shared behind
/// an `Arc` for that reason. Cancellation has no variant here — a superseded
/// attempt is discarded, never surfaced.
#[derive(Clone, Debug)]
pub enum ProcessError {
    /// An attempt did not complete within the configured limit.
    Timeout { limit: Duration },

    /// The work function reported a failure. After a retry burst only the
    /// last failure is kept.
    Work(Arc<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::Timeout { limit } => write!(f, "timed out after {limit:?}"),
            ProcessError::Work(source) => write!(f, "work failed: {source}"),
        }
    }
}

impl std::error::Error for ProcessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProcessError::Timeout { .. } => None,
            ProcessError::Work(source) => Some(source.as_ref()),
        }
    }
}
