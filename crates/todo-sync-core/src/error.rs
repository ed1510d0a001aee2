//! Error types for reconciliation actions.
//!
//! Every failure is scoped to the single action that raised it; nothing here is
//! fatal to the process.

use crate::tracker::OperationKind;
use thiserror::Error;

/// Error raised by the remote API, the job poller or a reconciliation action.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Input rejected before any request was sent.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Network or transport-level HTTP error from reqwest.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, or a short description when it was empty.
        message: String,
    },

    /// A response body did not match the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The job reached the `failed` state.
    #[error("Job {job_id} failed")]
    JobFailed { job_id: String },

    /// The job was still pending when the poll policy ran out.
    #[error("Job {job_id} still pending after {attempts} status checks")]
    JobTimedOut { job_id: String, attempts: u32 },

    /// The same operation is already running for this item.
    #[error("A {kind} operation is already in flight for item {id}")]
    AlreadyInFlight { kind: OperationKind, id: String },

    /// The client was built with an unusable setting.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SyncError {
    /// HTTP status for `Api` errors and for reqwest errors that carry one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Whether the remote job itself ended badly (failed or never finished),
    /// as opposed to the request carrying it.
    pub fn is_job_error(&self) -> bool {
        matches!(self, Self::JobFailed { .. } | Self::JobTimedOut { .. })
    }
}

/// Convenience Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;
