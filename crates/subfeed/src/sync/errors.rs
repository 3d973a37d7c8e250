use thiserror::Error;

use crate::remote::RemoteError;
use crate::store::StoreError;

/// Errors surfaced by the sync engine.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A membership, container or detail fetch failed after its retry.
    #[error("Remote unavailable: {0}")]
    RemoteUnavailable(RemoteError),

    /// The operation referenced a channel that is not cached.
    #[error("Unknown channel: {0}")]
    UnknownChannel(String),

    /// An internal invariant was about to be violated.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The persistent store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// A reconciliation task panicked or was cancelled.
    #[error("Task failed: {0}")]
    Task(String),

    /// A stored blob could not be encoded or decoded.
    #[error("Corrupt cache: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl From<RemoteError> for SyncError {
    /// A request the client refused to send is a caller bug, not an outage.
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::InvalidRequest { message } => Self::InvalidRequest(message),
            other => Self::RemoteUnavailable(other),
        }
    }
}

impl SyncError {
    /// Whether the failure came from the remote side.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::RemoteUnavailable(_))
    }
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
