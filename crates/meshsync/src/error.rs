//! Error types for the node.

use meshsync_store::StoreError;
use meshsync_sync::SyncError;
use thiserror::Error;

/// Errors that can occur during node operations.
#[derive(Debug, Error)]
pub enum NodeError {
    /// Storage error while loading state.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Coordinator error (unknown peer, malformed request).
    #[error("sync error: {0}")]
    Sync(#[from] SyncError),

    /// A snapshot write failed. The node keeps running; the next cycle tries again.
    #[error("persistence write failed: {0}")]
    PersistenceWriteFailed(#[source] StoreError),

    /// Request named an operation the node does not serve.
    #[error("unknown operation: {0}")]
    UnknownOperation(String),
}

impl NodeError {
    pub(crate) fn malformed(detail: impl ToString) -> Self {
        NodeError::Sync(SyncError::MalformedRequest(detail.to_string()))
    }

    /// Whether the caller sent something the node could not act on.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            NodeError::Sync(SyncError::PeerNotFound(_))
                | NodeError::Sync(SyncError::MalformedRequest(_))
                | NodeError::UnknownOperation(_)
        )
    }
}

/// Result type for node operations.
pub type Result<T> = std::result::Result<T, NodeError>;
