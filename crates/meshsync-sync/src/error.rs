//! Error types for the sync module.

use meshsync_core::PeerId;
use thiserror::Error;

/// Errors that can occur during coordinator operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Sync requested by a peer that never joined (or has left).
    #[error("peer not found: {0}")]
    PeerNotFound(PeerId),

    /// Request could not be decoded. No state was touched.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// A fanout target could not be reached.
    #[error("peer unreachable: {0}")]
    Unreachable(PeerId),

    /// Transport-level failure other than an unreachable peer.
    #[error("transport error: {0}")]
    TransportError(String),
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
