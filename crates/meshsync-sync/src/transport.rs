//! Transport abstraction for fanout delivery.
//!
//! The coordinator only decides who should receive an event. Getting it
//! there is the transport's job: push over a persistent connection, a relay
//! service, or the in-memory network used by tests.

use async_trait::async_trait;

use meshsync_core::PeerId;

use crate::error::Result;
use crate::messages::RelayEvent;

/// Delivers fanout events to individual peers.
///
/// Implementations must be thread-safe (Send + Sync). A failed delivery is
/// reported as [`SyncError::Unreachable`](crate::SyncError::Unreachable) and
/// never affects committed state.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver `event` to `peer`.
    async fn deliver(&self, peer: &PeerId, event: &RelayEvent) -> Result<()>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn deliver(&self, peer: &PeerId, event: &RelayEvent) -> Result<()> {
        (**self).deliver(peer, event).await
    }
}

/// Records each delivery as a log event and reports success.
///
/// This is the default for a node with no real connections to push over.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingTransport;

#[async_trait]
impl Transport for LoggingTransport {
    async fn deliver(&self, peer: &PeerId, event: &RelayEvent) -> Result<()> {
        tracing::info!(peer = %peer, kind = event.kind(), "gossip delivered");
        Ok(())
    }
}

/// A simple in-memory transport for testing.
///
/// Uses channels to simulate pushing events to connected peers.
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::sync::{mpsc, Mutex, RwLock};

    use crate::error::SyncError;

    const INBOX_CAPACITY: usize = 1000;

    /// Shared routing table for the memory network.
    pub struct MemoryNetwork {
        inboxes: RwLock<HashMap<PeerId, mpsc::Sender<RelayEvent>>>,
    }

    impl MemoryNetwork {
        /// Create a new memory network.
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        /// Connect `peer` and return its inbox.
        ///
        /// Connecting the same peer again replaces the previous inbox.
        pub async fn connect(&self, peer: PeerId) -> Inbox {
            let (tx, rx) = mpsc::channel(INBOX_CAPACITY);
            self.inboxes.write().await.insert(peer.clone(), tx);
            Inbox {
                peer,
                receiver: Mutex::new(rx),
            }
        }

        /// Disconnect `peer`. Later deliveries to it fail as unreachable.
        pub async fn disconnect(&self, peer: &PeerId) {
            self.inboxes.write().await.remove(peer);
        }

        /// A transport that delivers into this network.
        pub fn transport(self: &Arc<Self>) -> MemoryTransport {
            MemoryTransport {
                network: Arc::clone(self),
            }
        }

        /// Check if a specific peer is connected.
        pub async fn is_connected(&self, peer: &PeerId) -> bool {
            self.inboxes.read().await.contains_key(peer)
        }
    }

    impl Default for MemoryNetwork {
        fn default() -> Self {
            Self {
                inboxes: RwLock::new(HashMap::new()),
            }
        }
    }

    /// Receiving end for one connected peer.
    pub struct Inbox {
        peer: PeerId,
        receiver: Mutex<mpsc::Receiver<RelayEvent>>,
    }

    impl Inbox {
        pub fn peer(&self) -> &PeerId {
            &self.peer
        }

        /// Receive the next event.
        pub async fn recv(&self) -> Result<RelayEvent> {
            self.receiver
                .lock()
                .await
                .recv()
                .await
                .ok_or_else(|| SyncError::TransportError("inbox closed".into()))
        }

        /// Receive with timeout.
        ///
        /// Returns None if the timeout expires before an event arrives.
        pub async fn recv_timeout(&self, timeout: Duration) -> Result<Option<RelayEvent>> {
            let mut rx = self.receiver.lock().await;
            match tokio::time::timeout(timeout, rx.recv()).await {
                Ok(Some(event)) => Ok(Some(event)),
                Ok(None) => Err(SyncError::TransportError("inbox closed".into())),
                Err(_) => Ok(None),
            }
        }

        /// Everything queued right now, without waiting.
        pub async fn drain(&self) -> Vec<RelayEvent> {
            let mut rx = self.receiver.lock().await;
            let mut events = Vec::new();
            while let Ok(event) = rx.try_recv() {
                events.push(event);
            }
            events
        }
    }

    /// Delivers into a [`MemoryNetwork`].
    #[derive(Clone)]
    pub struct MemoryTransport {
        network: Arc<MemoryNetwork>,
    }

    #[async_trait]
    impl Transport for MemoryTransport {
        async fn deliver(&self, peer: &PeerId, event: &RelayEvent) -> Result<()> {
            let sender = self.network.inboxes.read().await.get(peer).cloned();
            match sender {
                Some(sender) => sender
                    .send(event.clone())
                    .await
                    .map_err(|_| SyncError::Unreachable(peer.clone())),
                None => Err(SyncError::Unreachable(peer.clone())),
            }
        }
    }
}
