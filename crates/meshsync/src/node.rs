//! The Node: a coordinator with durable state.
//!
//! A node hydrates its gossip state from a [`SnapshotStore`] on start, writes
//! a snapshot on a fixed interval in the background, and writes a final one
//! on shutdown. A failed write is logged and skipped; the next cycle simply
//! tries again.
//!
//! Writes are serialized: each one captures the state and saves it under a
//! single lock, so snapshots land in the order they were taken.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use meshsync_core::{Message, Peer, TopicEntry};
use meshsync_store::SnapshotStore;
use meshsync_sync::{
    Clock, Coordinator, GossipState, JoinRequest, MessageIdSource, NodeInfo, PublishRequest,
    PublishResponse, PublishStatus, RelayAck, RelayEvent, StateSnapshot, SyncRequest,
    SyncResponse, Transport,
};

use crate::config::NodeConfig;
use crate::error::{NodeError, Result};

/// Builder for a [`Node`], for callers that need to replace the clock or
/// message ID generator.
pub struct NodeBuilder<S, T> {
    store: S,
    transport: T,
    config: NodeConfig,
    clock: Option<Arc<dyn Clock>>,
    ids: Option<Arc<dyn MessageIdSource>>,
}

impl<S, T> NodeBuilder<S, T>
where
    S: SnapshotStore + 'static,
    T: Transport + 'static,
{
    pub fn config(mut self, config: NodeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn id_source(mut self, ids: Arc<dyn MessageIdSource>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// Load state and start the background snapshot task.
    pub async fn start(self) -> Result<Node<S, T>> {
        let state = match self.store.load().await? {
            Some(snapshot) => {
                let state = GossipState::from_persisted(snapshot);
                tracing::info!(
                    messages = state.message_count(),
                    peers = state.registry().peer_count(),
                    sequence = state.sequence(),
                    "gossip state loaded"
                );
                state
            }
            None => {
                tracing::info!("no saved gossip state, starting empty");
                GossipState::new()
            }
        };

        let mut coordinator =
            Coordinator::new(state, self.transport, self.config.coordinator.clone());
        if let Some(clock) = self.clock {
            coordinator = coordinator.with_clock(clock);
        }
        if let Some(ids) = self.ids {
            coordinator = coordinator.with_id_source(ids);
        }

        let coordinator = Arc::new(coordinator);
        let store = Arc::new(self.store);
        let writes = Arc::new(Mutex::new(()));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = if self.config.snapshot_interval.is_zero() {
            None
        } else {
            Some(tokio::spawn(run_snapshots(
                Arc::clone(&coordinator),
                Arc::clone(&store),
                Arc::clone(&writes),
                self.config.snapshot_interval,
                shutdown_rx,
            )))
        };

        Ok(Node {
            coordinator,
            store,
            writes,
            config: self.config,
            shutdown: shutdown_tx,
            task: Mutex::new(task),
        })
    }
}

/// A running gossip node.
///
/// Dropping a node stops its background task without a final snapshot; call
/// [`Node::shutdown`] for a graceful stop.
pub struct Node<S, T> {
    coordinator: Arc<Coordinator<T>>,
    store: Arc<S>,
    writes: Arc<Mutex<()>>,
    config: NodeConfig,
    shutdown: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<S, T> Node<S, T>
where
    S: SnapshotStore + 'static,
    T: Transport + 'static,
{
    /// Start building a node over `store` and `transport`.
    pub fn builder(store: S, transport: T) -> NodeBuilder<S, T> {
        NodeBuilder {
            store,
            transport,
            config: NodeConfig::default(),
            clock: None,
            ids: None,
        }
    }

    /// Start a node with the system clock and random message IDs.
    pub async fn start(store: S, transport: T, config: NodeConfig) -> Result<Self> {
        Self::builder(store, transport).config(config).start().await
    }

    pub fn coordinator(&self) -> &Coordinator<T> {
        &self.coordinator
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Coordinator Operations
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn join(&self, request: JoinRequest) -> StateSnapshot {
        self.coordinator.join(request).await
    }

    /// Publish a message, then snapshot if configured to.
    ///
    /// A failed snapshot does not fail the publish.
    pub async fn publish(&self, request: PublishRequest) -> PublishResponse {
        let response = self.coordinator.publish(request).await;
        if response.status == PublishStatus::Accepted && self.config.persist_on_publish {
            if let Err(e) = self.persist_now().await {
                tracing::warn!(error = %e, "snapshot after publish failed");
            }
        }
        response
    }

    pub async fn sync(&self, request: SyncRequest) -> Result<SyncResponse> {
        Ok(self.coordinator.sync(request).await?)
    }

    pub async fn relay(&self, event: RelayEvent) -> RelayAck {
        self.coordinator.relay(event).await
    }

    pub async fn topic_query(&self) -> Vec<TopicEntry> {
        self.coordinator.topic_query().await
    }

    pub async fn info(&self) -> NodeInfo {
        self.coordinator.info().await
    }

    pub async fn peers(&self) -> Vec<Peer> {
        self.coordinator.peers().await
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.coordinator.messages().await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Persistence
    // ─────────────────────────────────────────────────────────────────────────

    /// Write a snapshot of the current state.
    pub async fn persist_now(&self) -> Result<()> {
        persist(&self.coordinator, self.store.as_ref(), &self.writes).await
    }

    /// Stop the background task and write a final snapshot.
    pub async fn shutdown(&self) -> Result<()> {
        // Receivers may already be gone if the task exited; nothing to signal then.
        let _ = self.shutdown.send(true);
        if let Some(handle) = self.task.lock().await.take() {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "snapshot task ended abnormally");
            }
        }
        self.persist_now().await?;
        tracing::info!("node shut down");
        Ok(())
    }
}

async fn persist<S, T>(coordinator: &Coordinator<T>, store: &S, writes: &Mutex<()>) -> Result<()>
where
    S: SnapshotStore + ?Sized,
    T: Transport,
{
    let _guard = writes.lock().await;
    let snapshot = coordinator.persisted_snapshot().await;
    store
        .save(&snapshot)
        .await
        .map_err(NodeError::PersistenceWriteFailed)?;
    tracing::info!(
        messages = snapshot.messages.len(),
        peers = snapshot.peers.len(),
        "gossip state saved"
    );
    Ok(())
}

async fn run_snapshots<S, T>(
    coordinator: Arc<Coordinator<T>>,
    store: Arc<S>,
    writes: Arc<Mutex<()>>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) where
    S: SnapshotStore,
    T: Transport,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = persist(&coordinator, store.as_ref(), &writes).await {
                    tracing::warn!(error = %e, "periodic snapshot failed");
                }
            }
            // Either a shutdown signal or the node was dropped.
            _ = shutdown.changed() => break,
        }
    }
    tracing::debug!("snapshot task stopped");
}
