//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use meshsync::{Node, NodeConfig};
use meshsync_core::{
    DeviceClass, Message, MessageBuilder, MessageId, MessageKind, PeerId, PersistedState,
};
use meshsync_store::{MemoryStore, SnapshotStore, StoreError};
use meshsync_sync::{
    Clock, CoordinatorConfig, JoinRequest, LoggingTransport, MessageIdSource, PublishRequest,
};

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock(AtomicI64);

impl ManualClock {
    pub fn new(start: i64) -> Arc<Self> {
        Arc::new(Self(AtomicI64::new(start)))
    }

    pub fn set(&self, millis: i64) {
        self.0.store(millis, Ordering::SeqCst);
    }

    pub fn advance(&self, millis: i64) {
        self.0.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Hands out `<prefix>1`, `<prefix>2`, ...
#[derive(Debug)]
pub struct SequenceIds {
    prefix: String,
    next: AtomicU64,
}

impl SequenceIds {
    pub fn new(prefix: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        })
    }
}

impl MessageIdSource for SequenceIds {
    fn next_id(&self, _now_millis: i64) -> MessageId {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        MessageId::new(format!("{}{}", self.prefix, n))
    }
}

/// Always hands out the same ID, to engineer collisions.
#[derive(Debug, Clone)]
pub struct FixedIds(pub MessageId);

impl FixedIds {
    pub fn new(id: impl Into<MessageId>) -> Arc<Self> {
        Arc::new(Self(id.into()))
    }
}

impl MessageIdSource for FixedIds {
    fn next_id(&self, _now_millis: i64) -> MessageId {
        self.0.clone()
    }
}

/// A store whose writes always fail. Loads find nothing.
#[derive(Debug, Default)]
pub struct FailingStore {
    attempts: AtomicU64,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of save attempts so far.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotStore for FailingStore {
    async fn load(&self) -> meshsync_store::Result<Option<PersistedState>> {
        Ok(None)
    }

    async fn save(&self, _state: &PersistedState) -> meshsync_store::Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Unavailable("disk full".into()))
    }
}

/// A node over a memory store with a manual clock and sequential IDs.
///
/// Background snapshots and persist-on-publish are off.
pub struct TestNode {
    pub node: Node<MemoryStore, LoggingTransport>,
    pub clock: Arc<ManualClock>,
}

impl TestNode {
    /// Start a node named `name`. Message IDs are `<name>-1`, `<name>-2`, ...
    pub async fn start(name: &str) -> Self {
        Self::start_with_ids(name, SequenceIds::new(format!("{name}-"))).await
    }

    /// Start a node with a specific ID source.
    pub async fn start_with_ids(name: &str, ids: Arc<dyn MessageIdSource>) -> Self {
        let clock = ManualClock::new(1_000);
        let config = NodeConfig {
            snapshot_interval: Duration::ZERO,
            persist_on_publish: false,
            coordinator: CoordinatorConfig {
                node_name: name.to_string(),
                ..Default::default()
            },
        };
        let node = Node::builder(MemoryStore::new(), LoggingTransport)
            .config(config)
            .clock(clock.clone())
            .id_source(ids)
            .start()
            .await
            .expect("memory store never fails to load");
        Self { node, clock }
    }
}

/// A phone joining as `id`.
pub fn join_request(id: &str) -> JoinRequest {
    JoinRequest {
        peer_id: PeerId::from(id),
        display_name: format!("Device {id}"),
        device_class: DeviceClass::Phone,
        location: None,
        public_key: None,
    }
}

/// A public text message from `author`.
pub fn publish_request(author: &str, content: &str) -> PublishRequest {
    PublishRequest {
        author_id: PeerId::from(author),
        kind: MessageKind::Public,
        content: content.to_string(),
        location: None,
        signature: None,
    }
}

/// A message as another node would have stored it.
pub fn message(id: &str, created_at: i64, content: &str) -> Message {
    MessageBuilder::new(id, "remote")
        .content(content)
        .created_at(created_at)
        .sequence(1)
        .build()
}
