//! The sync coordinator.
//!
//! Owns the node's [`GossipState`] behind a single lock and implements the
//! five operations peers call: join, publish, sync, relay and topic query,
//! plus a few read-only queries for operators.
//!
//! Every mutating operation runs to completion under the write lock. Fanout
//! is planned under the lock and delivered after it is released, so a slow
//! or unreachable peer never blocks other operations and never undoes a
//! committed change.

use std::sync::Arc;

use tokio::sync::RwLock;

use meshsync_core::{
    Message, MessageBuilder, Peer, PersistedState, TopicEntry, MESSAGES, PRESENCE,
};

use crate::clock::{Clock, SystemClock};
use crate::config::CoordinatorConfig;
use crate::error::{Result, SyncError};
use crate::fanout::{Broadcaster, FanoutPlan};
use crate::ids::{MessageIdSource, RandomMessageIds};
use crate::messages::{
    JoinRequest, NodeInfo, PublishRequest, PublishResponse, PublishStatus, RelayAck, RelayEvent,
    StateSnapshot, SyncRequest, SyncResponse,
};
use crate::state::{GossipState, Origination};
use crate::transport::Transport;

/// Coordinates gossip state for one node.
pub struct Coordinator<T> {
    state: RwLock<GossipState>,
    transport: T,
    config: CoordinatorConfig,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn MessageIdSource>,
}

impl<T: Transport> Coordinator<T> {
    /// Create a coordinator over existing state.
    pub fn new(state: GossipState, transport: T, config: CoordinatorConfig) -> Self {
        Self {
            state: RwLock::new(state),
            transport,
            config,
            clock: Arc::new(SystemClock),
            ids: Arc::new(RandomMessageIds),
        }
    }

    /// Replace the wall clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the message ID generator.
    pub fn with_id_source(mut self, ids: Arc<dyn MessageIdSource>) -> Self {
        self.ids = ids;
        self
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Register a peer and hand it the full current state.
    ///
    /// The new peer is announced to every `presence` subscriber.
    pub async fn join(&self, request: JoinRequest) -> StateSnapshot {
        let now = self.clock.now_millis();
        let mut peer = Peer::new(
            request.peer_id,
            request.display_name,
            request.device_class,
            now,
        );
        peer.location = request.location;
        peer.public_key = request.public_key;

        let (snapshot, plan) = {
            let mut state = self.state.write().await;
            state.registry_mut().join(peer.clone());

            let snapshot = StateSnapshot {
                sequence: state.sequence(),
                digest: state.digest(),
                messages: state.messages().cloned().collect(),
                peers: state.registry().peers().cloned().collect(),
                topics: state.registry().topic_snapshot(),
            };
            let plan = Broadcaster::plan(
                state.registry(),
                RelayEvent::PeerJoined(peer.clone()),
                &[PRESENCE],
            );
            (snapshot, plan)
        };

        tracing::info!(
            peer = %peer.id,
            name = %peer.display_name,
            class = ?peer.device_class,
            "peer joined"
        );
        self.dispatch(plan).await;
        snapshot
    }

    /// Originate a message on this node.
    ///
    /// An ID that was already seen is reported as a duplicate and changes
    /// nothing.
    pub async fn publish(&self, request: PublishRequest) -> PublishResponse {
        let now = self.clock.now_millis();
        let id = self.ids.next_id(now);

        let (outcome, plan) = {
            let mut state = self.state.write().await;
            let outcome = state.originate(id.clone(), |id, sequence| {
                MessageBuilder::new(id, request.author_id.clone())
                    .kind(request.kind)
                    .content(request.content.clone())
                    .created_at(now)
                    .location(request.location)
                    .signature(request.signature.clone())
                    .sequence(sequence)
                    .build()
            });
            let plan = match &outcome {
                Origination::Accepted(message) => Some(Broadcaster::plan(
                    state.registry(),
                    RelayEvent::Message(message.clone()),
                    &[MESSAGES],
                )),
                Origination::Duplicate => None,
            };
            (outcome, plan)
        };

        match outcome {
            Origination::Accepted(message) => {
                tracing::info!(
                    id = %message.id,
                    author = %message.author_id,
                    sequence = message.sequence,
                    "message published"
                );
                if let Some(plan) = plan {
                    self.dispatch(plan).await;
                }
                PublishResponse {
                    status: PublishStatus::Accepted,
                    id,
                }
            }
            Origination::Duplicate => {
                tracing::info!(id = %id, "duplicate publish ignored");
                PublishResponse {
                    status: PublishStatus::Duplicate,
                    id,
                }
            }
        }
    }

    /// Full-state push-pull with a joined peer.
    ///
    /// The local message map is replaced by the merge of local and remote
    /// messages, and everything held afterwards is returned.
    pub async fn sync(&self, request: SyncRequest) -> Result<SyncResponse> {
        let now = self.clock.now_millis();
        let mut state = self.state.write().await;

        if !state.registry().contains(&request.peer_id) {
            return Err(SyncError::PeerNotFound(request.peer_id));
        }

        let received = request.messages.len();
        state.replace_with_merge(request.messages, now);

        let response = SyncResponse {
            sequence: state.sequence(),
            digest: state.digest(),
            messages: state.messages().cloned().collect(),
            peers: state.registry().peers().cloned().collect(),
        };

        tracing::info!(
            peer = %request.peer_id,
            received,
            total = response.messages.len(),
            "synced with peer"
        );
        Ok(response)
    }

    /// Apply a gossip event from elsewhere in the mesh.
    ///
    /// Unrecognized kinds are acknowledged and ignored.
    pub async fn relay(&self, event: RelayEvent) -> RelayAck {
        let now = self.clock.now_millis();

        let plan = {
            let mut state = self.state.write().await;
            match event {
                RelayEvent::Message(incoming) => {
                    let (outcome, stored) = state.merge_remote(incoming);
                    tracing::debug!(id = %stored.id, ?outcome, "relayed message merged");
                    self.config.fanout_on_relay.then(|| {
                        Broadcaster::plan(state.registry(), RelayEvent::Message(stored), &[MESSAGES])
                    })
                }
                RelayEvent::PeerJoined(peer) => {
                    tracing::info!(peer = %peer.id, name = %peer.display_name, "peer joined via gossip");
                    state.registry_mut().join(peer);
                    None
                }
                RelayEvent::PeerLeft(departure) => {
                    let removed = state.registry_mut().remove(&departure.id);
                    tracing::info!(peer = %departure.id, known = removed.is_some(), "peer left via gossip");
                    None
                }
                RelayEvent::LocationUpdate(update) => {
                    if state
                        .registry_mut()
                        .update_location(&update.peer_id, update.location, now)
                    {
                        tracing::debug!(peer = %update.peer_id, "location updated via gossip");
                    }
                    None
                }
                RelayEvent::Unrecognized(kind) => {
                    tracing::debug!(kind = %kind, "ignoring unrecognized gossip kind");
                    None
                }
            }
        };

        if let Some(plan) = plan {
            self.dispatch(plan).await;
        }
        RelayAck::RECEIVED
    }

    /// Subscribers of every topic.
    pub async fn topic_query(&self) -> Vec<TopicEntry> {
        self.state.read().await.registry().topic_snapshot()
    }

    pub async fn info(&self) -> NodeInfo {
        let state = self.state.read().await;
        NodeInfo {
            node_name: self.config.node_name.clone(),
            message_count: state.message_count(),
            peer_count: state.registry().peer_count(),
            topic_count: state.registry().topic_count(),
            sequence: state.sequence(),
            digest: state.digest(),
            last_synced_at: state.last_synced_at(),
        }
    }

    /// The roster.
    pub async fn peers(&self) -> Vec<Peer> {
        self.state.read().await.registry().peers().cloned().collect()
    }

    /// All messages, ordered by ID.
    pub async fn messages(&self) -> Vec<Message> {
        self.state.read().await.messages().cloned().collect()
    }

    /// A consistent copy of the whole aggregate, for persistence.
    pub async fn persisted_snapshot(&self) -> PersistedState {
        self.state.read().await.to_persisted()
    }

    async fn dispatch(&self, plan: FanoutPlan) {
        if plan.is_empty() {
            return;
        }
        let report = plan.deliver(&self.transport).await;
        if !report.unreachable.is_empty() {
            tracing::warn!(
                kind = plan.event.kind(),
                delivered = report.delivered,
                unreachable = report.unreachable.len(),
                "fanout incomplete"
            );
        }
    }
}
