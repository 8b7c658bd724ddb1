//! The gossip state aggregate.
//!
//! One `GossipState` is owned per node. Every method that changes the message
//! map also refreshes the digest before returning, so a reader holding the
//! aggregate never sees a digest computed from a different message set.

use std::collections::{BTreeMap, BTreeSet};

use meshsync_core::{
    compute_digest, merge_all, merge_into, Message, MergeOutcome, MessageId, PersistedState,
    StateDigest,
};

use crate::registry::PeerRegistry;

/// Result of originating a message on this node.
#[derive(Debug, Clone, PartialEq)]
pub enum Origination {
    /// Stored with the attached sequence number.
    Accepted(Message),
    /// The ID was already seen; nothing changed.
    Duplicate,
}

/// Messages, roster, topics and bookkeeping for one node.
#[derive(Debug, Clone, PartialEq)]
pub struct GossipState {
    messages: BTreeMap<MessageId, Message>,
    registry: PeerRegistry,
    seen_ids: BTreeSet<MessageId>,
    sequence: u64,
    digest: Option<StateDigest>,
    last_synced_at: Option<i64>,
}

impl GossipState {
    pub fn new() -> Self {
        Self {
            messages: BTreeMap::new(),
            registry: PeerRegistry::new(),
            seen_ids: BTreeSet::new(),
            sequence: 0,
            digest: None,
            last_synced_at: None,
        }
    }

    /// Rehydrate from a snapshot.
    ///
    /// The stored digest is ignored and recomputed. Every stored message ID is
    /// added to the seen set even if the snapshot's own list missed it.
    pub fn from_persisted(snapshot: PersistedState) -> Self {
        let PersistedState {
            messages,
            peers,
            topics,
            seen_ids,
            sequence,
            digest: _,
            last_synced_at,
        } = snapshot;

        let messages: BTreeMap<_, _> = messages.into_iter().map(|m| (m.id.clone(), m)).collect();
        let mut seen_ids: BTreeSet<_> = seen_ids.into_iter().collect();
        seen_ids.extend(messages.keys().cloned());

        let mut state = Self {
            messages,
            registry: PeerRegistry::restore(peers, topics),
            seen_ids,
            sequence,
            digest: None,
            last_synced_at,
        };
        state.refresh_digest();
        state
    }

    /// A consistent copy for persistence.
    pub fn to_persisted(&self) -> PersistedState {
        PersistedState {
            messages: self.messages.values().cloned().collect(),
            peers: self.registry.peers().cloned().collect(),
            topics: self.registry.topic_snapshot(),
            seen_ids: self.seen_ids.iter().cloned().collect(),
            sequence: self.sequence,
            digest: self.digest,
            last_synced_at: self.last_synced_at,
        }
    }

    /// Accept a freshly originated message.
    ///
    /// `build` receives the next sequence number and is only called when the
    /// ID is new, so a duplicate leaves the counter untouched.
    pub fn originate<F>(&mut self, id: MessageId, build: F) -> Origination
    where
        F: FnOnce(MessageId, u64) -> Message,
    {
        if self.seen_ids.contains(&id) {
            return Origination::Duplicate;
        }

        self.sequence += 1;
        let message = build(id, self.sequence);
        self.seen_ids.insert(message.id.clone());
        self.messages.insert(message.id.clone(), message.clone());
        self.refresh_digest();
        Origination::Accepted(message)
    }

    /// Merge one message received from elsewhere and return the stored winner.
    pub fn merge_remote(&mut self, incoming: Message) -> (MergeOutcome, Message) {
        let id = incoming.id.clone();
        let fallback = incoming.clone();
        let outcome = merge_into(&mut self.messages, incoming);
        self.seen_ids.insert(id.clone());
        if outcome != MergeOutcome::Kept {
            self.refresh_digest();
        }
        let stored = self.messages.get(&id).cloned().unwrap_or(fallback);
        (outcome, stored)
    }

    /// Replace the whole message map with `merge_all(current, incoming)`.
    pub fn replace_with_merge(&mut self, incoming: Vec<Message>, now: i64) {
        let current = std::mem::take(&mut self.messages);
        self.messages = merge_all(current, incoming);
        self.seen_ids.extend(self.messages.keys().cloned());
        self.last_synced_at = Some(now);
        self.refresh_digest();
    }

    /// Recompute the digest from the current message map.
    pub fn refresh_digest(&mut self) {
        self.digest = compute_digest(self.messages.values());
    }

    pub fn registry(&self) -> &PeerRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut PeerRegistry {
        &mut self.registry
    }

    /// Messages ordered by ID.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.values()
    }

    pub fn message(&self, id: &MessageId) -> Option<&Message> {
        self.messages.get(id)
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn has_seen(&self, id: &MessageId) -> bool {
        self.seen_ids.contains(id)
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn digest(&self) -> Option<StateDigest> {
        self.digest
    }

    pub fn last_synced_at(&self) -> Option<i64> {
        self.last_synced_at
    }
}

impl Default for GossipState {
    fn default() -> Self {
        Self::new()
    }
}
