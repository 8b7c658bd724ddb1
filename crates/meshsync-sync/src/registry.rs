//! Peer roster and topic index.
//!
//! Topic membership is only ever changed through [`PeerRegistry::join`] and
//! [`PeerRegistry::remove`]; there is no standalone subscribe call.

use std::collections::{BTreeMap, BTreeSet};

use meshsync_core::{GeoLocation, Peer, PeerId, TopicEntry, WELL_KNOWN_TOPICS};

/// Known peers plus the subscribers of each topic.
#[derive(Debug, Clone, PartialEq)]
pub struct PeerRegistry {
    peers: BTreeMap<PeerId, Peer>,
    topics: BTreeMap<String, BTreeSet<PeerId>>,
}

impl PeerRegistry {
    /// An empty roster with the well-known topics present and unsubscribed.
    pub fn new() -> Self {
        let topics = WELL_KNOWN_TOPICS
            .iter()
            .map(|name| (name.to_string(), BTreeSet::new()))
            .collect();
        Self {
            peers: BTreeMap::new(),
            topics,
        }
    }

    /// Rebuild from persisted parts.
    ///
    /// Subscriber lists are kept as stored, then the well-known topics are
    /// guaranteed to exist.
    pub fn restore(peers: Vec<Peer>, topics: Vec<TopicEntry>) -> Self {
        let mut registry = Self::new();
        for peer in peers {
            registry.peers.insert(peer.id.clone(), peer);
        }
        for TopicEntry(name, subscribers) in topics {
            registry
                .topics
                .entry(name)
                .or_default()
                .extend(subscribers);
        }
        registry
    }

    /// Insert or overwrite `peer` and subscribe it to every well-known topic.
    pub fn join(&mut self, peer: Peer) {
        for name in WELL_KNOWN_TOPICS {
            self.topics
                .entry(name.to_string())
                .or_default()
                .insert(peer.id.clone());
        }
        self.peers.insert(peer.id.clone(), peer);
    }

    /// Drop the peer and prune it from every topic. Idempotent.
    pub fn remove(&mut self, id: &PeerId) -> Option<Peer> {
        for subscribers in self.topics.values_mut() {
            subscribers.remove(id);
        }
        self.peers.remove(id)
    }

    /// Record a position fix. Returns `false` if the peer is unknown.
    pub fn update_location(
        &mut self,
        id: &PeerId,
        location: Option<GeoLocation>,
        now: i64,
    ) -> bool {
        match self.peers.get_mut(id) {
            Some(peer) => {
                peer.touch_location(location, now);
                true
            }
            None => {
                tracing::warn!(peer = %id, "location update for unknown peer ignored");
                false
            }
        }
    }

    pub fn get(&self, id: &PeerId) -> Option<&Peer> {
        self.peers.get(id)
    }

    pub fn contains(&self, id: &PeerId) -> bool {
        self.peers.contains_key(id)
    }

    pub fn peers(&self) -> impl Iterator<Item = &Peer> {
        self.peers.values()
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    /// `(name, subscribers)` for every topic, ordered by name.
    pub fn topic_snapshot(&self) -> Vec<TopicEntry> {
        self.topics
            .iter()
            .map(|(name, subscribers)| {
                TopicEntry(name.clone(), subscribers.iter().cloned().collect())
            })
            .collect()
    }

    /// Known peers subscribed to any of `topics`.
    ///
    /// A stale subscriber with no roster entry is never returned.
    pub fn subscribers(&self, topics: &[&str]) -> BTreeSet<PeerId> {
        topics
            .iter()
            .filter_map(|name| self.topics.get(*name))
            .flatten()
            .filter(|id| self.peers.contains_key(*id))
            .cloned()
            .collect()
    }
}

impl Default for PeerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
