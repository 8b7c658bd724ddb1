//! Well-known gossip topics.
//!
//! Every joining peer is subscribed to all three; there is no selective
//! subscription.

use serde::{Deserialize, Serialize};

use crate::types::PeerId;

/// Chat and relayed message traffic.
pub const MESSAGES: &str = "messages";
/// Position updates.
pub const LOCATIONS: &str = "locations";
/// Join/leave notifications.
pub const PRESENCE: &str = "presence";

/// All topics a peer is subscribed to on join.
pub const WELL_KNOWN_TOPICS: [&str; 3] = [MESSAGES, LOCATIONS, PRESENCE];

/// Read-only projection of one topic: `[name, [subscriberIds...]]` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicEntry(pub String, pub Vec<PeerId>);

impl TopicEntry {
    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn subscribers(&self) -> &[PeerId] {
        &self.1
    }
}
