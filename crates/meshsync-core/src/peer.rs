//! Peer: a roster entry.

use serde::{Deserialize, Serialize};

use crate::types::{GeoLocation, PeerId};

/// Class of device a peer runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Phone,
    Tablet,
    Laptop,
    Drone,
}

/// A known peer.
///
/// Presence is event-driven: a peer stays in the roster from join until an
/// explicit leave, regardless of `last_seen_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Peer {
    pub id: PeerId,
    #[serde(alias = "name", default)]
    pub display_name: String,
    #[serde(alias = "type")]
    pub device_class: DeviceClass,
    #[serde(default)]
    pub location: Option<GeoLocation>,
    /// Opaque, never verified.
    #[serde(default)]
    pub public_key: Option<String>,
    #[serde(alias = "joined", default)]
    pub joined_at: i64,
    #[serde(alias = "lastSeen", default)]
    pub last_seen_at: i64,
    /// The peer's own counter; informational only.
    #[serde(default)]
    pub sequence: u64,
}

impl Peer {
    /// A freshly joined peer seen at `now`.
    pub fn new(
        id: impl Into<PeerId>,
        display_name: impl Into<String>,
        device_class: DeviceClass,
        now: i64,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            device_class,
            location: None,
            public_key: None,
            joined_at: now,
            last_seen_at: now,
            sequence: 0,
        }
    }

    /// Record a new position fix.
    pub fn touch_location(&mut self, location: Option<GeoLocation>, now: i64) {
        self.location = location;
        self.last_seen_at = now;
    }
}
