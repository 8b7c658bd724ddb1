//! Request and response types for the coordinator operations.
//!
//! Field aliases accept the payloads older web clients send (`deviceName`,
//! `deviceType`, `type`, `deviceId`), so a transport can decode straight into
//! these types.

use serde::{Deserialize, Serialize};

use meshsync_core::{
    DeviceClass, GeoLocation, Message, MessageId, MessageKind, Peer, PeerId, StateDigest,
    TopicEntry,
};

/// Join: a peer introduces itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub peer_id: PeerId,
    #[serde(alias = "deviceName", default)]
    pub display_name: String,
    #[serde(alias = "deviceType")]
    pub device_class: DeviceClass,
    #[serde(default)]
    pub location: Option<GeoLocation>,
    #[serde(default)]
    pub public_key: Option<String>,
}

/// Full state handed to a joining peer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub sequence: u64,
    pub digest: Option<StateDigest>,
    pub messages: Vec<Message>,
    pub peers: Vec<Peer>,
    pub topics: Vec<TopicEntry>,
}

/// Publish: originate a new message on this node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    pub author_id: PeerId,
    #[serde(alias = "type")]
    pub kind: MessageKind,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub location: Option<GeoLocation>,
    #[serde(default)]
    pub signature: Option<String>,
}

/// Outcome of a publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    Accepted,
    Duplicate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishResponse {
    pub status: PublishStatus,
    #[serde(alias = "messageId")]
    pub id: MessageId,
}

/// Sync: full-state push-pull.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub peer_id: PeerId,
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// Everything the coordinator holds after merging both sides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub sequence: u64,
    pub digest: Option<StateDigest>,
    pub messages: Vec<Message>,
    pub peers: Vec<Peer>,
}

/// Carried by a `peer-left` event. Extra fields (e.g. `name`) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerDeparture {
    pub id: PeerId,
}

/// Carried by a `location-update` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationUpdate {
    #[serde(alias = "deviceId")]
    pub peer_id: PeerId,
    #[serde(default)]
    pub location: Option<GeoLocation>,
}

/// A gossip event, relayed in from a peer or fanned out to peers.
///
/// On the wire: `{"type": "<kind>", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum RelayEvent {
    Message(Message),
    PeerJoined(Peer),
    PeerLeft(PeerDeparture),
    LocationUpdate(LocationUpdate),
    /// Any other kind. Accepted and ignored; never sent.
    #[serde(skip)]
    Unrecognized(String),
}

impl RelayEvent {
    /// The wire name of this event's kind.
    pub fn kind(&self) -> &str {
        match self {
            RelayEvent::Message(_) => "message",
            RelayEvent::PeerJoined(_) => "peer-joined",
            RelayEvent::PeerLeft(_) => "peer-left",
            RelayEvent::LocationUpdate(_) => "location-update",
            RelayEvent::Unrecognized(kind) => kind,
        }
    }

    /// Whether `kind` names one of the handled event kinds.
    pub fn is_known_kind(kind: &str) -> bool {
        matches!(kind, "message" | "peer-joined" | "peer-left" | "location-update")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayStatus {
    Received,
}

/// Acknowledgement for a relayed event. Always `received`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayAck {
    pub status: RelayStatus,
}

impl RelayAck {
    pub const RECEIVED: RelayAck = RelayAck {
        status: RelayStatus::Received,
    };
}

/// Operational summary of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    pub node_name: String,
    pub message_count: usize,
    pub peer_count: usize,
    pub topic_count: usize,
    pub sequence: u64,
    pub digest: Option<StateDigest>,
    pub last_synced_at: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshsync_core::MessageBuilder;

    #[test]
    fn test_join_request_accepts_legacy_names() {
        let json = r#"{
            "peerId": "node_1",
            "deviceName": "Pixel",
            "deviceType": "phone",
            "location": null,
            "publicKey": "pk_1"
        }"#;
        let req: JoinRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.display_name, "Pixel");
        assert_eq!(req.device_class, DeviceClass::Phone);
        assert_eq!(req.public_key.as_deref(), Some("pk_1"));
    }

    #[test]
    fn test_relay_event_wire_shape() {
        let event = RelayEvent::Message(MessageBuilder::new("m1", "a").content("hi").build());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "message");
        assert_eq!(json["data"]["content"], "hi");

        let left: RelayEvent =
            serde_json::from_str(r#"{"type":"peer-left","data":{"id":"x","name":"X"}}"#).unwrap();
        assert_eq!(left, RelayEvent::PeerLeft(PeerDeparture { id: PeerId::from("x") }));
    }

    #[test]
    fn test_location_update_accepts_device_id() {
        let json = r#"{"deviceId":"d1","deviceName":"Drone","location":{"lat":1.5,"lng":2.5}}"#;
        let update: LocationUpdate = serde_json::from_str(json).unwrap();
        assert_eq!(update.peer_id.as_str(), "d1");
        assert_eq!(update.location, Some(GeoLocation::new(1.5, 2.5)));
    }

    #[test]
    fn test_known_kinds() {
        assert!(RelayEvent::is_known_kind("location-update"));
        assert!(!RelayEvent::is_known_kind("heartbeat"));
        assert_eq!(RelayEvent::Unrecognized("heartbeat".into()).kind(), "heartbeat");
    }

    #[test]
    fn test_publish_response_shape() {
        let resp = PublishResponse {
            status: PublishStatus::Duplicate,
            id: MessageId::from("m"),
        };
        assert_eq!(
            serde_json::to_string(&resp).unwrap(),
            r#"{"status":"duplicate","id":"m"}"#
        );
    }
}
