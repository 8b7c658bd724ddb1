//! Message: the replicated record of the mesh.
//!
//! A message's `id` never changes once accepted. Its mutable fields are only
//! ever replaced wholesale by a merge winner, never patched field by field.

use serde::{Deserialize, Serialize};

use crate::types::{GeoLocation, MessageId, PeerId};

/// Discriminator for how a message is rendered and routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Broadcast chat message.
    Public,
    /// Message addressed to a single peer (still replicated to everyone).
    Private,
    /// Location ping; `content` is usually empty.
    Location,
}

impl MessageKind {
    /// Stable wire name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Public => "public",
            MessageKind::Private => "private",
            MessageKind::Location => "location",
        }
    }
}

/// A replicated message.
///
/// Field aliases accept the payloads older clients send (`type`, `author`,
/// `timestamp`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Identifier assigned by the accepting node.
    pub id: MessageId,
    /// Message kind.
    #[serde(alias = "type")]
    pub kind: MessageKind,
    /// Originating peer.
    #[serde(alias = "author")]
    pub author_id: PeerId,
    /// Author-supplied payload.
    #[serde(default)]
    pub content: String,
    /// Wall-clock accept time (Unix ms). Never reassigned on merge.
    #[serde(alias = "timestamp")]
    pub created_at: i64,
    /// Optional position attached by the author.
    #[serde(default)]
    pub location: Option<GeoLocation>,
    /// Opaque signature over `content`. Carried, never verified.
    #[serde(default)]
    pub signature: Option<String>,
    /// Accepting node's sequence counter at accept time.
    #[serde(default)]
    pub sequence: u64,
}

/// Builder for constructing messages.
pub struct MessageBuilder {
    id: MessageId,
    kind: MessageKind,
    author_id: PeerId,
    content: String,
    created_at: i64,
    location: Option<GeoLocation>,
    signature: Option<String>,
    sequence: u64,
}

impl MessageBuilder {
    /// Start a public, empty message.
    pub fn new(id: impl Into<MessageId>, author_id: impl Into<PeerId>) -> Self {
        Self {
            id: id.into(),
            kind: MessageKind::Public,
            author_id: author_id.into(),
            content: String::new(),
            created_at: 0,
            location: None,
            signature: None,
            sequence: 0,
        }
    }

    pub fn kind(mut self, kind: MessageKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn created_at(mut self, created_at: i64) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn location(mut self, location: Option<GeoLocation>) -> Self {
        self.location = location;
        self
    }

    pub fn signature(mut self, signature: Option<String>) -> Self {
        self.signature = signature;
        self
    }

    pub fn sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn build(self) -> Message {
        Message {
            id: self.id,
            kind: self.kind,
            author_id: self.author_id,
            content: self.content,
            created_at: self.created_at,
            location: self.location,
            signature: self.signature,
            sequence: self.sequence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let msg = MessageBuilder::new("m1", "alice").build();
        assert_eq!(msg.kind, MessageKind::Public);
        assert!(msg.content.is_empty());
        assert_eq!(msg.location, None);
        assert_eq!(msg.sequence, 0);
    }

    #[test]
    fn test_serializes_camel_case() {
        let msg = MessageBuilder::new("m1", "alice")
            .content("ping")
            .created_at(100)
            .sequence(1)
            .build();
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["authorId"], "alice");
        assert_eq!(json["createdAt"], 100);
        assert_eq!(json["kind"], "public");
    }

    #[test]
    fn test_accepts_legacy_field_names() {
        let json = r#"{
            "id": "msg_1",
            "type": "location",
            "author": "drone-7",
            "content": "",
            "timestamp": 1700000000000,
            "location": {"lat": 1.0, "lng": 2.0},
            "signature": "sig",
            "sequence": 4
        }"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.kind, MessageKind::Location);
        assert_eq!(msg.author_id.as_str(), "drone-7");
        assert_eq!(msg.created_at, 1_700_000_000_000);
        assert_eq!(msg.location, Some(GeoLocation::new(1.0, 2.0)));
    }
}
