//! Proptest generators for property-based testing.

use proptest::prelude::*;

use meshsync_core::{
    DeviceClass, GeoLocation, Message, MessageBuilder, MessageId, MessageKind, Peer, PeerId,
};

/// Generate a message ID from a small alphabet, so collisions are common.
pub fn message_id() -> impl Strategy<Value = MessageId> {
    "msg_[a-d]{1,2}".prop_map(MessageId::from)
}

/// Generate a peer ID.
pub fn peer_id() -> impl Strategy<Value = PeerId> {
    "peer_[a-z0-9]{1,6}".prop_map(PeerId::from)
}

/// Generate a reasonable timestamp.
pub fn timestamp() -> impl Strategy<Value = i64> {
    0i64..=1_700_000_000_000i64
}

/// Generate a MessageKind.
pub fn message_kind() -> impl Strategy<Value = MessageKind> {
    prop_oneof![
        Just(MessageKind::Public),
        Just(MessageKind::Private),
        Just(MessageKind::Location),
    ]
}

/// Generate a DeviceClass.
pub fn device_class() -> impl Strategy<Value = DeviceClass> {
    prop_oneof![
        Just(DeviceClass::Phone),
        Just(DeviceClass::Tablet),
        Just(DeviceClass::Laptop),
        Just(DeviceClass::Drone),
    ]
}

/// Generate a position fix.
pub fn geo_location() -> impl Strategy<Value = GeoLocation> {
    (
        -90.0f64..=90.0,
        -180.0f64..=180.0,
        proptest::option::of(0.0f64..=500.0),
        proptest::option::of(0.0f64..=100.0),
    )
        .prop_map(|(lat, lng, alt, accuracy)| GeoLocation {
            lat,
            lng,
            alt,
            accuracy,
        })
}

/// Parameters for generating a message.
#[derive(Debug, Clone)]
pub struct MessageParams {
    pub id: MessageId,
    pub author: PeerId,
    pub kind: MessageKind,
    pub content: String,
    pub created_at: i64,
    pub location: Option<GeoLocation>,
    pub sequence: u64,
}

impl Arbitrary for MessageParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            message_id(),
            peer_id(),
            message_kind(),
            "[ -~]{0,40}",
            timestamp(),
            proptest::option::of(geo_location()),
            1u64..=1000u64,
        )
            .prop_map(
                |(id, author, kind, content, created_at, location, sequence)| MessageParams {
                    id,
                    author,
                    kind,
                    content,
                    created_at,
                    location,
                    sequence,
                },
            )
            .boxed()
    }
}

impl MessageParams {
    pub fn build(&self) -> Message {
        MessageBuilder::new(self.id.clone(), self.author.clone())
            .kind(self.kind)
            .content(self.content.clone())
            .created_at(self.created_at)
            .location(self.location)
            .sequence(self.sequence)
            .build()
    }
}

/// Generate a message.
pub fn message() -> impl Strategy<Value = Message> {
    any::<MessageParams>().prop_map(|p| p.build())
}

/// Generate up to `max_len` messages, possibly sharing IDs.
pub fn message_batch(max_len: usize) -> impl Strategy<Value = Vec<Message>> {
    prop::collection::vec(message(), 0..=max_len)
}

/// Generate a peer.
pub fn peer() -> impl Strategy<Value = Peer> {
    (
        peer_id(),
        "[A-Za-z ]{1,16}",
        device_class(),
        timestamp(),
        proptest::option::of(geo_location()),
    )
        .prop_map(|(id, name, class, joined, location)| {
            let mut peer = Peer::new(id, name, class, joined);
            peer.location = location;
            peer
        })
}
