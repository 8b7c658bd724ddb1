//! # Meshsync Core
//!
//! Pure primitives for the gossip mesh: messages, peers, topics, the
//! last-write-wins merge rule and the state digest.
//!
//! This crate contains no I/O, no storage, no networking. It is pure
//! computation over the replicated data model.
//!
//! ## Key Types
//!
//! - [`Message`] - A replicated chat/location record, keyed by [`MessageId`]
//! - [`Peer`] - A roster entry, keyed by [`PeerId`]
//! - [`StateDigest`] - Binary hash-tree root over the message set
//! - [`PersistedState`] - The wholesale snapshot layout written to disk
//!
//! ## Merge Rule
//!
//! Messages merge at whole-record granularity: the record with the strictly
//! greater `created_at` wins, ties keep the local copy. See [`crdt`].
//!
//! Clock skew between nodes can make an older edit win if its clock runs
//! fast. That is a property of LWW and is kept as-is.

pub mod canonical;
pub mod crdt;
pub mod digest;
pub mod error;
pub mod message;
pub mod peer;
pub mod snapshot;
pub mod topic;
pub mod types;

pub use canonical::canonical_message_bytes;
pub use crdt::{merge, merge_all, merge_into, MergeOutcome};
pub use digest::{compute_digest, leaf_hash, StateDigest};
pub use error::{CoreError, Result};
pub use message::{Message, MessageBuilder, MessageKind};
pub use peer::{DeviceClass, Peer};
pub use snapshot::PersistedState;
pub use topic::{TopicEntry, LOCATIONS, MESSAGES, PRESENCE, WELL_KNOWN_TOPICS};
pub use types::{GeoLocation, MessageId, PeerId};
