//! # Meshsync Sync
//!
//! Gossip state, fanout and the coordinator that peers talk to.
//!
//! ## Overview
//!
//! Exchange is always peer to coordinator, never peer to peer. A peer joins,
//! publishes messages, and periodically pushes everything it holds in a
//! `sync`; the coordinator merges with last-write-wins and answers with
//! everything it now holds. Events that arrive from elsewhere in the mesh
//! come in through `relay`.
//!
//! ## Key Properties
//!
//! - **Atomic**: each operation commits fully under one lock or not at all
//! - **Convergent**: LWW merge per message ID, independent of arrival order
//! - **Best-effort fanout**: delivery happens after commit and may fail per peer
//!
//! ## Usage
//!
//! ```rust,no_run
//! use meshsync_sync::{
//!     Coordinator, CoordinatorConfig, GossipState, JoinRequest, LoggingTransport,
//!     PublishRequest, SyncRequest,
//! };
//! use meshsync_core::{DeviceClass, MessageKind, PeerId};
//!
//! async fn example() -> meshsync_sync::Result<()> {
//!     let coord = Coordinator::new(GossipState::new(), LoggingTransport, CoordinatorConfig::default());
//!
//!     coord.join(JoinRequest {
//!         peer_id: PeerId::from("drone-7"),
//!         display_name: "Scout".into(),
//!         device_class: DeviceClass::Drone,
//!         location: None,
//!         public_key: None,
//!     }).await;
//!
//!     coord.publish(PublishRequest {
//!         author_id: PeerId::from("drone-7"),
//!         kind: MessageKind::Public,
//!         content: "ping".into(),
//!         location: None,
//!         signature: None,
//!     }).await;
//!
//!     let merged = coord.sync(SyncRequest { peer_id: PeerId::from("drone-7"), messages: vec![] }).await?;
//!     println!("{} messages", merged.messages.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Message Flow
//!
//! ```text
//! Peer                              Coordinator
//!   |-------- join ------------------->|  (announce to presence)
//!   |<------- snapshot ----------------|
//!   |-------- publish ---------------->|  (fan out to messages)
//!   |<------- accepted | duplicate ----|
//!   |-------- sync(all I have) ------->|
//!   |<------- all it has now ----------|
//! ```

pub mod clock;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod fanout;
pub mod ids;
pub mod messages;
pub mod registry;
pub mod state;
pub mod transport;

pub use clock::{Clock, SystemClock};
pub use config::CoordinatorConfig;
pub use coordinator::Coordinator;
pub use error::{Result, SyncError};
pub use fanout::{Broadcaster, DeliveryReport, FanoutPlan};
pub use ids::{MessageIdSource, RandomMessageIds};
pub use messages::{
    JoinRequest, LocationUpdate, NodeInfo, PeerDeparture, PublishRequest, PublishResponse,
    PublishStatus, RelayAck, RelayEvent, RelayStatus, StateSnapshot, SyncRequest, SyncResponse,
};
pub use registry::PeerRegistry;
pub use state::{GossipState, Origination};
pub use transport::{
    memory::{Inbox, MemoryNetwork, MemoryTransport},
    LoggingTransport, Transport,
};
