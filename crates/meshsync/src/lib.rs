//! # Meshsync
//!
//! A gossip mesh node for field devices: phones, tablets, laptops and drones
//! share chat messages, positions and presence through a coordinator.
//!
//! ## Overview
//!
//! - **Messages** are last-write-wins registers keyed by ID
//! - **Peers** join explicitly and stay until an explicit leave
//! - **Topics** (`messages`, `locations`, `presence`) decide fanout
//! - **Snapshots** of the whole state are written periodically and on shutdown
//!
//! ## Usage
//!
//! ```rust,no_run
//! use meshsync::{handle_json, Node, NodeConfig, Operation};
//! use meshsync::store::FileStore;
//! use meshsync::sync::LoggingTransport;
//!
//! async fn example() -> meshsync::Result<()> {
//!     let store = FileStore::new("gossip-state.json");
//!     let node = Node::start(store, LoggingTransport, NodeConfig::default()).await?;
//!
//!     let snapshot = handle_json(
//!         &node,
//!         Operation::Join,
//!         r#"{"peerId":"drone-7","deviceName":"Scout","deviceType":"drone"}"#,
//!     )
//!     .await?;
//!     println!("{snapshot}");
//!
//!     node.shutdown().await
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `meshsync::core` - Data model, LWW merge, state digest
//! - `meshsync::store` - Snapshot stores (memory, JSON file, SQLite)
//! - `meshsync::sync` - Gossip state, fanout, transport, coordinator

pub mod config;
pub mod error;
pub mod node;
pub mod request;

// Re-export component crates
pub use meshsync_core as core;
pub use meshsync_store as store;
pub use meshsync_sync as sync;

// Re-export main types for convenience
pub use config::NodeConfig;
pub use error::{NodeError, Result};
pub use node::{Node, NodeBuilder};
pub use request::{error_body, handle_json, Operation};

// Re-export commonly used types
pub use meshsync_core::{GeoLocation, Message, MessageId, MessageKind, Peer, PeerId, StateDigest};
pub use meshsync_sync::{
    Coordinator, CoordinatorConfig, JoinRequest, PublishRequest, PublishStatus, RelayEvent,
    SyncRequest, Transport,
};
