//! # Meshsync Store
//!
//! Snapshot persistence for the gossip state. A snapshot is written and read
//! wholesale behind the [`SnapshotStore`] trait.
//!
//! ## Backends
//!
//! - [`FileStore`] - Pretty-printed JSON document, replaced atomically via rename
//! - [`SqliteStore`] - Single-row CBOR blob in SQLite with versioned migrations
//! - [`MemoryStore`] - In-memory, for tests
//!
//! ## Usage
//!
//! ```rust,no_run
//! use meshsync_store::{FileStore, SnapshotStore};
//!
//! async fn example() {
//!     let store = FileStore::new("gossip-state.json");
//!
//!     // A missing file is not an error: the node starts empty.
//!     if let Some(state) = store.load().await.unwrap() {
//!         println!("restored {} messages", state.messages.len());
//!     }
//! }
//! ```

pub mod error;
pub mod file;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::SnapshotStore;
