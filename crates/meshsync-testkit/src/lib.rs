//! # Meshsync Testkit
//!
//! Testing utilities for meshsync.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: a controllable clock, deterministic message IDs, a failing
//!   store and a ready-to-use [`TestNode`]
//! - **Generators**: Proptest strategies for messages and peers
//! - **Tracing**: one-call subscriber setup for test output
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use meshsync_testkit::generators::message_batch;
//!
//! proptest! {
//!     #[test]
//!     fn digest_ignores_order(batch in message_batch(20)) {
//!         // ...
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use meshsync_testkit::{init_tracing, join_request, TestNode};
//!
//! async fn example() {
//!     init_tracing();
//!     let t = TestNode::start("node-1").await;
//!     t.clock.set(100);
//!     t.node.join(join_request("a")).await;
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod tracing_config;

pub use fixtures::{
    join_request, message, publish_request, FailingStore, FixedIds, ManualClock, SequenceIds,
    TestNode,
};
pub use generators::{message_batch, peer, MessageParams};
pub use tracing_config::{init_tracing, init_tracing_with_filter};
