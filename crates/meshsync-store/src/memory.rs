//! In-memory implementation of the SnapshotStore trait.
//!
//! This is primarily for testing. Snapshots are lost when the store is
//! dropped.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use meshsync_core::PersistedState;

use crate::error::{Result, StoreError};
use crate::traits::SnapshotStore;

/// In-memory snapshot store.
pub struct MemoryStore {
    snapshot: RwLock<Option<PersistedState>>,
    saves: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(None),
            saves: AtomicUsize::new(0),
        }
    }

    /// Create a store that already holds a snapshot.
    pub fn with_snapshot(state: PersistedState) -> Self {
        Self {
            snapshot: RwLock::new(Some(state)),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn load(&self) -> Result<Option<PersistedState>> {
        let guard = self
            .snapshot
            .read()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {}", e)))?;
        Ok(guard.clone())
    }

    async fn save(&self, state: &PersistedState) -> Result<()> {
        let mut guard = self
            .snapshot
            .write()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {}", e)))?;
        *guard = Some(state.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
