//! SnapshotStore trait: the abstract interface for state persistence.

use async_trait::async_trait;
use meshsync_core::PersistedState;

use crate::error::Result;

/// Async interface for wholesale snapshot persistence.
///
/// # Design Notes
///
/// - **Wholesale**: `save` replaces the previous snapshot entirely.
/// - **Absence is not an error**: `load` returns `Ok(None)` when nothing has
///   been saved yet.
/// - **No retries**: a failed `save` is reported to the caller, which decides
///   whether to try again on its next cycle.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Read the last saved snapshot, if any.
    async fn load(&self) -> Result<Option<PersistedState>>;

    /// Replace the saved snapshot.
    async fn save(&self, state: &PersistedState) -> Result<()>;
}

#[async_trait]
impl<S: SnapshotStore + ?Sized> SnapshotStore for std::sync::Arc<S> {
    async fn load(&self) -> Result<Option<PersistedState>> {
        (**self).load().await
    }

    async fn save(&self, state: &PersistedState) -> Result<()> {
        (**self).save(state).await
    }
}
