//! JSON file implementation of the SnapshotStore trait.
//!
//! The snapshot is a single pretty-printed JSON document. Writes go to a
//! sibling temp file which is then renamed over the target, so a crash during
//! a write leaves the previous snapshot intact. Every write gets its own temp
//! file, so overlapping saves never share one.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use meshsync_core::PersistedState;

use crate::error::{Result, StoreError};
use crate::traits::SnapshotStore;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// File-backed snapshot store.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Store snapshots at `path`. The file need not exist yet.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        name.push(format!(".{}.{}.tmp", std::process::id(), n));
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SnapshotStore for FileStore {
    async fn load(&self) -> Result<Option<PersistedState>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let state = serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(Some(state))
    }

    async fn save(&self, state: &PersistedState) -> Result<()> {
        let body = serde_json::to_vec_pretty(state)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let temp = self.temp_path();
        tokio::fs::write(&temp, &body).await?;
        if let Err(e) = tokio::fs::rename(&temp, &self.path).await {
            // Do not leave the temp file behind.
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }

        tracing::debug!(path = %self.path.display(), bytes = body.len(), "snapshot written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshsync_core::{MessageBuilder, PeerId, TopicEntry};

    #[tokio::test]
    async fn test_missing_file_is_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("absent.json"));
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("gossip-state.json"));

        let msg = MessageBuilder::new("m1", "p1").content("ping").created_at(7).sequence(1).build();
        let state = PersistedState {
            messages: vec![msg.clone()],
            topics: vec![TopicEntry("messages".into(), vec![PeerId::from("p1")])],
            seen_ids: vec![msg.id.clone()],
            sequence: 1,
            ..Default::default()
        };

        store.save(&state).await.unwrap();
        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded, state);
        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_temp_paths_are_unique() {
        let store = FileStore::new("/var/lib/meshsync/gossip-state.json");
        let a = store.temp_path();
        let b = store.clone().temp_path();
        assert_ne!(a, b);
        assert_eq!(a.parent(), store.path().parent());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_overlapping_saves_never_tear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("gossip-state.json"));

        for round in 0..20u64 {
            let mut tasks = Vec::new();
            for writer in 0..4u64 {
                let store = store.clone();
                tasks.push(tokio::spawn(async move {
                    let ids: Vec<_> = (0..50)
                        .map(|i| meshsync_core::MessageId::new(format!("w{writer}-{i}")))
                        .collect();
                    let state = PersistedState {
                        seen_ids: ids,
                        sequence: round * 10 + writer,
                        ..Default::default()
                    };
                    store.save(&state).await
                }));
            }
            for task in tasks {
                task.await.unwrap().unwrap();
            }

            let loaded = store.load().await.unwrap().unwrap();
            assert_eq!(loaded.seen_ids.len(), 50);
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gossip-state.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(store.load().await, Err(StoreError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("no-such-dir").join("state.json"));
        assert!(matches!(
            store.save(&PersistedState::default()).await,
            Err(StoreError::Io(_))
        ));
    }
}
