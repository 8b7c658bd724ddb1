//! SQLite implementation of the SnapshotStore trait.
//!
//! The snapshot is stored as one CBOR blob in a single-row table, alongside a
//! few counters for operators poking at the database by hand. Blocking SQLite
//! calls run on tokio's blocking pool.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use meshsync_core::PersistedState;

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::SnapshotStore;

/// SQLite-based snapshot store.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|e| StoreError::Unavailable(format!("mutex poisoned: {}", e)))?;
            f(&mut guard)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("blocking task failed: {}", e)))?
    }
}

#[async_trait]
impl SnapshotStore for SqliteStore {
    async fn load(&self) -> Result<Option<PersistedState>> {
        let body: Option<Vec<u8>> = self
            .with_conn(|conn| {
                Ok(conn
                    .query_row("SELECT body FROM snapshots WHERE slot = 0", [], |row| row.get(0))
                    .optional()?)
            })
            .await?;

        match body {
            Some(bytes) => Ok(Some(PersistedState::from_cbor(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, state: &PersistedState) -> Result<()> {
        let body = state.to_cbor()?;
        let message_count = state.messages.len() as i64;
        let peer_count = state.peers.len() as i64;
        let saved_at = migration::now_millis();

        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO snapshots (slot, body, message_count, peer_count, saved_at)
                 VALUES (0, ?1, ?2, ?3, ?4)
                 ON CONFLICT(slot) DO UPDATE SET
                    body = excluded.body,
                    message_count = excluded.message_count,
                    peer_count = excluded.peer_count,
                    saved_at = excluded.saved_at",
                params![body, message_count, peer_count, saved_at],
            )?;
            Ok(())
        })
        .await
    }
}
