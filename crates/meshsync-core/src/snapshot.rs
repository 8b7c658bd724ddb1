//! Wholesale snapshot layout.
//!
//! A snapshot is written and read in one piece: there is no incremental log.

use serde::{Deserialize, Serialize};

use crate::digest::StateDigest;
use crate::error::{CoreError, Result};
use crate::message::Message;
use crate::peer::Peer;
use crate::topic::TopicEntry;
use crate::types::MessageId;

/// Persisted form of a node's gossip state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub peers: Vec<Peer>,
    #[serde(default)]
    pub topics: Vec<TopicEntry>,
    #[serde(default, alias = "messageIds")]
    pub seen_ids: Vec<MessageId>,
    #[serde(default)]
    pub sequence: u64,
    /// Advisory only; recomputed from `messages` on load.
    #[serde(default, alias = "merkleRoot")]
    pub digest: Option<StateDigest>,
    #[serde(default, alias = "lastSync")]
    pub last_synced_at: Option<i64>,
}

impl PersistedState {
    /// Encode to CBOR.
    pub fn to_cbor(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf).map_err(|e| CoreError::EncodingError(e.to_string()))?;
        Ok(buf)
    }

    /// Decode from CBOR.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self> {
        ciborium::from_reader(bytes).map_err(|e| CoreError::DecodingError(e.to_string()))
    }
}
