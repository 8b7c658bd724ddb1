//! State digest: a binary hash-tree root over the message set.
//!
//! Algorithm:
//! 1. Sort messages ascending by `id`
//! 2. Leaf: `Blake3(canonical_message_bytes(m))`
//! 3. Pair adjacent hashes: `Blake3(left || right)`; an odd trailing hash is
//!    paired with itself
//! 4. Repeat until one hash remains
//!
//! The digest is an opaque fingerprint for "has anything changed". It is
//! exchanged on every sync but never used to compute a partial diff.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::canonical::canonical_message_bytes;
use crate::error::CoreError;
use crate::message::Message;

/// A 32-byte Blake3 root over the message set.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateDigest(pub [u8; 32]);

impl StateDigest {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let bytes = hex::decode(s).map_err(|e| CoreError::InvalidDigest(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CoreError::InvalidDigest("expected 32 bytes".into()))?;
        Ok(Self(arr))
    }

    fn pair(left: &StateDigest, right: &StateDigest) -> StateDigest {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&left.0);
        hasher.update(&right.0);
        StateDigest(*hasher.finalize().as_bytes())
    }
}

impl fmt::Debug for StateDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateDigest({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for StateDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for StateDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for StateDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        StateDigest::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Hash a single message.
pub fn leaf_hash(message: &Message) -> StateDigest {
    StateDigest(*blake3::hash(&canonical_message_bytes(message)).as_bytes())
}

/// Compute the digest of a message set.
///
/// Returns `None` for an empty set. The result does not depend on the order
/// of the input.
pub fn compute_digest<'a, I>(messages: I) -> Option<StateDigest>
where
    I: IntoIterator<Item = &'a Message>,
{
    let mut ordered: Vec<&Message> = messages.into_iter().collect();
    ordered.sort_by(|a, b| a.id.cmp(&b.id));

    let mut level: Vec<StateDigest> = ordered.into_iter().map(leaf_hash).collect();
    if level.is_empty() {
        return None;
    }

    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|chunk| {
                let left = &chunk[0];
                let right = chunk.get(1).unwrap_or(left);
                StateDigest::pair(left, right)
            })
            .collect();
    }

    level.pop()
}
