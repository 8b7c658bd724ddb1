//! Strong type definitions for the mesh.
//!
//! Identifiers are opaque strings wrapped in newtypes so a peer ID can never
//! be passed where a message ID is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque message identifier, assigned by the node that first accepts it.
///
/// Not content-addressed: two different messages may in principle share an ID.
/// Ordering is lexicographic on the underlying string and is the canonical
/// order used by the state digest.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Wrap a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageId({})", self.0)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for MessageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Opaque peer identifier, chosen by the peer itself on join.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(String);

impl PeerId {
    /// Wrap a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PeerId({})", self.0)
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeerId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for PeerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A geographic fix as reported by a device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
    /// Altitude in metres, when the device reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<f64>,
    /// Horizontal accuracy in metres.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
}

impl GeoLocation {
    /// A bare latitude/longitude fix.
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            alt: None,
            accuracy: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let id = MessageId::from("msg_abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"msg_abc\"");

        let peer: PeerId = serde_json::from_str("\"peer-1\"").unwrap();
        assert_eq!(peer.as_str(), "peer-1");
    }

    #[test]
    fn test_message_id_ordering_is_lexicographic() {
        let mut ids = vec![MessageId::from("b"), MessageId::from("a"), MessageId::from("ab")];
        ids.sort();
        let raw: Vec<&str> = ids.iter().map(MessageId::as_str).collect();
        assert_eq!(raw, vec!["a", "ab", "b"]);
    }

    #[test]
    fn test_geo_location_ignores_unknown_fields() {
        let json = r#"{"lat":37.5,"lng":-122.1,"accuracy":12.0,"timestamp":1700000000000}"#;
        let loc: GeoLocation = serde_json::from_str(json).unwrap();
        assert_eq!(loc.lat, 37.5);
        assert_eq!(loc.accuracy, Some(12.0));
        assert_eq!(loc.alt, None);
    }
}
