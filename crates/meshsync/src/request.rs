//! JSON request handling.
//!
//! An outer transport (HTTP, WebSocket, anything) hands over an operation
//! name and a JSON body and gets a JSON value back. Nothing is mutated if the
//! body cannot be decoded.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use meshsync_store::SnapshotStore;
use meshsync_sync::{JoinRequest, PublishRequest, RelayEvent, SyncRequest, Transport};

use crate::error::{NodeError, Result};
use crate::node::Node;

/// The calls a node serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Join,
    Publish,
    Sync,
    Relay,
    Topics,
    Info,
    Peers,
    Messages,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Join => "join",
            Operation::Publish => "publish",
            Operation::Sync => "sync",
            Operation::Relay => "relay",
            Operation::Topics => "topics",
            Operation::Info => "info",
            Operation::Peers => "peers",
            Operation::Messages => "messages",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = NodeError;

    /// Accepts both the operation names and the legacy endpoint names
    /// (`message` for publish, `gossip` for relay).
    fn from_str(s: &str) -> Result<Self> {
        match s.trim_matches('/') {
            "join" => Ok(Operation::Join),
            "publish" | "message" => Ok(Operation::Publish),
            "sync" => Ok(Operation::Sync),
            "relay" | "gossip" => Ok(Operation::Relay),
            "topics" => Ok(Operation::Topics),
            "info" => Ok(Operation::Info),
            "peers" => Ok(Operation::Peers),
            "messages" => Ok(Operation::Messages),
            other => Err(NodeError::UnknownOperation(other.to_string())),
        }
    }
}

/// Decode `body`, run `op` against `node`, and encode the answer.
///
/// An empty body is read as `{}`.
pub async fn handle_json<S, T>(node: &Node<S, T>, op: Operation, body: &str) -> Result<Value>
where
    S: SnapshotStore + 'static,
    T: Transport + 'static,
{
    let body = if body.trim().is_empty() { "{}" } else { body };

    let response = match op {
        Operation::Join => to_value(node.join(decode::<JoinRequest>(body)?).await)?,
        Operation::Publish => to_value(node.publish(decode::<PublishRequest>(body)?).await)?,
        Operation::Sync => to_value(node.sync(decode::<SyncRequest>(body)?).await?)?,
        Operation::Relay => to_value(node.relay(decode_relay(body)?).await)?,
        Operation::Topics => json!({ "topics": node.topic_query().await }),
        Operation::Info => to_value(node.info().await)?,
        Operation::Peers => json!({ "peers": node.peers().await }),
        Operation::Messages => json!({ "messages": node.messages().await }),
    };
    Ok(response)
}

/// The `{"error": ...}` body for a failed request.
pub fn error_body(error: &NodeError) -> Value {
    json!({ "error": error.to_string() })
}

fn decode<R: DeserializeOwned>(body: &str) -> Result<R> {
    serde_json::from_str(body).map_err(NodeError::malformed)
}

fn to_value<R: serde::Serialize>(response: R) -> Result<Value> {
    serde_json::to_value(response).map_err(|e| NodeError::malformed(format!("encode: {e}")))
}

/// Decode a `{type, data}` gossip envelope.
///
/// Kinds other than the four handled ones become
/// [`RelayEvent::Unrecognized`]. An envelope without `data` is read as if its
/// own fields were the data.
fn decode_relay(body: &str) -> Result<RelayEvent> {
    let mut envelope: Value = serde_json::from_str(body).map_err(NodeError::malformed)?;

    let kind = envelope
        .get("type")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| NodeError::malformed("relay event has no type"))?;

    if !RelayEvent::is_known_kind(&kind) {
        return Ok(RelayEvent::Unrecognized(kind));
    }

    if let Some(object) = envelope.as_object_mut() {
        if !object.contains_key("data") {
            let mut data = object.clone();
            data.remove("type");
            data.remove("topics");
            object.insert("data".into(), Value::Object(data));
        }
    }

    serde_json::from_value(envelope).map_err(NodeError::malformed)
}
