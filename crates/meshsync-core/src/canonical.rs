//! Canonical CBOR encoding of messages for hashing.
//!
//! The digest must be reproducible across nodes, so every message is encoded
//! the same way regardless of how it was decoded:
//! - Integer map keys, written in ascending order
//! - Integers use the smallest valid encoding
//! - Definite lengths only
//! - Floats always use the 8-byte form
//! - Absent optional fields are written as `null`, never omitted

use ciborium::value::{Integer, Value};

use crate::message::Message;
use crate::types::GeoLocation;

/// Message field keys.
mod keys {
    pub const ID: u64 = 0;
    pub const KIND: u64 = 1;
    pub const AUTHOR: u64 = 2;
    pub const CONTENT: u64 = 3;
    pub const CREATED_AT: u64 = 4;
    pub const LOCATION: u64 = 5;
    pub const SIGNATURE: u64 = 6;
    pub const SEQUENCE: u64 = 7;
}

/// Location field keys.
mod location_keys {
    pub const LAT: u64 = 0;
    pub const LNG: u64 = 1;
    pub const ALT: u64 = 2;
    pub const ACCURACY: u64 = 3;
}

/// Encode a message to canonical bytes.
pub fn canonical_message_bytes(message: &Message) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_value_to(&mut buf, &message_to_cbor_value(message));
    buf
}

fn key(k: u64) -> Value {
    Value::Integer(k.into())
}

fn optional_text(s: &Option<String>) -> Value {
    match s {
        Some(s) => Value::Text(s.clone()),
        None => Value::Null,
    }
}

fn optional_float(f: Option<f64>) -> Value {
    match f {
        Some(f) => Value::Float(f),
        None => Value::Null,
    }
}

fn location_to_cbor_value(location: &GeoLocation) -> Value {
    Value::Map(vec![
        (key(location_keys::LAT), Value::Float(location.lat)),
        (key(location_keys::LNG), Value::Float(location.lng)),
        (key(location_keys::ALT), optional_float(location.alt)),
        (key(location_keys::ACCURACY), optional_float(location.accuracy)),
    ])
}

fn message_to_cbor_value(message: &Message) -> Value {
    let location = match &message.location {
        Some(loc) => location_to_cbor_value(loc),
        None => Value::Null,
    };

    Value::Map(vec![
        (key(keys::ID), Value::Text(message.id.as_str().to_owned())),
        (key(keys::KIND), Value::Text(message.kind.as_str().to_owned())),
        (key(keys::AUTHOR), Value::Text(message.author_id.as_str().to_owned())),
        (key(keys::CONTENT), Value::Text(message.content.clone())),
        (key(keys::CREATED_AT), Value::Integer(message.created_at.into())),
        (key(keys::LOCATION), location),
        (key(keys::SIGNATURE), optional_text(&message.signature)),
        (key(keys::SEQUENCE), Value::Integer(message.sequence.into())),
    ])
}

/// Recursively encode a CBOR value.
///
/// Only the shapes produced by [`message_to_cbor_value`] are reachable; maps
/// are written in the order given, which is ascending key order.
fn encode_value_to(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Integer(i) => encode_integer(buf, *i),
        Value::Text(s) => {
            encode_uint(buf, 3, s.len() as u64);
            buf.extend_from_slice(s.as_bytes());
        }
        Value::Float(f) => {
            buf.push(0xfb);
            buf.extend_from_slice(&f.to_bits().to_be_bytes());
        }
        Value::Map(entries) => {
            encode_uint(buf, 5, entries.len() as u64);
            for (k, v) in entries {
                encode_value_to(buf, k);
                encode_value_to(buf, v);
            }
        }
        Value::Null => buf.push(0xf6),
        Value::Bool(b) => buf.push(if *b { 0xf5 } else { 0xf4 }),
        Value::Bytes(b) => {
            encode_uint(buf, 2, b.len() as u64);
            buf.extend_from_slice(b);
        }
        Value::Array(items) => {
            encode_uint(buf, 4, items.len() as u64);
            for item in items {
                encode_value_to(buf, item);
            }
        }
        // Tags never appear in a message encoding.
        _ => buf.push(0xf7),
    }
}

fn encode_integer(buf: &mut Vec<u8>, i: Integer) {
    let n: i128 = i.into();
    if n >= 0 {
        encode_uint(buf, 0, n as u64);
    } else {
        encode_uint(buf, 1, (-1 - n) as u64);
    }
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}
