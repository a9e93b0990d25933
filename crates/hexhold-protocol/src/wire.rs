use rmp_serde::{decode, encode};
use thiserror::Error;

use crate::{Message, WorldSnapshot};

#[derive(Debug, Error)]
pub enum WireError {
    #[error("encode error: {0}")]
    Encode(#[from] encode::Error),
    #[error("decode error: {0}")]
    Decode(#[from] decode::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn serialize_message(msg: &Message) -> Result<Vec<u8>, WireError> {
    Ok(encode::to_vec_named(msg)?)
}

pub fn deserialize_message(bytes: &[u8]) -> Result<Message, WireError> {
    Ok(decode::from_slice(bytes)?)
}

/// The identity handshake is a bare string frame, sent before any `Message`.
pub fn serialize_identity(id: &str) -> Result<Vec<u8>, WireError> {
    Ok(encode::to_vec(id)?)
}

pub fn deserialize_identity(bytes: &[u8]) -> Result<String, WireError> {
    Ok(decode::from_slice(bytes)?)
}

pub fn serialize_snapshot(snapshot: &WorldSnapshot) -> Result<Vec<u8>, WireError> {
    Ok(encode::to_vec_named(snapshot)?)
}

pub fn deserialize_snapshot(bytes: &[u8]) -> Result<WorldSnapshot, WireError> {
    Ok(decode::from_slice(bytes)?)
}

pub fn serialize_message_json(msg: &Message) -> Result<String, WireError> {
    Ok(serde_json::to_string(msg)?)
}

pub fn deserialize_message_json(json: &str) -> Result<Message, WireError> {
    Ok(serde_json::from_str(json)?)
}

/// Deterministic snapshot hash for convergence checks.
///
/// Hashes the MessagePack-serialized snapshot using FNV-1a 64-bit.
pub fn snapshot_hash(snapshot: &WorldSnapshot) -> Result<u64, WireError> {
    let bytes = serialize_snapshot(snapshot)?;
    Ok(hash_bytes_fnv1a64(&bytes))
}

/// Deterministic, stable 64-bit hash for raw bytes (FNV-1a).
pub fn hash_bytes_fnv1a64(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    let mut hash = OFFSET_BASIS;
    for &byte in bytes {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}
