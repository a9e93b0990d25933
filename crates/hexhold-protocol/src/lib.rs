//! Wire-level types shared by the Hexhold server and clients: hex
//! coordinates, the `Message` vocabulary, world snapshots, and the
//! MessagePack codec.

mod coord;
mod message;
mod snapshot;
mod units;
pub mod wire;

pub use crate::coord::TileCoord;
pub use crate::message::Message;
pub use crate::snapshot::{
    CitySnapshot, ImprovementKind, ImprovementSnapshot, UnitSnapshot, WorldSnapshot,
};
pub use crate::units::{Capability, UnitKind};
pub use crate::wire::{
    deserialize_identity, deserialize_message, deserialize_message_json, deserialize_snapshot,
    hash_bytes_fnv1a64, serialize_identity, serialize_message, serialize_message_json,
    serialize_snapshot, snapshot_hash, WireError,
};
