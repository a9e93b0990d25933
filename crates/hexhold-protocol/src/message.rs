use serde::{Deserialize, Serialize};

use crate::{TileCoord, UnitKind, WorldSnapshot};

/// One atomic game-state mutation, exchanged over the transport. The server
/// applies a message to its authoritative `WorldState` and relays it; every
/// replica applying the same messages in the same order converges.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    /// A new player has entered the game.
    PlayerJoin { id: String },
    /// Found a city at `at`, owned by `owner`.
    CityCreate { owner: String, at: TileCoord },
    /// Grow the city whose center is `center` to include exactly `tiles`.
    CityGrow {
        center: TileCoord,
        tiles: Vec<TileCoord>,
    },
    /// Create a unit of `kind` at `at`, owned by `owner`.
    UnitCreate {
        owner: String,
        at: TileCoord,
        kind: UnitKind,
    },
    /// Move the unit standing on `from` to `to`, spending `used_points`
    /// movement points.
    UnitMove {
        from: TileCoord,
        to: TileCoord,
        used_points: u32,
    },
    /// Remove the unit standing on `at`, if any.
    UnitDelete { at: TileCoord },
    /// Client signal: `id` sets or retracts its end-of-turn readiness.
    Ready { id: String, ready: bool },
    /// Server broadcast: the turn rolled over. Refills movement points and
    /// clears the ready map.
    TurnEnded,
    /// Full-state transfer: handshake acknowledgement and resync.
    State { snapshot: WorldSnapshot },
}
