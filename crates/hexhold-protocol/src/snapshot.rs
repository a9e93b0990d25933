use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{TileCoord, UnitKind};

/// Full world state for initial sync, resync, and persistence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub players: Vec<String>,
    /// Row-major terrain heights, `grid height` rows of `width + 1` entries
    /// (the widest row). Slots outside the irregular lattice hold 0.0.
    pub heights: Vec<Vec<f64>>,
    pub hex_radius: f64,
    pub cities: Vec<CitySnapshot>,
    pub units: Vec<UnitSnapshot>,
    #[serde(default)]
    pub improvements: Vec<ImprovementSnapshot>,
}

/// A city reduced to its defining coordinates; the first tile is the center.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CitySnapshot {
    pub owner: String,
    pub tiles: Vec<TileCoord>,
    pub colors: [[u8; 3]; 2],
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    pub owner: String,
    pub kind: UnitKind,
    pub at: TileCoord,
    pub moves_left: u32,
    pub health: i32,
}

/// Sparse per-tile improvement record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImprovementSnapshot {
    pub at: TileCoord,
    pub kind: ImprovementKind,
    /// Improvement-specific metadata, e.g. `"strips": 3` for a farm.
    #[serde(default)]
    pub data: BTreeMap<String, i32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImprovementKind {
    Farm,
    Mine,
    Road,
}
