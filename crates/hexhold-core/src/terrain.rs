use serde::{Deserialize, Serialize};

/// Discrete terrain level, a fixed function of tile height. Computed once at
/// tile creation and never recomputed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TerrainLevel {
    Ocean,
    Beach,
    Plain,
    Mountain,
}

impl TerrainLevel {
    pub const COUNT: usize = 4;

    pub fn from_height(height: f64) -> Self {
        if height < 0.3 {
            TerrainLevel::Ocean
        } else if height < 0.4 {
            TerrainLevel::Beach
        } else if height < 0.8 {
            TerrainLevel::Plain
        } else {
            TerrainLevel::Mountain
        }
    }

    /// Movement points charged to enter a tile of this level.
    #[inline]
    pub const fn cost(self) -> u32 {
        match self {
            TerrainLevel::Ocean | TerrainLevel::Beach | TerrainLevel::Plain => 1,
            TerrainLevel::Mountain => 2,
        }
    }

    /// Ocean is the only untraversable level: mountains are enterable at
    /// cost 2.
    #[inline]
    pub const fn traversable(self) -> bool {
        !matches!(self, TerrainLevel::Ocean)
    }

    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            TerrainLevel::Ocean => "ocean",
            TerrainLevel::Beach => "beach",
            TerrainLevel::Plain => "plain",
            TerrainLevel::Mountain => "mountain",
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            TerrainLevel::Ocean => 0,
            TerrainLevel::Beach => 1,
            TerrainLevel::Plain => 2,
            TerrainLevel::Mountain => 3,
        }
    }
}

/// Heights are stored at fixed four-decimal precision so snapshots round-trip
/// exactly.
pub fn quantize_height(height: f64) -> f64 {
    (height.clamp(0.0, 1.0) * 10_000.0).round() / 10_000.0
}
