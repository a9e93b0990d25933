use std::cmp::Reverse;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use hexhold_protocol::{hash_bytes_fnv1a64, CitySnapshot, TileCoord};

use crate::grid::HexGrid;
use crate::terrain::TerrainLevel;

/// A city: an ordered, non-empty tile list whose first entry is the
/// immutable center. Tile sets only grow and never overlap across cities.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct City {
    pub owner: String,
    tiles: Vec<TileCoord>,
    pub colors: [[u8; 3]; 2],
    /// Greatest height over all owned tiles; consumed by wall rendering.
    /// Kept current on every tile-set change.
    peak_height: f64,
}

impl City {
    pub fn new(owner: String, center: TileCoord, grid: &HexGrid) -> Self {
        let colors = colors_for(&owner);
        let peak_height = grid.tile(center).height;
        Self {
            owner,
            tiles: vec![center],
            colors,
            peak_height,
        }
    }

    pub fn center(&self) -> TileCoord {
        self.tiles[0]
    }

    pub fn tiles(&self) -> &[TileCoord] {
        &self.tiles
    }

    pub fn owns(&self, coord: TileCoord) -> bool {
        self.tiles.contains(&coord)
    }

    pub fn peak_height(&self) -> f64 {
        self.peak_height
    }

    /// Annex `coord`. The caller marks the grid tile; the city updates its
    /// list and height cache.
    pub fn claim(&mut self, coord: TileCoord, grid: &HexGrid) {
        if self.owns(coord) {
            return;
        }
        self.tiles.push(coord);
        self.peak_height = self.peak_height.max(grid.tile(coord).height);
    }

    /// Pick up to `want` unclaimed tiles to annex: the union of unclaimed
    /// neighbors of every owned tile (traversability ignored), nearest
    /// center first. Best-effort; returns fewer when candidates run out.
    pub fn plan_growth(&self, grid: &HexGrid, want: usize) -> Vec<TileCoord> {
        let radius = grid.radius();
        let center = self.center();

        let mut frontier = BinaryHeap::new();
        let mut seen = Vec::new();
        for &owned in &self.tiles {
            for neighbor in grid.neighbors(owned, false) {
                if grid.tile(neighbor).city.is_some() || seen.contains(&neighbor) {
                    continue;
                }
                seen.push(neighbor);
                frontier.push(Reverse(GrowthCandidate {
                    dist_sq: center.center_distance_sq(neighbor, radius),
                    coord: neighbor,
                }));
            }
        }

        let mut picked = Vec::with_capacity(want);
        while picked.len() < want {
            let Some(Reverse(candidate)) = frontier.pop() else {
                break;
            };
            picked.push(candidate.coord);
        }
        picked
    }

    /// Owned-tile counts per terrain level, indexed by `TerrainLevel::index`.
    /// Raw input for the external per-turn stats calculator.
    pub fn level_counts(&self, grid: &HexGrid) -> [u32; TerrainLevel::COUNT] {
        let mut counts = [0u32; TerrainLevel::COUNT];
        for &coord in &self.tiles {
            counts[grid.tile(coord).level.index()] += 1;
        }
        counts
    }

    pub fn to_snapshot(&self) -> CitySnapshot {
        CitySnapshot {
            owner: self.owner.clone(),
            tiles: self.tiles.clone(),
            colors: self.colors,
        }
    }

    pub fn from_snapshot(snap: &CitySnapshot, grid: &HexGrid) -> Self {
        let peak_height = snap
            .tiles
            .iter()
            .map(|&c| grid.tile(c).height)
            .fold(0.0, f64::max);
        Self {
            owner: snap.owner.clone(),
            tiles: snap.tiles.clone(),
            colors: snap.colors,
            peak_height,
        }
    }
}

/// Two deterministic display colors derived from the owner id.
fn colors_for(owner: &str) -> [[u8; 3]; 2] {
    let hash = hash_bytes_fnv1a64(owner.as_bytes());
    let bytes = hash.to_le_bytes();
    [
        [bytes[0], bytes[1], bytes[2]],
        [bytes[3], bytes[4], bytes[5]],
    ]
}

/// Growth frontier entry ordered by center distance, with the coordinate as
/// a deterministic tie-break.
#[derive(Debug, PartialEq)]
struct GrowthCandidate {
    dist_sq: f64,
    coord: TileCoord,
}

impl Eq for GrowthCandidate {}

impl PartialOrd for GrowthCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GrowthCandidate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.dist_sq
            .total_cmp(&other.dist_sq)
            .then_with(|| self.coord.cmp(&other.coord))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plains(width: u32, height: u32) -> HexGrid {
        HexGrid::generate(width, height, 1.0, |_, _| 0.5)
    }

    #[test]
    fn plan_growth_prefers_nearest() {
        let grid = plains(7, 7);
        let city = City::new("alice".into(), TileCoord::new(3, 3), &grid);
        let picked = city.plan_growth(&grid, 3);
        assert_eq!(picked.len(), 3);
        // All picks are direct neighbors of the center, which are the
        // nearest possible candidates.
        let neighbors = grid.neighbors(TileCoord::new(3, 3), false);
        assert!(picked.iter().all(|c| neighbors.contains(c)));
    }

    #[test]
    fn plan_growth_is_best_effort() {
        // 1x1 grid: the center has no in-lattice neighbors.
        let grid = plains(1, 1);
        let city = City::new("alice".into(), TileCoord::new(0, 0), &grid);
        assert!(city.plan_growth(&grid, 5).is_empty());
    }

    #[test]
    fn plan_growth_skips_claimed_tiles() {
        let mut grid = plains(5, 5);
        let center = TileCoord::new(2, 2);
        let city = City::new("alice".into(), center, &grid);
        // A rival owns every neighbor of the center.
        for n in grid.neighbors(center, false) {
            grid.tile_mut(n).city = Some(7);
        }
        assert!(city.plan_growth(&grid, 2).is_empty());
    }

    #[test]
    fn claim_updates_peak_height() {
        let grid = HexGrid::generate(3, 3, 1.0, |x, _| if x == 2 { 0.9 } else { 0.5 });
        let mut city = City::new("alice".into(), TileCoord::new(1, 1), &grid);
        assert_eq!(city.peak_height(), 0.5);
        city.claim(TileCoord::new(2, 1), &grid);
        assert_eq!(city.peak_height(), 0.9);
    }

    #[test]
    fn colors_are_deterministic_per_owner() {
        let grid = plains(2, 2);
        let a = City::new("alice".into(), TileCoord::new(0, 0), &grid);
        let b = City::new("alice".into(), TileCoord::new(1, 1), &grid);
        assert_eq!(a.colors, b.colors);
    }
}
