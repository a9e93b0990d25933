use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use hexhold_protocol::{ImprovementKind, TileCoord};

use crate::terrain::{quantize_height, TerrainLevel};

/// An improvement built on a tile, with improvement-specific metadata
/// (e.g. `"strips": 3` for a farm).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Improvement {
    pub kind: ImprovementKind,
    #[serde(default)]
    pub data: BTreeMap<String, i32>,
}

/// One cell of the lattice. Terrain level and cost are a deterministic
/// function of height, fixed at creation. `city` and `unit` are indices into
/// the owning `WorldState` collections; at most one of each per tile.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tile {
    pub height: f64,
    pub level: TerrainLevel,
    pub city: Option<usize>,
    pub unit: Option<usize>,
    pub improvement: Option<Improvement>,
}

impl Tile {
    fn new(height: f64) -> Self {
        let height = quantize_height(height);
        Self {
            height,
            level: TerrainLevel::from_height(height),
            city: None,
            unit: None,
            improvement: None,
        }
    }
}

/// The hex lattice. Odd rows have `width + 1` columns, even rows `width`;
/// the backing store is dense `height x (width + 1)` with the trailing slot
/// of each even row unused. Tile centers are precomputed at construction and
/// immutable thereafter.
#[derive(Clone, Debug)]
pub struct HexGrid {
    width: u32,
    height: u32,
    radius: f64,
    tiles: Vec<Tile>,
    centers: Vec<(f64, f64)>,
}

impl HexGrid {
    /// Build a grid, sampling `height_at(x, y)` once per existing cell.
    ///
    /// `height_at` must return values in [0, 1].
    pub fn generate(
        width: u32,
        height: u32,
        radius: f64,
        mut height_at: impl FnMut(i32, i32) -> f64,
    ) -> Self {
        let stride = (width + 1) as usize;
        let mut tiles = Vec::with_capacity(height as usize * stride);
        let mut centers = Vec::with_capacity(height as usize * stride);
        for y in 0..height as i32 {
            for x in 0..stride as i32 {
                let coord = TileCoord::new(x, y);
                let exists = coord.is_odd_row() || x < width as i32;
                let h = if exists { height_at(x, y) } else { 0.0 };
                tiles.push(Tile::new(h));
                centers.push(coord.center(radius));
            }
        }
        Self {
            width,
            height,
            radius,
            tiles,
            centers,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Whether `coord` addresses a cell of the irregular lattice: in bounds,
    /// and not the extra trailing column of a short (even) row.
    pub fn cell_exists(&self, coord: TileCoord) -> bool {
        if coord.x < 0 || coord.y < 0 || coord.y >= self.height as i32 {
            return false;
        }
        let row_len = if coord.is_odd_row() {
            self.width as i32 + 1
        } else {
            self.width as i32
        };
        coord.x < row_len
    }

    #[inline]
    fn index_of(&self, coord: TileCoord) -> usize {
        coord.y as usize * (self.width as usize + 1) + coord.x as usize
    }

    pub fn get(&self, coord: TileCoord) -> Option<&Tile> {
        if self.cell_exists(coord) {
            Some(&self.tiles[self.index_of(coord)])
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, coord: TileCoord) -> Option<&mut Tile> {
        if self.cell_exists(coord) {
            let index = self.index_of(coord);
            Some(&mut self.tiles[index])
        } else {
            None
        }
    }

    /// Borrow the tile at `coord`.
    ///
    /// Precondition: `cell_exists(coord)`. Out-of-range coordinates are a
    /// caller bug, checked in debug builds.
    pub fn tile(&self, coord: TileCoord) -> &Tile {
        debug_assert!(self.cell_exists(coord), "tile() outside lattice: {coord:?}");
        &self.tiles[self.index_of(coord)]
    }

    pub fn tile_mut(&mut self, coord: TileCoord) -> &mut Tile {
        debug_assert!(
            self.cell_exists(coord),
            "tile_mut() outside lattice: {coord:?}"
        );
        let index = self.index_of(coord);
        &mut self.tiles[index]
    }

    /// Precomputed center of `coord` in world units.
    ///
    /// Precondition: `cell_exists(coord)`.
    pub fn center(&self, coord: TileCoord) -> (f64, f64) {
        debug_assert!(self.cell_exists(coord));
        self.centers[self.index_of(coord)]
    }

    /// The in-lattice neighbors of `coord`. With `traversable_only`,
    /// untraversable terrain is excluded (pathfinding); without, only the
    /// lattice shape filters (topology queries such as city growth).
    pub fn neighbors(&self, coord: TileCoord, traversable_only: bool) -> Vec<TileCoord> {
        coord
            .neighbors()
            .filter(|&n| self.cell_exists(n))
            .filter(|&n| !traversable_only || self.tiles[self.index_of(n)].level.traversable())
            .collect()
    }

    /// Bitmask of the six directions (bit order: top-left, top-right, left,
    /// right, bottom-left, bottom-right) where the tile's owning city ends,
    /// i.e. the neighbor is off-lattice or belongs to a different city.
    /// Zero for unowned tiles. Consumed by city wall rendering.
    pub fn wall_mask(&self, coord: TileCoord) -> u8 {
        let Some(city) = self.get(coord).and_then(|t| t.city) else {
            return 0;
        };
        let mut mask = 0u8;
        for (bit, neighbor) in coord.neighbors().enumerate() {
            let foreign = match self.get(neighbor) {
                Some(tile) => tile.city != Some(city),
                None => true,
            };
            if foreign {
                mask |= 1 << bit;
            }
        }
        mask
    }

    /// Every existing cell, row-major.
    pub fn coords(&self) -> impl Iterator<Item = TileCoord> + '_ {
        let width = self.width as i32;
        (0..self.height as i32).flat_map(move |y| {
            let row_len = if y.rem_euclid(2) == 1 { width + 1 } else { width };
            (0..row_len).map(move |x| TileCoord::new(x, y))
        })
    }

    /// Clear and rewrite every tile's unit index from an authoritative list
    /// of (coord, unit index) pairs. Used after unit removal compacts the
    /// unit list.
    pub(crate) fn rebind_units(&mut self, occupied: &[(TileCoord, usize)]) {
        for tile in &mut self.tiles {
            tile.unit = None;
        }
        for &(coord, index) in occupied {
            let slot = self.index_of(coord);
            debug_assert!(self.tiles[slot].unit.is_none(), "two units on {coord:?}");
            self.tiles[slot].unit = Some(index);
        }
    }
}
