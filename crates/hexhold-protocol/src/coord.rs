use serde::{Deserialize, Serialize};

/// Offset coordinates on the hex lattice. Odd rows are one column wider
/// than even rows, so neighbor offsets depend on row parity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

/// Neighbor offsets for even rows: top-left, top-right, left, right,
/// bottom-left, bottom-right.
const EVEN_ROW_OFFSETS: [(i32, i32); 6] = [(0, -1), (1, -1), (-1, 0), (1, 0), (0, 1), (1, 1)];

/// Neighbor offsets for odd rows (the wide rows, shifted left by half a
/// column).
const ODD_ROW_OFFSETS: [(i32, i32); 6] = [(-1, -1), (0, -1), (-1, 0), (1, 0), (-1, 1), (0, 1)];

impl TileCoord {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub const fn is_odd_row(self) -> bool {
        self.y.rem_euclid(2) == 1
    }

    /// The six geometric neighbors, irrespective of grid bounds.
    pub fn neighbors(self) -> impl Iterator<Item = TileCoord> {
        let offsets = if self.is_odd_row() {
            ODD_ROW_OFFSETS
        } else {
            EVEN_ROW_OFFSETS
        };
        offsets
            .into_iter()
            .map(move |(dx, dy)| TileCoord::new(self.x + dx, self.y + dy))
    }

    /// Center of this cell in world units for a given hex radius.
    ///
    /// Horizontal spacing is `sqrt(3) * radius`, vertical spacing is
    /// `1.5 * radius`; odd rows sit half a column to the left.
    pub fn center(self, radius: f64) -> (f64, f64) {
        let horizontal = 3.0_f64.sqrt() * radius;
        let shift = if self.is_odd_row() { horizontal / 2.0 } else { 0.0 };
        (self.x as f64 * horizontal - shift, self.y as f64 * 1.5 * radius)
    }

    /// Squared Euclidean distance between two cell centers.
    pub fn center_distance_sq(self, other: TileCoord, radius: f64) -> f64 {
        let (ax, ay) = self.center(radius);
        let (bx, by) = other.center(radius);
        (ax - bx) * (ax - bx) + (ay - by) * (ay - by)
    }
}
