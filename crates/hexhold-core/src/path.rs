use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use hexhold_protocol::TileCoord;

use crate::grid::HexGrid;

/// A walk from its first tile toward a goal, plus the accumulated traversal
/// cost of the returned prefix. When a movement budget truncates the search
/// result, `tiles` is a strict prefix of the full least-cost path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Path {
    pub tiles: Vec<TileCoord>,
    pub cost: u32,
}

impl Path {
    /// Whether the path actually arrives at `goal`. A partial or unreachable
    /// result means "cannot move further this turn", never an error.
    pub fn reaches(&self, goal: TileCoord) -> bool {
        self.tiles.last() == Some(&goal)
    }
}

impl HexGrid {
    /// Least-cost route from `start` to `goal`, trimmed to `budget` movement
    /// points. Uniform-cost search over traversable neighbors; the cost of a
    /// step is the entered tile's terrain cost.
    ///
    /// The result always begins at `start` (at cost 0, regardless of the
    /// start tile's own cost). If `goal` is unreachable the result is the
    /// single-tile start path; same for `start == goal`.
    ///
    /// Precondition: `start` and `goal` address existing cells. Checked in
    /// debug builds.
    pub fn find_path(&self, start: TileCoord, goal: TileCoord, budget: u32) -> Path {
        debug_assert!(self.cell_exists(start), "path start outside lattice");
        debug_assert!(self.cell_exists(goal), "path goal outside lattice");

        if start == goal {
            return Path {
                tiles: vec![start],
                cost: 0,
            };
        }

        let mut dist: HashMap<TileCoord, u32> = HashMap::new();
        let mut prev: HashMap<TileCoord, TileCoord> = HashMap::new();
        let mut frontier = BinaryHeap::new();

        dist.insert(start, 0);
        frontier.push(Reverse((0u32, start)));

        let mut reached = false;
        while let Some(Reverse((cost, coord))) = frontier.pop() {
            // Lazy deletion: a popped entry is stale if a cheaper route to
            // this coord has been recorded since it was pushed.
            if dist.get(&coord).copied() != Some(cost) {
                continue;
            }
            if coord == goal {
                reached = true;
                break;
            }
            for next in self.neighbors(coord, true) {
                let step = cost + self.tile(next).level.cost();
                if dist.get(&next).is_none_or(|&known| step < known) {
                    dist.insert(next, step);
                    prev.insert(next, coord);
                    frontier.push(Reverse((step, next)));
                }
            }
        }

        if !reached {
            return Path {
                tiles: vec![start],
                cost: 0,
            };
        }

        // Walk predecessor links goal -> start, then reverse.
        let mut tiles = vec![goal];
        let mut cursor = goal;
        while let Some(&p) = prev.get(&cursor) {
            tiles.push(p);
            cursor = p;
        }
        tiles.reverse();

        self.trim_to_budget(tiles, budget)
    }

    /// Truncate a reconstructed path at the last tile whose cumulative entry
    /// cost stays within `budget`. The start tile is free and always kept.
    fn trim_to_budget(&self, tiles: Vec<TileCoord>, budget: u32) -> Path {
        let mut kept = 1;
        let mut cost = 0u32;
        for &coord in &tiles[1..] {
            let next_cost = cost + self.tile(coord).level.cost();
            if next_cost > budget {
                break;
            }
            cost = next_cost;
            kept += 1;
        }
        let mut tiles = tiles;
        tiles.truncate(kept);
        Path { tiles, cost }
    }
}
