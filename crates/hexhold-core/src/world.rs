use std::collections::HashMap;

use thiserror::Error;

use hexhold_protocol::{
    ImprovementSnapshot, Message, TileCoord, UnitKind, WorldSnapshot,
};

use crate::city::City;
use crate::grid::{HexGrid, Improvement};
use crate::mapgen::HeightField;
use crate::unit::Unit;

/// What a caller should re-render after applying one message.
///
/// `NoChange` means the message mutated nothing visual; `RecomputeAll`
/// signals a global recompute; `Tiles` names exactly the changed tiles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    NoChange,
    RecomputeAll,
    Tiles(Vec<TileCoord>),
}

/// A message that breaks a game invariant. The server validates before
/// applying and drops violators instead of corrupting replicas.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProtocolViolation {
    #[error("coordinate {0:?} is outside the lattice")]
    OutsideLattice(TileCoord),
    #[error("tile {0:?} is already occupied")]
    TileOccupied(TileCoord),
    #[error("no city centered at {0:?}")]
    UnknownCity(TileCoord),
    #[error("no unit at {0:?}")]
    NoUnitAt(TileCoord),
    #[error("move spends {spent} points but only {left} remain")]
    InsufficientMovement { spent: u32, left: u32 },
    #[error("destination {0:?} is untraversable")]
    Untraversable(TileCoord),
}

#[derive(Debug, Error)]
pub enum RestoreError {
    #[error("snapshot has no terrain rows")]
    EmptyTerrain,
    #[error("terrain rows have inconsistent widths")]
    RaggedTerrain,
    #[error("snapshot references {0:?} outside the lattice")]
    TileOutOfRange(TileCoord),
    #[error("snapshot claims {0:?} twice")]
    TileContested(TileCoord),
}

/// Per-player raw counts for the external stats calculator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlayerOverview {
    pub cities: usize,
    pub units: usize,
    pub tiles_owned: usize,
}

/// The authoritative game aggregate and the unit of replication. Message
/// application is the only mutator; replicas applying the same messages in
/// the same order converge.
#[derive(Clone, Debug)]
pub struct WorldState {
    grid: HexGrid,
    cities: Vec<City>,
    units: Vec<Unit>,
    players: Vec<String>,
    /// Server-only: which players have finished the current turn. Absent
    /// entries count as not ready.
    ready: HashMap<String, bool>,
}

impl WorldState {
    /// Fresh world with procedurally seeded terrain.
    pub fn generate(width: u32, height: u32, radius: f64, seed: u64) -> Self {
        let field = HeightField::new(seed, width + 1, height);
        Self::with_height_fn(width, height, radius, |x, y| field.height_at(x, y))
    }

    /// Fresh world with terrain from an arbitrary height collaborator.
    pub fn with_height_fn(
        width: u32,
        height: u32,
        radius: f64,
        height_at: impl FnMut(i32, i32) -> f64,
    ) -> Self {
        Self {
            grid: HexGrid::generate(width, height, radius, height_at),
            cities: Vec::new(),
            units: Vec::new(),
            players: Vec::new(),
            ready: HashMap::new(),
        }
    }

    /// Rebuild a world from a snapshot, with grid dimensions inferred from
    /// the terrain matrix shape.
    pub fn restore(snapshot: &WorldSnapshot) -> Result<Self, RestoreError> {
        let rows = &snapshot.heights;
        if rows.is_empty() || rows[0].is_empty() {
            return Err(RestoreError::EmptyTerrain);
        }
        let stride = rows[0].len();
        if rows.iter().any(|r| r.len() != stride) {
            return Err(RestoreError::RaggedTerrain);
        }
        let width = (stride - 1) as u32;
        let height = rows.len() as u32;

        let mut grid = HexGrid::generate(width, height, snapshot.hex_radius, |x, y| {
            rows[y as usize][x as usize]
        });

        let mut cities = Vec::with_capacity(snapshot.cities.len());
        for city_snap in &snapshot.cities {
            let index = cities.len();
            for &coord in &city_snap.tiles {
                let tile = grid
                    .get_mut(coord)
                    .ok_or(RestoreError::TileOutOfRange(coord))?;
                if tile.city.is_some() {
                    return Err(RestoreError::TileContested(coord));
                }
                tile.city = Some(index);
            }
            cities.push(City::from_snapshot(city_snap, &grid));
        }

        let mut units = Vec::with_capacity(snapshot.units.len());
        for unit_snap in &snapshot.units {
            let index = units.len();
            let tile = grid
                .get_mut(unit_snap.at)
                .ok_or(RestoreError::TileOutOfRange(unit_snap.at))?;
            if tile.unit.is_some() {
                return Err(RestoreError::TileContested(unit_snap.at));
            }
            tile.unit = Some(index);
            units.push(Unit::from_snapshot(unit_snap));
        }

        for imp in &snapshot.improvements {
            let tile = grid
                .get_mut(imp.at)
                .ok_or(RestoreError::TileOutOfRange(imp.at))?;
            tile.improvement = Some(Improvement {
                kind: imp.kind,
                data: imp.data.clone(),
            });
        }

        Ok(Self {
            grid,
            cities,
            units,
            players: snapshot.players.clone(),
            ready: HashMap::new(),
        })
    }

    /// Transfer-friendly snapshot. Round-tripping through `restore`
    /// reproduces an equivalent grid, city set, and unit set.
    pub fn snapshot(&self) -> WorldSnapshot {
        let width = self.grid.width() as i32;
        let heights = (0..self.grid.height() as i32)
            .map(|y| {
                (0..=width)
                    .map(|x| {
                        let coord = TileCoord::new(x, y);
                        if self.grid.cell_exists(coord) {
                            self.grid.tile(coord).height
                        } else {
                            0.0
                        }
                    })
                    .collect()
            })
            .collect();

        let improvements = self
            .grid
            .coords()
            .filter_map(|coord| {
                self.grid.tile(coord).improvement.as_ref().map(|imp| {
                    ImprovementSnapshot {
                        at: coord,
                        kind: imp.kind,
                        data: imp.data.clone(),
                    }
                })
            })
            .collect();

        WorldSnapshot {
            players: self.players.clone(),
            heights,
            hex_radius: self.grid.radius(),
            cities: self.cities.iter().map(City::to_snapshot).collect(),
            units: self.units.iter().map(Unit::to_snapshot).collect(),
            improvements,
        }
    }

    pub fn grid(&self) -> &HexGrid {
        &self.grid
    }

    pub fn players(&self) -> &[String] {
        &self.players
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn unit_at(&self, coord: TileCoord) -> Option<&Unit> {
        let index = self.grid.get(coord)?.unit?;
        Some(&self.units[index])
    }

    pub fn city_at(&self, coord: TileCoord) -> Option<&City> {
        let index = self.grid.get(coord)?.city?;
        Some(&self.cities[index])
    }

    pub fn set_improvement(&mut self, coord: TileCoord, improvement: Option<Improvement>) {
        if let Some(tile) = self.grid.get_mut(coord) {
            tile.improvement = improvement;
        }
    }

    /// Turn-advance predicate: every known player has a true ready flag.
    pub fn all_players_ready(&self) -> bool {
        !self.players.is_empty()
            && self
                .players
                .iter()
                .all(|p| self.ready.get(p).copied().unwrap_or(false))
    }

    /// Raw counts for the external stats calculator.
    pub fn player_overview(&self, id: &str) -> PlayerOverview {
        PlayerOverview {
            cities: self.cities.iter().filter(|c| c.owner == id).count(),
            units: self.units.iter().filter(|u| u.owner == id).count(),
            tiles_owned: self
                .cities
                .iter()
                .filter(|c| c.owner == id)
                .map(|c| c.tiles().len())
                .sum(),
        }
    }

    /// Fixed spawn anchor for the nth joining player (1-based ordinal).
    pub fn starting_anchor(&self, ordinal: usize) -> TileCoord {
        let w = self.grid.width() as i32;
        let h = self.grid.height() as i32;
        match ordinal {
            1 => TileCoord::new(1, 1),
            2 => TileCoord::new(w - 3, h - 3),
            3 => TileCoord::new(w - 3, 1),
            4 => TileCoord::new(1, h - 3),
            _ => TileCoord::new(w / 2, h / 2),
        }
    }

    /// The two unit-create messages spawning `id`'s starting units: a
    /// settler at the anchor and a melee unit one column to its right.
    /// Call after the player's join has been applied.
    pub fn starting_unit_messages(&self, id: &str) -> Vec<Message> {
        let ordinal = self
            .players
            .iter()
            .position(|p| p == id)
            .map(|i| i + 1)
            .unwrap_or(self.players.len() + 1);
        let anchor = self.starting_anchor(ordinal);
        vec![
            Message::UnitCreate {
                owner: id.to_string(),
                at: anchor,
                kind: UnitKind::Settler,
            },
            Message::UnitCreate {
                owner: id.to_string(),
                at: TileCoord::new(anchor.x + 1, anchor.y),
                kind: UnitKind::Warrior,
            },
        ]
    }

    /// Plan a growth message for the city centered at `center`, annexing up
    /// to `want` tiles. `None` when no such city exists or nothing can be
    /// annexed.
    pub fn plan_city_growth(&self, center: TileCoord, want: usize) -> Option<Message> {
        let city = self.cities.iter().find(|c| c.center() == center)?;
        let tiles = city.plan_growth(&self.grid, want);
        if tiles.is_empty() {
            return None;
        }
        Some(Message::CityGrow { center, tiles })
    }

    /// Reject messages that would break game invariants. The hardened
    /// server-side gate: violators are dropped before application.
    pub fn validate_message(&self, msg: &Message) -> Result<(), ProtocolViolation> {
        match msg {
            Message::CityCreate { at, .. } => {
                let tile = self
                    .grid
                    .get(*at)
                    .ok_or(ProtocolViolation::OutsideLattice(*at))?;
                if tile.city.is_some() {
                    return Err(ProtocolViolation::TileOccupied(*at));
                }
                Ok(())
            }
            Message::CityGrow { center, tiles } => {
                if !self.cities.iter().any(|c| c.center() == *center) {
                    return Err(ProtocolViolation::UnknownCity(*center));
                }
                for &coord in tiles {
                    let tile = self
                        .grid
                        .get(coord)
                        .ok_or(ProtocolViolation::OutsideLattice(coord))?;
                    if tile.city.is_some() {
                        return Err(ProtocolViolation::TileOccupied(coord));
                    }
                }
                Ok(())
            }
            Message::UnitCreate { at, .. } => {
                let tile = self
                    .grid
                    .get(*at)
                    .ok_or(ProtocolViolation::OutsideLattice(*at))?;
                if tile.unit.is_some() {
                    return Err(ProtocolViolation::TileOccupied(*at));
                }
                Ok(())
            }
            Message::UnitMove {
                from,
                to,
                used_points,
            } => {
                let from_tile = self
                    .grid
                    .get(*from)
                    .ok_or(ProtocolViolation::OutsideLattice(*from))?;
                let to_tile = self
                    .grid
                    .get(*to)
                    .ok_or(ProtocolViolation::OutsideLattice(*to))?;
                let unit_index = from_tile.unit.ok_or(ProtocolViolation::NoUnitAt(*from))?;
                let unit = &self.units[unit_index];
                if *used_points > unit.moves_left {
                    return Err(ProtocolViolation::InsufficientMovement {
                        spent: *used_points,
                        left: unit.moves_left,
                    });
                }
                if to_tile.unit.is_some() {
                    return Err(ProtocolViolation::TileOccupied(*to));
                }
                if !to_tile.level.traversable() {
                    return Err(ProtocolViolation::Untraversable(*to));
                }
                Ok(())
            }
            // UnitDelete is an idempotent no-op on empty tiles; the rest
            // carry no tile references to validate.
            _ => Ok(()),
        }
    }

    /// The central state-transition function: apply one message and report
    /// which tiles changed.
    pub fn apply_message(&mut self, msg: &Message) -> ApplyOutcome {
        match msg {
            Message::PlayerJoin { id } => {
                if self.players.iter().any(|p| p == id) {
                    return ApplyOutcome::NoChange;
                }
                self.players.push(id.clone());
                ApplyOutcome::NoChange
            }
            Message::CityCreate { owner, at } => {
                self.ensure_player(owner);
                let Some(tile) = self.grid.get(*at) else {
                    debug_assert!(false, "city create outside lattice: {at:?}");
                    return ApplyOutcome::NoChange;
                };
                debug_assert!(tile.city.is_none(), "two cities on {at:?}");
                let index = self.cities.len();
                self.cities.push(City::new(owner.clone(), *at, &self.grid));
                self.grid.tile_mut(*at).city = Some(index);
                ApplyOutcome::RecomputeAll
            }
            Message::CityGrow { center, tiles } => {
                let Some(index) = self.cities.iter().position(|c| c.center() == *center) else {
                    debug_assert!(false, "growth for unknown city at {center:?}");
                    return ApplyOutcome::NoChange;
                };
                for &coord in tiles {
                    if self.grid.get(coord).is_none() {
                        debug_assert!(false, "growth outside lattice: {coord:?}");
                        continue;
                    }
                    if self.grid.tile(coord).city.is_some() {
                        continue;
                    }
                    self.grid.tile_mut(coord).city = Some(index);
                    let grid = &self.grid;
                    self.cities[index].claim(coord, grid);
                }
                ApplyOutcome::RecomputeAll
            }
            Message::UnitCreate { owner, at, kind } => {
                self.ensure_player(owner);
                let Some(tile) = self.grid.get(*at) else {
                    debug_assert!(false, "unit create outside lattice: {at:?}");
                    return ApplyOutcome::NoChange;
                };
                debug_assert!(tile.unit.is_none(), "two units on {at:?}");
                let index = self.units.len();
                self.units.push(Unit::new(owner.clone(), *kind, *at));
                self.grid.tile_mut(*at).unit = Some(index);
                ApplyOutcome::Tiles(vec![*at])
            }
            Message::UnitMove {
                from,
                to,
                used_points,
            } => {
                let Some(index) = self.grid.get(*from).and_then(|t| t.unit) else {
                    debug_assert!(false, "move without unit at {from:?}");
                    return ApplyOutcome::NoChange;
                };
                if self.grid.get(*to).is_none() {
                    debug_assert!(false, "move outside lattice: {to:?}");
                    return ApplyOutcome::NoChange;
                }
                let unit = &mut self.units[index];
                debug_assert!(
                    *used_points <= unit.moves_left,
                    "move overdraws movement: {used_points} > {}",
                    unit.moves_left
                );
                unit.moves_left = unit.moves_left.saturating_sub(*used_points);
                unit.at = *to;
                self.grid.tile_mut(*from).unit = None;
                self.grid.tile_mut(*to).unit = Some(index);
                ApplyOutcome::Tiles(vec![*from, *to])
            }
            Message::UnitDelete { at } => {
                let Some(index) = self.grid.get(*at).and_then(|t| t.unit) else {
                    // No unit here: an idempotent no-op, not an error.
                    return ApplyOutcome::NoChange;
                };
                self.units.remove(index);
                let occupied: Vec<(TileCoord, usize)> = self
                    .units
                    .iter()
                    .enumerate()
                    .map(|(i, u)| (u.at, i))
                    .collect();
                self.grid.rebind_units(&occupied);
                ApplyOutcome::Tiles(vec![*at])
            }
            Message::Ready { id, ready } => {
                self.ready.insert(id.clone(), *ready);
                ApplyOutcome::NoChange
            }
            Message::TurnEnded => {
                for unit in &mut self.units {
                    unit.moves_left = unit.spec().movement;
                }
                self.ready.clear();
                ApplyOutcome::RecomputeAll
            }
            Message::State { snapshot } => match Self::restore(snapshot) {
                Ok(world) => {
                    *self = world;
                    ApplyOutcome::RecomputeAll
                }
                Err(_) => ApplyOutcome::NoChange,
            },
        }
    }

    fn ensure_player(&mut self, id: &str) {
        if !self.players.iter().any(|p| p == id) {
            self.players.push(id.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexhold_protocol::{snapshot_hash, ImprovementKind};

    fn plains_world(width: u32, height: u32) -> WorldState {
        WorldState::with_height_fn(width, height, 1.0, |_, _| 0.5)
    }

    fn join(world: &mut WorldState, id: &str) {
        world.apply_message(&Message::PlayerJoin { id: id.into() });
    }

    #[test]
    fn player_join_is_idempotent() {
        let mut world = plains_world(5, 5);
        assert_eq!(
            world.apply_message(&Message::PlayerJoin { id: "alice".into() }),
            ApplyOutcome::NoChange
        );
        assert_eq!(
            world.apply_message(&Message::PlayerJoin { id: "alice".into() }),
            ApplyOutcome::NoChange
        );
        assert_eq!(world.players(), ["alice".to_string()]);
    }

    #[test]
    fn unit_create_occupies_tile() {
        let mut world = plains_world(5, 5);
        let at = TileCoord::new(2, 2);
        let outcome = world.apply_message(&Message::UnitCreate {
            owner: "alice".into(),
            at,
            kind: UnitKind::Settler,
        });
        assert_eq!(outcome, ApplyOutcome::Tiles(vec![at]));
        assert_eq!(world.unit_at(at).unwrap().kind, UnitKind::Settler);
        // Creating a unit synthesizes its player.
        assert_eq!(world.players(), ["alice".to_string()]);
    }

    #[test]
    fn unit_move_spends_points_and_swaps_occupancy() {
        let mut world = plains_world(5, 5);
        let from = TileCoord::new(1, 1);
        let to = TileCoord::new(2, 1);
        world.apply_message(&Message::UnitCreate {
            owner: "alice".into(),
            at: from,
            kind: UnitKind::Warrior,
        });
        let outcome = world.apply_message(&Message::UnitMove {
            from,
            to,
            used_points: 1,
        });
        assert_eq!(outcome, ApplyOutcome::Tiles(vec![from, to]));
        assert!(world.unit_at(from).is_none());
        let unit = world.unit_at(to).unwrap();
        assert_eq!(unit.at, to);
        assert_eq!(unit.moves_left, unit.spec().movement - 1);
    }

    #[test]
    fn unit_delete_on_empty_tile_is_noop() {
        let mut world = plains_world(5, 5);
        world.apply_message(&Message::UnitCreate {
            owner: "alice".into(),
            at: TileCoord::new(0, 0),
            kind: UnitKind::Worker,
        });
        let before = world.units().len();
        let outcome = world.apply_message(&Message::UnitDelete {
            at: TileCoord::new(3, 3),
        });
        assert_eq!(outcome, ApplyOutcome::NoChange);
        assert_eq!(world.units().len(), before);
    }

    #[test]
    fn unit_delete_rebinds_remaining_indices() {
        let mut world = plains_world(5, 5);
        let first = TileCoord::new(0, 0);
        let second = TileCoord::new(3, 3);
        for (at, kind) in [(first, UnitKind::Settler), (second, UnitKind::Warrior)] {
            world.apply_message(&Message::UnitCreate {
                owner: "alice".into(),
                at,
                kind,
            });
        }
        world.apply_message(&Message::UnitDelete { at: first });
        assert_eq!(world.units().len(), 1);
        assert_eq!(world.unit_at(second).unwrap().kind, UnitKind::Warrior);
    }

    #[test]
    fn city_grow_claims_exactly_the_given_set() {
        let mut world = plains_world(6, 6);
        let center = TileCoord::new(2, 2);
        world.apply_message(&Message::CityCreate {
            owner: "alice".into(),
            at: center,
        });
        let grow = world.plan_city_growth(center, 3).unwrap();
        let Message::CityGrow { tiles, .. } = &grow else {
            panic!("expected growth message");
        };
        let expected = tiles.clone();
        assert_eq!(world.apply_message(&grow), ApplyOutcome::RecomputeAll);
        let city = world.city_at(center).unwrap();
        assert_eq!(city.tiles().len(), 1 + expected.len());
        for coord in expected {
            assert!(city.owns(coord));
        }
    }

    #[test]
    fn growth_never_double_claims_across_cities() {
        let mut world = plains_world(6, 6);
        let a = TileCoord::new(1, 1);
        let b = TileCoord::new(3, 1);
        for at in [a, b] {
            world.apply_message(&Message::CityCreate {
                owner: format!("p{}", at.x),
                at,
            });
        }
        // Grow the two cities alternately until neither can grow.
        loop {
            let mut grew = false;
            for center in [a, b] {
                if let Some(msg) = world.plan_city_growth(center, 2) {
                    world.apply_message(&msg);
                    grew = true;
                }
            }
            if !grew {
                break;
            }
        }
        // Every claimed tile belongs to exactly one city.
        let grid = world.grid();
        for coord in grid.coords() {
            let owners = world
                .cities()
                .iter()
                .filter(|c| c.owns(coord))
                .count();
            assert!(owners <= 1, "{coord:?} claimed {owners} times");
            assert_eq!(grid.tile(coord).city.is_some(), owners == 1);
        }
    }

    #[test]
    fn turn_end_refills_movement_and_clears_ready() {
        let mut world = plains_world(5, 5);
        join(&mut world, "alice");
        join(&mut world, "bob");
        let at = TileCoord::new(2, 2);
        world.apply_message(&Message::UnitCreate {
            owner: "alice".into(),
            at,
            kind: UnitKind::Warrior,
        });
        world.apply_message(&Message::UnitMove {
            from: at,
            to: TileCoord::new(3, 2),
            used_points: 2,
        });
        assert_eq!(world.unit_at(TileCoord::new(3, 2)).unwrap().moves_left, 0);

        world.apply_message(&Message::Ready {
            id: "alice".into(),
            ready: true,
        });
        assert!(!world.all_players_ready());
        world.apply_message(&Message::Ready {
            id: "bob".into(),
            ready: true,
        });
        assert!(world.all_players_ready());

        assert_eq!(
            world.apply_message(&Message::TurnEnded),
            ApplyOutcome::RecomputeAll
        );
        assert!(!world.all_players_ready());
        let unit = world.unit_at(TileCoord::new(3, 2)).unwrap();
        assert_eq!(unit.moves_left, unit.spec().movement);
    }

    #[test]
    fn readiness_can_be_retracted() {
        let mut world = plains_world(5, 5);
        join(&mut world, "alice");
        join(&mut world, "bob");
        for id in ["alice", "bob"] {
            world.apply_message(&Message::Ready {
                id: id.into(),
                ready: true,
            });
        }
        assert!(world.all_players_ready());
        world.apply_message(&Message::Ready {
            id: "alice".into(),
            ready: false,
        });
        assert!(!world.all_players_ready());
    }

    #[test]
    fn snapshot_roundtrip_is_exact() {
        let mut world = WorldState::generate(8, 6, 1.0, 42);
        join(&mut world, "alice");
        join(&mut world, "bob");
        // Find land for the city.
        let center = world
            .grid()
            .coords()
            .find(|&c| world.grid().tile(c).level.traversable())
            .unwrap();
        world.apply_message(&Message::CityCreate {
            owner: "alice".into(),
            at: center,
        });
        if let Some(grow) = world.plan_city_growth(center, 2) {
            world.apply_message(&grow);
        }
        world.apply_message(&Message::UnitCreate {
            owner: "bob".into(),
            at: TileCoord::new(1, 1),
            kind: UnitKind::Settler,
        });
        world.set_improvement(
            center,
            Some(Improvement {
                kind: ImprovementKind::Farm,
                data: [("strips".to_string(), 3)].into_iter().collect(),
            }),
        );

        let snap = world.snapshot();
        let restored = WorldState::restore(&snap).unwrap();
        let snap2 = restored.snapshot();
        assert_eq!(snap, snap2);
        assert_eq!(
            snapshot_hash(&snap).unwrap(),
            snapshot_hash(&snap2).unwrap()
        );
    }

    #[test]
    fn state_message_replaces_world() {
        let mut source = plains_world(5, 5);
        join(&mut source, "alice");
        source.apply_message(&Message::UnitCreate {
            owner: "alice".into(),
            at: TileCoord::new(1, 1),
            kind: UnitKind::Warrior,
        });

        let mut replica = plains_world(2, 2);
        let outcome = replica.apply_message(&Message::State {
            snapshot: source.snapshot(),
        });
        assert_eq!(outcome, ApplyOutcome::RecomputeAll);
        assert_eq!(replica.snapshot(), source.snapshot());
    }

    #[test]
    fn starting_anchors_match_the_fixed_table() {
        let mut world = plains_world(10, 8);
        for id in ["p1", "p2", "p3", "p4", "p5"] {
            join(&mut world, id);
        }
        assert_eq!(world.starting_anchor(1), TileCoord::new(1, 1));
        assert_eq!(world.starting_anchor(2), TileCoord::new(7, 5));
        assert_eq!(world.starting_anchor(3), TileCoord::new(7, 1));
        assert_eq!(world.starting_anchor(4), TileCoord::new(1, 5));
        assert_eq!(world.starting_anchor(5), TileCoord::new(5, 4));

        let msgs = world.starting_unit_messages("p1");
        assert_eq!(msgs.len(), 2);
        match (&msgs[0], &msgs[1]) {
            (
                Message::UnitCreate { at: a, kind: ka, .. },
                Message::UnitCreate { at: b, kind: kb, .. },
            ) => {
                assert_eq!((*a, *ka), (TileCoord::new(1, 1), UnitKind::Settler));
                assert_eq!((*b, *kb), (TileCoord::new(2, 1), UnitKind::Warrior));
            }
            _ => panic!("expected two unit creates"),
        }
    }

    #[test]
    fn validation_rejects_protocol_violations() {
        let mut world = plains_world(5, 5);
        let at = TileCoord::new(2, 2);
        world.apply_message(&Message::UnitCreate {
            owner: "alice".into(),
            at,
            kind: UnitKind::Warrior,
        });

        // Duplicate create on an occupied tile.
        let dup = Message::UnitCreate {
            owner: "bob".into(),
            at,
            kind: UnitKind::Warrior,
        };
        assert_eq!(
            world.validate_message(&dup),
            Err(ProtocolViolation::TileOccupied(at))
        );

        // Overdrawn movement.
        let overdraw = Message::UnitMove {
            from: at,
            to: TileCoord::new(3, 2),
            used_points: 99,
        };
        assert!(matches!(
            world.validate_message(&overdraw),
            Err(ProtocolViolation::InsufficientMovement { .. })
        ));

        // Growth for a city that does not exist.
        let grow = Message::CityGrow {
            center: TileCoord::new(0, 0),
            tiles: vec![TileCoord::new(1, 0)],
        };
        assert_eq!(
            world.validate_message(&grow),
            Err(ProtocolViolation::UnknownCity(TileCoord::new(0, 0)))
        );

        // Deleting from an empty tile stays valid (idempotent no-op).
        assert_eq!(
            world.validate_message(&Message::UnitDelete {
                at: TileCoord::new(4, 4)
            }),
            Ok(())
        );
    }

    #[test]
    fn budgeted_move_scenario_on_mountain() {
        // 5x5 grid, settler at (1,1) with 1 movement point, (2,1) is a
        // mountain costing 2: the path truncates to the start tile and no
        // legal move message exists.
        let mut world = WorldState::with_height_fn(5, 5, 1.0, |x, y| {
            if x == 2 && y == 1 {
                0.9
            } else {
                0.5
            }
        });
        let start = TileCoord::new(1, 1);
        world.apply_message(&Message::UnitCreate {
            owner: "alice".into(),
            at: start,
            kind: UnitKind::Settler,
        });
        // Spend down to one movement point.
        world.apply_message(&Message::UnitMove {
            from: start,
            to: start,
            used_points: 1,
        });

        let goal = TileCoord::new(2, 1);
        let budget = world.unit_at(start).unwrap().moves_left;
        let path = world.grid().find_path(start, goal, budget);
        assert_eq!(path.tiles, vec![start]);
        assert_eq!(path.cost, 0);
        assert!(!path.reaches(goal));

        // A client that emitted the move anyway would be rejected.
        let illegal = Message::UnitMove {
            from: start,
            to: goal,
            used_points: 2,
        };
        assert!(matches!(
            world.validate_message(&illegal),
            Err(ProtocolViolation::InsufficientMovement { .. })
        ));
    }
}
