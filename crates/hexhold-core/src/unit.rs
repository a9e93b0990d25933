use serde::{Deserialize, Serialize};

use hexhold_protocol::{Capability, TileCoord, UnitKind, UnitSnapshot};

/// Immutable stats for one entry of the unit-type catalog.
#[derive(Clone, Copy, Debug)]
pub struct UnitSpec {
    pub kind: UnitKind,
    pub movement: u32,
    pub attack: i32,
    pub health: i32,
    pub production_cost: i32,
    pub capabilities: &'static [Capability],
}

impl UnitSpec {
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

/// The fixed unit-type catalog.
pub fn unit_spec(kind: UnitKind) -> &'static UnitSpec {
    match kind {
        UnitKind::Settler => &UnitSpec {
            kind: UnitKind::Settler,
            movement: 2,
            attack: 0,
            health: 10,
            production_cost: 30,
            capabilities: &[Capability::Move, Capability::Settle],
        },
        UnitKind::Warrior => &UnitSpec {
            kind: UnitKind::Warrior,
            movement: 2,
            attack: 4,
            health: 20,
            production_cost: 20,
            capabilities: &[Capability::Move, Capability::Attack],
        },
        UnitKind::Archer => &UnitSpec {
            kind: UnitKind::Archer,
            movement: 2,
            attack: 3,
            health: 15,
            production_cost: 25,
            capabilities: &[Capability::Move, Capability::Attack, Capability::Ranged],
        },
        UnitKind::Worker => &UnitSpec {
            kind: UnitKind::Worker,
            movement: 2,
            attack: 0,
            health: 10,
            production_cost: 15,
            capabilities: &[Capability::Move, Capability::Improve],
        },
    }
}

/// A unit on the map. Exactly one unit may occupy a tile.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Unit {
    pub owner: String,
    pub kind: UnitKind,
    pub at: TileCoord,
    pub moves_left: u32,
    pub health: i32,
}

impl Unit {
    pub fn new(owner: String, kind: UnitKind, at: TileCoord) -> Self {
        let spec = unit_spec(kind);
        Self {
            owner,
            kind,
            at,
            moves_left: spec.movement,
            health: spec.health,
        }
    }

    pub fn spec(&self) -> &'static UnitSpec {
        unit_spec(self.kind)
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.spec().has_capability(capability)
    }

    pub fn to_snapshot(&self) -> UnitSnapshot {
        UnitSnapshot {
            owner: self.owner.clone(),
            kind: self.kind,
            at: self.at,
            moves_left: self.moves_left,
            health: self.health,
        }
    }

    pub fn from_snapshot(snap: &UnitSnapshot) -> Self {
        Self {
            owner: snap.owner.clone(),
            kind: snap.kind,
            at: snap.at,
            moves_left: snap.moves_left,
            health: snap.health,
        }
    }
}
