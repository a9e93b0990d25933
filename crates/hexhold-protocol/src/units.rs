use serde::{Deserialize, Serialize};

/// The fixed unit-type catalog. Stats live in `hexhold-core`; the wire only
/// names the kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    Settler,
    Warrior,
    Archer,
    Worker,
}

/// What a unit is allowed to do. An explicit set rather than bit flags so
/// "has capability X" reads directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    Move,
    Settle,
    Attack,
    Ranged,
    Improve,
    Launch,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_kind_roundtrips_through_msgpack() {
        let bytes = rmp_serde::encode::to_vec(&UnitKind::Settler).unwrap();
        let back: UnitKind = rmp_serde::decode::from_slice(&bytes).unwrap();
        assert_eq!(back, UnitKind::Settler);
    }
}
