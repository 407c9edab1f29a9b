//! The wire shape of a turn's orders.
//!
//! The original game's orders distinguish a mech build from a building
//! build by a duck-typed `type: "mech" | "building"` string tag on an
//! otherwise-shared shape. Design Note (§9) calls for a proper tagged
//! variant instead; `Build` is that variant, `#[serde(tag = "type")]`-coded
//! and `rename_all = "camelCase"`-cased so the wire format matches spec.md
//! §6's `{"planetId":N,"type":"mech","mechType":"light"}` byte-for-byte.
//! `MoveOrder` goes through a flat `MoveOrderWire` shadow struct for the
//! same reason: spec.md §6 wants `{"mechId":N,"toX":N,"toY":N}`, not a
//! nested `to` object.

use serde::{Deserialize, Serialize};

use crate::util::Location;

use super::building::BuildingType;
use super::ids::MechId;
use super::ids::PlanetId;
use super::mech::MechType;

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(from = "MoveOrderWire", into = "MoveOrderWire")]
pub struct MoveOrder {
    pub mech_id: MechId,
    pub to: Location,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct MoveOrderWire {
    mech_id: MechId,
    to_x: u16,
    to_y: u16,
}

impl From<MoveOrderWire> for MoveOrder {
    fn from(wire: MoveOrderWire) -> Self {
        MoveOrder {
            mech_id: wire.mech_id,
            to: Location::new(wire.to_x, wire.to_y),
        }
    }
}

impl From<MoveOrder> for MoveOrderWire {
    fn from(order: MoveOrder) -> Self {
        MoveOrderWire {
            mech_id: order.mech_id,
            to_x: order.to.x,
            to_y: order.to.y,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Build {
    #[serde(rename = "mech", rename_all = "camelCase")]
    Mech {
        planet_id: PlanetId,
        mech_type: MechType,
    },
    #[serde(rename = "building", rename_all = "camelCase")]
    Building {
        planet_id: PlanetId,
        building_type: BuildingType,
    },
}

impl Build {
    pub fn planet_id(&self) -> PlanetId {
        match self {
            Build::Mech { planet_id, .. } => *planet_id,
            Build::Building { planet_id, .. } => *planet_id,
        }
    }

    pub fn cost(&self) -> i64 {
        match self {
            Build::Mech { mech_type, .. } => mech_type.build_cost(),
            Build::Building { building_type, .. } => building_type.build_cost(),
        }
    }
}

/// A single player's submission for one turn.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Orders {
    pub moves: Vec<MoveOrder>,
    pub builds: Vec<Build>,
}

impl Orders {
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty() && self.builds.is_empty()
    }
}

/// The outcome of filtering a candidate `Orders` value (used by the AI
/// submission path, which discards rather than rejects wholesale).
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FilteredOrders {
    pub accepted: Orders,
    pub discarded: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_order_matches_spec_wire_shape() {
        let order = MoveOrder {
            mech_id: MechId::new(7),
            to: Location::new(6, 5),
        };
        let json = serde_json::to_value(order).unwrap();
        assert_eq!(json, serde_json::json!({"mechId": 7, "toX": 6, "toY": 5}));

        let parsed: MoveOrder = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, order);
    }

    #[test]
    fn build_mech_matches_spec_wire_shape() {
        let build = Build::Mech {
            planet_id: PlanetId::new(3),
            mech_type: MechType::Light,
        };
        let json = serde_json::to_value(build).unwrap();
        assert_eq!(json, serde_json::json!({"planetId": 3, "type": "mech", "mechType": "light"}));
    }

    #[test]
    fn build_building_matches_spec_wire_shape() {
        let build = Build::Building {
            planet_id: PlanetId::new(3),
            building_type: BuildingType::Fortification,
        };
        let json = serde_json::to_value(build).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"planetId": 3, "type": "building", "buildingType": "fortification"})
        );
    }
}
