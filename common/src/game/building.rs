//! Planet-side structures.

use serde::{Deserialize, Serialize};

use crate::conf;

use super::ids::{BuildingId, PlanetId};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildingType {
    Mining,
    Factory,
    Fortification,
}

impl BuildingType {
    pub fn build_cost(self) -> i64 {
        match self {
            BuildingType::Mining => conf::BUILDING_COST_MINING,
            BuildingType::Factory => conf::BUILDING_COST_FACTORY,
            BuildingType::Fortification => conf::BUILDING_COST_FORTIFICATION,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Building {
    pub id: BuildingId,
    pub planet: PlanetId,
    pub building_type: BuildingType,

    /// Only meaningful for `Fortification`; other building types are
    /// hp-less per spec.md §3.
    pub hp: i64,
}

impl Building {
    pub fn new(id: BuildingId, planet: PlanetId, building_type: BuildingType) -> Self {
        let hp = match building_type {
            BuildingType::Fortification => conf::FORTIFICATION_MAX_HP,
            _ => 0,
        };
        Self {
            id,
            planet,
            building_type,
            hp,
        }
    }

    pub fn is_fortification(&self) -> bool {
        self.building_type == BuildingType::Fortification
    }

    /// Heal a fortification, capped at its maximum hp. No-op for other
    /// building types.
    pub fn repair(&mut self) {
        if self.is_fortification() {
            self.hp = (self.hp + conf::FORTIFICATION_REPAIR_PER_TURN).min(conf::FORTIFICATION_MAX_HP);
        }
    }
}
