//! Planets: the capturable, income-producing territory of the game.

use serde::{Deserialize, Serialize};

use crate::util::Location;

use super::building::{Building, BuildingType};
use super::ids::{PlanetId, PlayerId};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Planet {
    pub id: PlanetId,
    pub loc: Location,
    pub base_income: i64,
    pub owner: Option<PlayerId>,
    pub homeworld: bool,

    /// The player this planet was a homeworld for, tracked across capture so
    /// strategies (and a future UI) can implement homeworld-reclaim logic.
    pub original_owner: Option<PlayerId>,
    pub name: String,
    pub buildings: Vec<Building>,
}

impl Planet {
    pub fn new(id: PlanetId, loc: Location, base_income: i64, name: String) -> Self {
        Self {
            id,
            loc,
            base_income,
            owner: None,
            homeworld: false,
            original_owner: None,
            name,
            buildings: Vec::new(),
        }
    }

    pub fn building_of(&self, building_type: BuildingType) -> Option<&Building> {
        self.buildings
            .iter()
            .find(|b| b.building_type == building_type)
    }

    pub fn building_of_mut(&mut self, building_type: BuildingType) -> Option<&mut Building> {
        self.buildings
            .iter_mut()
            .find(|b| b.building_type == building_type)
    }

    pub fn has_factory(&self) -> bool {
        self.building_of(BuildingType::Factory).is_some()
    }

    pub fn fortification(&self) -> Option<&Building> {
        self.building_of(BuildingType::Fortification)
    }

    pub fn fortification_mut(&mut self) -> Option<&mut Building> {
        self.building_of_mut(BuildingType::Fortification)
    }

    pub fn mining_building_count(&self) -> i64 {
        self.buildings
            .iter()
            .filter(|b| b.building_type == BuildingType::Mining)
            .count() as i64
    }

    /// Destroy every building on this planet, per spec.md's capture rule:
    /// "on capture of the hosting planet all buildings are destroyed."
    pub fn wipe_buildings(&mut self) {
        self.buildings.clear();
    }

    pub fn transfer_to(&mut self, new_owner: Option<PlayerId>) {
        self.owner = new_owner;
    }
}
