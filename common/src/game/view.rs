//! The fog-of-war-filtered projection of a game handed to a player's
//! client and to the AI strategies (spec.md §4.6 / §6 `/state`).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::util::{GridSize, Location};

use super::building::Building;
use super::ids::{PlanetId, PlayerId};
use super::mech::Mech;
use super::planet::Planet;
use super::visibility::visibility;
use super::GameState;

/// A planet as seen by a particular player: always visible metadata plus
/// owner/building info that's only populated for tiles currently in view.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct VisiblePlanet {
    pub id: PlanetId,
    pub loc: Location,
    pub name: String,
    pub owner: Option<PlayerId>,
    pub base_income: i64,
    pub buildings: Vec<Building>,
    pub homeworld: bool,
    pub original_owner: Option<PlayerId>,
}

impl From<&Planet> for VisiblePlanet {
    fn from(p: &Planet) -> Self {
        Self {
            id: p.id,
            loc: p.loc,
            name: p.name.clone(),
            owner: p.owner,
            base_income: p.base_income,
            buildings: p.buildings.clone(),
            homeworld: p.homeworld,
            original_owner: p.original_owner,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PlayerView {
    pub player: PlayerId,
    pub turn: u64,
    pub grid_size: GridSize,
    pub credits: i64,
    pub income: i64,
    pub visible_tiles: HashSet<Location>,

    /// Every planet whose tile is currently visible, owned or not.
    pub visible_planets: Vec<VisiblePlanet>,

    /// Every mech whose tile is currently visible, the player's own or an
    /// enemy's.
    pub visible_mechs: Vec<Mech>,

    pub own_planets: Vec<PlanetId>,
    pub own_mechs: Vec<Mech>,
}

/// Build the fog-of-war-filtered view handed to `player` for the current
/// state of `game`.
pub fn player_view(game: &GameState, player: PlayerId) -> PlayerView {
    let own_planet_locs: Vec<Location> = game.planets_owned_by(player).map(|p| p.loc).collect();
    let own_mech_locs: Vec<Location> = game.mechs_owned_by(player).map(|m| m.loc).collect();

    let visible_tiles = visibility(
        game.grid_size,
        own_planet_locs.clone(),
        own_mech_locs.clone(),
    );

    let visible_planets: Vec<VisiblePlanet> = game
        .planets
        .iter()
        .filter(|p| visible_tiles.contains(&p.loc))
        .map(VisiblePlanet::from)
        .collect();

    let visible_mechs: Vec<Mech> = game
        .mechs
        .iter()
        .filter(|m| visible_tiles.contains(&m.loc))
        .cloned()
        .collect();

    let own_planets: Vec<PlanetId> = game.planets_owned_by(player).map(|p| p.id).collect();
    let own_mechs: Vec<Mech> = game.mechs_owned_by(player).cloned().collect();

    let income = game
        .planets_owned_by(player)
        .map(|p| p.base_income + p.mining_building_count() * crate::conf::MINING_INCOME_BONUS)
        .sum();

    let credits = game.player(player).map(|p| p.credits).unwrap_or(0);

    PlayerView {
        player,
        turn: game.current_turn,
        grid_size: game.grid_size,
        credits,
        income,
        visible_tiles,
        visible_planets,
        visible_mechs,
        own_planets,
        own_mechs,
    }
}
