//! Abstract game engine: the turn-engine subsystem described in spec.md §1.
//!
//! This implements the game logic without regard to HTTP routing, session
//! handling, or persistence mechanics, in the same spirit as the teacher's
//! `//! Abstract game engine.` doc comment on this module.

pub mod building;
pub mod combat;
pub mod combat_log;
pub mod dispatcher_types;
pub mod error;
pub mod ids;
pub mod mapgen;
pub mod mech;
pub mod orders;
pub mod planet;
pub mod player;
pub mod store;
pub mod turn;
pub mod validator;
pub mod view;
pub mod visibility;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::util::GridSize;

use ids::{GameId, PlanetId, PlayerId};
use mech::Mech;
use planet::Planet;
use player::Player;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum GameStatus {
    Waiting,
    Active,
    Finished,
}

/// Everything the durable store owns for one game: the game's own metadata
/// plus every entity it exclusively owns (spec.md §3 Ownership). Deleting
/// the `Game` cascades to all of these; in the in-memory `Store` that's just
/// dropping this struct.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GameState {
    pub id: GameId,
    pub name: String,
    pub grid_size: GridSize,
    pub max_players: usize,
    pub turn_timer_secs: u64,
    pub status: GameStatus,

    /// 0 before the game starts; 1 on start, incrementing thereafter.
    pub current_turn: u64,

    /// Unix timestamp (seconds) of the current turn's deadline. Meaningless
    /// while `status != Active`.
    pub turn_deadline: u64,

    pub winner: Option<PlayerId>,

    pub players: Vec<Player>,
    pub planets: Vec<Planet>,
    pub mechs: Vec<Mech>,
}

impl GameState {
    pub fn new(
        id: GameId,
        name: String,
        grid_size: GridSize,
        max_players: usize,
        turn_timer_secs: u64,
    ) -> Self {
        Self {
            id,
            name,
            grid_size,
            max_players,
            turn_timer_secs,
            status: GameStatus::Waiting,
            current_turn: 0,
            turn_deadline: 0,
            winner: None,
            players: Vec::new(),
            planets: Vec::new(),
            mechs: Vec::new(),
        }
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn planet(&self, id: PlanetId) -> Option<&Planet> {
        self.planets.iter().find(|p| p.id == id)
    }

    pub fn planet_mut(&mut self, id: PlanetId) -> Option<&mut Planet> {
        self.planets.iter_mut().find(|p| p.id == id)
    }

    pub fn planets_owned_by(&self, owner: PlayerId) -> impl Iterator<Item = &Planet> {
        self.planets.iter().filter(move |p| p.owner == Some(owner))
    }

    pub fn mechs_owned_by(&self, owner: PlayerId) -> impl Iterator<Item = &Mech> {
        self.mechs.iter().filter(move |m| m.owner == owner)
    }

    pub fn mechs_at(&self, loc: crate::util::Location) -> impl Iterator<Item = &Mech> {
        self.mechs.iter().filter(move |m| m.loc == loc)
    }

    /// Group a tile's mechs by owner, used by both the Turn Processor
    /// (to find multi-owner tiles after movement) and the combat resolver's
    /// caller.
    pub fn forces_by_owner_at(&self, loc: crate::util::Location) -> BTreeMap<PlayerId, Vec<Mech>> {
        let mut forces: BTreeMap<PlayerId, Vec<Mech>> = BTreeMap::new();
        for mech in self.mechs_at(loc) {
            forces.entry(mech.owner).or_default().push(mech.clone());
        }
        forces
    }

    pub fn non_eliminated_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| !p.eliminated)
    }

    pub fn active_player_colors(&self) -> impl Iterator<Item = player::EmpireColor> + '_ {
        self.non_eliminated_players().map(|p| p.empire_color)
    }

    /// Folds a freshly generated map into this game at the
    /// `waiting -> active` transition, and seeds each homeworld owner's
    /// designation counter so builds continue where the starting mechs
    /// left off.
    pub fn apply_generated_map(&mut self, map: mapgen::GeneratedMap) {
        self.grid_size = map.grid_size;
        for generated in map.planets {
            let mapgen::GeneratedPlanet {
                mut planet,
                buildings,
                mechs,
            } = generated;
            planet.buildings = buildings;
            let owner = planet.owner;
            self.planets.push(planet);

            for mech in mechs {
                if let Some(owner) = owner {
                    if let Some(p) = self.player_mut(owner) {
                        let serial = p.mech_serials.entry(mech.mech_type).or_insert(0);
                        *serial = (*serial).max(
                            mech.designation
                                .rsplit('-')
                                .next()
                                .and_then(|s| s.parse::<u64>().ok())
                                .unwrap_or(0),
                        );
                    }
                }
                self.mechs.push(mech);
            }
        }
    }
}

impl Default for GameState {
    /// Used only as the placeholder slot a `Store` overwrites immediately;
    /// never a valid playable game on its own.
    fn default() -> Self {
        GameState::new(GameId::new(0), String::new(), GridSize::new(25).unwrap(), 0, 0)
    }
}
