//! Defensive: heavily favors fortifications, caps scouting at 5 light
//! mechs, and only goes on the offensive against undefended targets once
//! it has amassed 6 or more heavy/assault mechs.

use common::game::building::BuildingType;
use common::game::mech::MechType;
use common::game::orders::{Build, MoveOrder, Orders};
use common::game::view::PlayerView;
use rand::RngCore;

use crate::helpers::{best_frontier_step, combat_strength, own_factory_planets, scout_count};
use crate::Strategy;

const OFFENSE_THRESHOLD: usize = 6;

pub struct Defensive;

impl Strategy for Defensive {
    fn produce_orders(&self, view: &PlayerView, _rng: &mut dyn RngCore) -> Orders {
        let mut builds = Vec::new();
        let mut credits = view.credits;

        let own_planets: Vec<_> = view
            .visible_planets
            .iter()
            .filter(|p| p.owner == Some(view.player))
            .collect();

        for planet in &own_planets {
            let has_fort = planet.buildings.iter().any(|b| b.building_type == BuildingType::Fortification);
            if !has_fort {
                let cost = BuildingType::Fortification.build_cost();
                if cost <= credits {
                    credits -= cost;
                    builds.push(Build::Building {
                        planet_id: planet.id,
                        building_type: BuildingType::Fortification,
                    });
                }
            }
        }

        for planet in own_factory_planets(view) {
            let want = if scout_count(view) < 5 { MechType::Light } else { MechType::Heavy };
            if want.build_cost() > credits {
                continue;
            }
            credits -= want.build_cost();
            builds.push(Build::Mech {
                planet_id: planet.id,
                mech_type: want,
            });
        }

        let mut moves = Vec::new();
        if combat_strength(view) >= OFFENSE_THRESHOLD {
            if let Some(target) = undefended_target(view) {
                for mech in view
                    .own_mechs
                    .iter()
                    .filter(|m| matches!(m.mech_type, MechType::Heavy | MechType::Assault))
                {
                    moves.push(MoveOrder {
                        mech_id: mech.id,
                        to: crate::helpers::one_step_toward(mech.loc, target, view.grid_size),
                    });
                }
            }
        }
        for scout in view.own_mechs.iter().filter(|m| m.mech_type == MechType::Light) {
            moves.push(MoveOrder {
                mech_id: scout.id,
                to: best_frontier_step(scout.loc, view.grid_size, &view.visible_tiles),
            });
        }

        Orders { moves, builds }
    }
}

/// A visible, foreign-owned-or-neutral planet with no fortification and no
/// visible enemy mech standing on it.
fn undefended_target(view: &PlayerView) -> Option<common::util::Location> {
    view.visible_planets
        .iter()
        .filter(|p| p.owner != Some(view.player))
        .filter(|p| !p.buildings.iter().any(|b| b.building_type == BuildingType::Fortification))
        .find(|p| !view.visible_mechs.iter().any(|m| m.loc == p.loc && m.owner != view.player))
        .map(|p| p.loc)
}
