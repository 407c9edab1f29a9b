//! Generic: a budget-adaptive fort-then-mechs policy with homeworld-reclaim
//! and weak-enemy-finisher modes, the closest thing to a "default" AI the
//! spec ships.

use common::game::building::BuildingType;
use common::game::mech::MechType;
use common::game::orders::{Build, MoveOrder, Orders};
use common::game::view::PlayerView;
use rand::RngCore;

use crate::helpers::{
    attack_group_locations, best_frontier_step, nearest_uncontrolled_planet, one_step_toward,
    own_factory_planets,
};
use crate::Strategy;

pub struct Generic;

impl Strategy for Generic {
    fn produce_orders(&self, view: &PlayerView, _rng: &mut dyn RngCore) -> Orders {
        let mut builds = Vec::new();
        let mut credits = view.credits;

        let own_planets: Vec<_> = view
            .visible_planets
            .iter()
            .filter(|p| p.owner == Some(view.player))
            .collect();

        // Fort-then-mechs: every owned planet gets a fortification before
        // any planet gets a second mech build this turn.
        let mut fortified_all = true;
        for planet in &own_planets {
            let has_fort = planet
                .buildings
                .iter()
                .any(|b| b.building_type == BuildingType::Fortification);
            if has_fort {
                continue;
            }
            fortified_all = false;
            let cost = BuildingType::Fortification.build_cost();
            if cost <= credits {
                credits -= cost;
                builds.push(Build::Building {
                    planet_id: planet.id,
                    building_type: BuildingType::Fortification,
                });
            }
        }

        if fortified_all {
            for planet in own_factory_planets(view) {
                // Adapt mech type to what's affordable, biggest first.
                let want = [MechType::Assault, MechType::Heavy, MechType::Medium, MechType::Light]
                    .into_iter()
                    .find(|t| t.build_cost() <= credits);
                let Some(want) = want else { continue };
                credits -= want.build_cost();
                builds.push(Build::Mech {
                    planet_id: planet.id,
                    mech_type: want,
                });
            }
        }

        let mut moves = Vec::new();

        // Homeworld-reclaim: if our original homeworld is visible and held
        // by someone else, any attack group heads there first.
        let lost_homeworld = view
            .visible_planets
            .iter()
            .find(|p| p.homeworld && p.original_owner == Some(view.player) && p.owner != Some(view.player));

        // Weak-enemy finisher: a visible enemy planet with no fortification
        // and no visible defenders is a priority target over anything else
        // uncontrolled.
        let weak_enemy = view
            .visible_planets
            .iter()
            .filter(|p| p.owner.is_some() && p.owner != Some(view.player))
            .filter(|p| !p.buildings.iter().any(|b| b.building_type == BuildingType::Fortification))
            .find(|p| !view.visible_mechs.iter().any(|m| m.loc == p.loc && m.owner != view.player));

        let priority_target = lost_homeworld.or(weak_enemy).map(|p| p.loc);

        for loc in attack_group_locations(&view.own_mechs, 2) {
            let target = priority_target.or_else(|| nearest_uncontrolled_planet(view, loc));
            let Some(target) = target else { continue };
            for mech in view
                .own_mechs
                .iter()
                .filter(|m| m.loc == loc && matches!(m.mech_type, MechType::Heavy | MechType::Assault))
            {
                moves.push(MoveOrder {
                    mech_id: mech.id,
                    to: one_step_toward(mech.loc, target, view.grid_size),
                });
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
