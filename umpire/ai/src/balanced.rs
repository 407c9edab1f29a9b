//! Balanced: build 7 scouts, then mix medium/heavy/assault at a 2:2:1
//! ratio; only goes on the offensive once its combat strength reaches 4.

use common::game::mech::MechType;
use common::game::orders::{Build, MoveOrder, Orders};
use common::game::view::PlayerView;
use rand::RngCore;

use crate::helpers::{
    attack_group_locations, best_frontier_step, combat_strength, count_type, nearest_uncontrolled_planet,
    own_factory_planets, scout_count,
};
use crate::Strategy;

pub struct Balanced;

impl Strategy for Balanced {
    fn produce_orders(&self, view: &PlayerView, _rng: &mut dyn RngCore) -> Orders {
        let mut builds = Vec::new();
        let mut credits = view.credits;

        let medium = count_type(view, MechType::Medium);
        let heavy = count_type(view, MechType::Heavy);
        let assault = count_type(view, MechType::Assault);

        for planet in own_factory_planets(view) {
            let want = if scout_count(view) < 7 {
                MechType::Light
            } else if medium < heavy * 2 + 1 {
                MechType::Medium
            } else if heavy < assault * 2 + 1 {
                MechType::Heavy
            } else {
                MechType::Assault
            };
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
        if combat_strength(view) >= 4 {
            for loc in attack_group_locations(&view.own_mechs, 1) {
                let Some(target) = nearest_uncontrolled_planet(view, loc) else {
                    continue;
                };
                for mech in view.own_mechs.iter().filter(|m| {
                    m.loc == loc && matches!(m.mech_type, MechType::Heavy | MechType::Assault)
                }) {
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
