//! Expansionist: build 10 scouts, then form heavy+assault attack groups of
//! 4 (3 heavy + 1 assault), capped at 4 attack mechs per owned planet.

use common::game::mech::MechType;
use common::game::orders::{Build, MoveOrder, Orders};
use common::game::view::PlayerView;
use rand::RngCore;

use crate::helpers::{best_frontier_step, count_type, nearest_uncontrolled_planet, own_factory_planets, scout_count};
use crate::Strategy;

const ATTACK_GROUP_SIZE: usize = 4;
const ATTACK_GROUP_HEAVY: usize = 3;

pub struct Expansionist;

impl Strategy for Expansionist {
    fn produce_orders(&self, view: &PlayerView, _rng: &mut dyn RngCore) -> Orders {
        let mut builds = Vec::new();
        let mut credits = view.credits;

        let planet_cap = view.own_planets.len() * ATTACK_GROUP_SIZE;
        let current_attack_mechs = count_type(view, MechType::Heavy) + count_type(view, MechType::Assault);

        for planet in own_factory_planets(view) {
            let want = if scout_count(view) < 10 {
                Some(MechType::Light)
            } else if current_attack_mechs >= planet_cap {
                None
            } else {
                let heavy_so_far = count_type(view, MechType::Heavy) % ATTACK_GROUP_SIZE;
                if heavy_so_far < ATTACK_GROUP_HEAVY {
                    Some(MechType::Heavy)
                } else {
                    Some(MechType::Assault)
                }
            };
            let Some(want) = want else { continue };
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
        for mech in view
            .own_mechs
            .iter()
            .filter(|m| matches!(m.mech_type, MechType::Heavy | MechType::Assault))
        {
            if let Some(target) = nearest_uncontrolled_planet(view, mech.loc) {
                moves.push(MoveOrder {
                    mech_id: mech.id,
                    to: crate::helpers::one_step_toward(mech.loc, target, view.grid_size),
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
