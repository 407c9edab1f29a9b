//! Infestor: mass-produces lights and mediums at a 2:1 ratio, keeps roughly
//! one factory per two owned planets, and spreads its mechs as widely as
//! possible rather than massing them.

use common::game::building::BuildingType;
use common::game::mech::MechType;
use common::game::orders::{Build, MoveOrder, Orders};
use common::game::view::PlayerView;
use rand::RngCore;

use crate::helpers::{best_frontier_step, count_type};
use crate::Strategy;

pub struct Infestor;

impl Strategy for Infestor {
    fn produce_orders(&self, view: &PlayerView, _rng: &mut dyn RngCore) -> Orders {
        let mut builds = Vec::new();
        let mut credits = view.credits;

        let own_planets: Vec<_> = view
            .visible_planets
            .iter()
            .filter(|p| p.owner == Some(view.player))
            .collect();
        let factory_count = own_planets.iter().filter(|p| p.buildings.iter().any(|b| b.building_type == BuildingType::Factory)).count();
        let wants_more_factories = factory_count * 2 < own_planets.len();

        let light = count_type(view, MechType::Light);
        let medium = count_type(view, MechType::Medium);

        for planet in &own_planets {
            if wants_more_factories && !planet.buildings.iter().any(|b| b.building_type == BuildingType::Factory) {
                let cost = BuildingType::Factory.build_cost();
                if cost <= credits {
                    credits -= cost;
                    builds.push(Build::Building {
                        planet_id: planet.id,
                        building_type: BuildingType::Factory,
                    });
                }
                continue;
            }
            if !planet.buildings.iter().any(|b| b.building_type == BuildingType::Factory) {
                continue;
            }
            let want = if medium * 2 < light { MechType::Medium } else { MechType::Light };
            if want.build_cost() > credits {
                continue;
            }
            credits -= want.build_cost();
            builds.push(Build::Mech {
                planet_id: planet.id,
                mech_type: want,
            });
        }

        // Spread maximally: every own mech heads for whichever neighboring
        // tile opens up the most unexplored territory, rather than massing.
        let moves = view
            .own_mechs
            .iter()
            .map(|mech| MoveOrder {
                mech_id: mech.id,
                to: best_frontier_step(mech.loc, view.grid_size, &view.visible_tiles),
            })
            .collect();

        Orders { moves, builds }
    }
}
