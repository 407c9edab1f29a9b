//! The Turn Processor (spec.md §4.5): the 12-stage pipeline that advances a
//! game from end-of-turn-N to end-of-turn-(N+1). THE CORE of this crate.

use std::collections::{HashMap, HashSet};

use rand::RngCore;

use crate::util::Location;

use super::building::BuildingType;
use super::combat;
use super::combat_log::{CombatLogEntry, CombatLogKind};
use super::error::PipelineError;
use super::ids::{GameId, PlayerId};
use super::mech::{next_designation, Mech};
use super::orders::{Build, Orders};
use super::store::Store;
use super::{GameState, GameStatus};

/// Runs the full 12-stage pipeline against the game identified by `game_id`,
/// loading it from and saving it back to `store`. `now` is the current unix
/// timestamp in seconds, injected rather than read from the system clock so
/// the pipeline stays a deterministic function of its inputs.
pub async fn process_turn<R: RngCore>(
    store: &dyn Store,
    game_id: GameId,
    now: u64,
    rng: &mut R,
) -> Result<(), PipelineError> {
    let mut game = store.load_game(game_id).await?;
    let mut logs = Vec::new();

    let orders_by_player = collect_orders(store, &mut game).await?;

    debt_forgiveness(&mut game);
    apply_movements(&mut game, &orders_by_player);
    resolve_combat(&mut game, &mut logs, rng);
    capture_undefended(&mut game, &mut logs, rng);
    apply_builds(&mut game, &orders_by_player, &mut logs);
    apply_income(&mut game, &mut logs);
    apply_maintenance(&mut game, &mut logs);
    apply_repair(&mut game, &mut logs);
    apply_eliminations(&mut game, &mut logs);
    check_win(&mut game, &mut logs);
    advance(&mut game, now, &mut logs);

    verify_invariants(&game)?;

    for entry in logs {
        store.append_log(game_id, entry).await?;
    }
    store.save_game(&game).await?;
    Ok(())
}

/// Stage 1: collect orders, adopting drafts for players with no submission.
async fn collect_orders(
    store: &dyn Store,
    game: &mut GameState,
) -> Result<HashMap<PlayerId, Orders>, PipelineError> {
    let turn = game.current_turn;
    let drafts = store.clear_drafts(game.id).await?;
    let mut orders_by_player = HashMap::new();

    let player_ids: Vec<PlayerId> = game.non_eliminated_players().map(|p| p.id).collect();
    for player in player_ids {
        if let Some(orders) = store.submission(game.id, player, turn).await? {
            orders_by_player.insert(player, orders);
        } else if let Some(orders) = drafts.get(&player) {
            orders_by_player.insert(player, orders.clone());
        }
    }

    Ok(orders_by_player)
}

/// Stage 2: debt forgiveness.
fn debt_forgiveness(game: &mut GameState) {
    for player in game.players.iter_mut() {
        if player.credits < 0 {
            player.credits = 0;
        }
    }
}

/// Stage 3: movements, re-verifying ownership and applying in declaration
/// order. No collision avoidance: resulting co-location feeds stage 4.
fn apply_movements(game: &mut GameState, orders_by_player: &HashMap<PlayerId, Orders>) {
    let player_ids: Vec<PlayerId> = game.players.iter().map(|p| p.id).collect();
    for player in player_ids {
        let Some(orders) = orders_by_player.get(&player) else {
            continue;
        };
        for mv in &orders.moves {
            if let Some(mech) = game.mechs.iter_mut().find(|m| m.id == mv.mech_id) {
                if mech.owner == player {
                    mech.loc = mv.to;
                }
            }
        }
    }
}

/// Stage 4: combat at every tile with ≥2 distinct mech owners.
fn resolve_combat<R: RngCore>(game: &mut GameState, logs: &mut Vec<CombatLogEntry>, rng: &mut R) {
    let contested: Vec<Location> = {
        let mut tiles: HashSet<Location> = HashSet::new();
        let mut seen = HashSet::new();
        for mech in &game.mechs {
            if !seen.insert((mech.loc, mech.owner)) {
                continue;
            }
            let owners_here = game
                .mechs
                .iter()
                .filter(|m| m.loc == mech.loc)
                .map(|m| m.owner)
                .collect::<HashSet<_>>();
            if owners_here.len() >= 2 {
                tiles.insert(mech.loc);
            }
        }
        tiles.into_iter().collect()
    };

    for loc in contested {
        let forces = game.forces_by_owner_at(loc);
        let participants: Vec<PlayerId> = forces.keys().copied().collect();
        let planet_id = game.planets.iter().find(|p| p.loc == loc).map(|p| p.id);
        let defender = planet_id.and_then(|id| game.planet(id)).and_then(|p| p.owner);
        let fortification = planet_id
            .and_then(|id| game.planet(id))
            .and_then(|p| p.fortification())
            .cloned();

        let outcome = combat::resolve(forces, fortification, defender, rng);

        game.mechs.retain(|m| m.loc != loc);
        game.mechs.extend(outcome.surviving_mechs.clone());

        if let Some(planet_id) = planet_id {
            apply_tile_outcome(game, planet_id, &outcome, defender);
        }

        logs.push(CombatLogEntry::new(
            game.current_turn,
            Some(loc),
            CombatLogKind::Battle {
                participants,
                winner: outcome.occupant,
                casualties: outcome.casualties,
                detail: outcome.log,
            },
        ));
    }
}

fn apply_tile_outcome(
    game: &mut GameState,
    planet_id: super::ids::PlanetId,
    outcome: &combat::CombatOutcome,
    previous_owner: Option<PlayerId>,
) {
    let Some(planet) = game.planet_mut(planet_id) else {
        return;
    };
    let changed_owner = outcome.occupant.is_some() && outcome.occupant != previous_owner;
    if changed_owner {
        planet.transfer_to(outcome.occupant);
        planet.wipe_buildings();
    } else if let Some(fort_building) = planet.fortification_mut() {
        if let Some(updated) = &outcome.fortification {
            fort_building.hp = updated.hp;
        } else {
            planet.buildings.retain(|b| !b.is_fortification());
        }
    }
}

/// Stage 5: capture of planets whose tile hosts exactly one (non-owning)
/// owner's mechs, resolved as a fortification-only pair-combat if a
/// fortification is present, or a plain ownership transfer otherwise.
fn capture_undefended<R: RngCore>(game: &mut GameState, logs: &mut Vec<CombatLogEntry>, rng: &mut R) {
    let planet_ids: Vec<super::ids::PlanetId> = game.planets.iter().map(|p| p.id).collect();

    for planet_id in planet_ids {
        let Some(planet) = game.planet(planet_id) else {
            continue;
        };
        let loc = planet.loc;
        let owner = planet.owner;

        let owners_here: HashSet<PlayerId> = game.mechs_at(loc).map(|m| m.owner).collect();
        if owners_here.len() != 1 {
            continue;
        }
        let intruder = *owners_here.iter().next().unwrap();
        if Some(intruder) == owner {
            continue;
        }

        let fortification = planet.fortification().cloned();
        let previous_owner = owner;

        if let Some(fort) = fortification {
            let forces = game.forces_by_owner_at(loc);
            let outcome = combat::resolve(forces, Some(fort), None, rng);

            game.mechs.retain(|m| m.loc != loc);
            game.mechs.extend(outcome.surviving_mechs.clone());
            apply_tile_outcome(game, planet_id, &outcome, previous_owner);

            if outcome.occupant == Some(intruder) {
                logs.push(CombatLogEntry::new(
                    game.current_turn,
                    Some(loc),
                    CombatLogKind::Capture {
                        planet: planet_id,
                        previous_owner,
                        new_owner: intruder,
                    },
                ));
            }
        } else {
            if let Some(planet) = game.planet_mut(planet_id) {
                planet.transfer_to(Some(intruder));
                planet.wipe_buildings();
            }
            logs.push(CombatLogEntry::new(
                game.current_turn,
                Some(loc),
                CombatLogKind::Capture {
                    planet: planet_id,
                    previous_owner,
                    new_owner: intruder,
                },
            ));
        }
    }
}

/// Stage 6: builds, re-verifying planet ownership and factory presence.
fn apply_builds(
    game: &mut GameState,
    orders_by_player: &HashMap<PlayerId, Orders>,
    logs: &mut Vec<CombatLogEntry>,
) {
    let player_ids: Vec<PlayerId> = game.players.iter().map(|p| p.id).collect();
    let mut next_building_id = game
        .planets
        .iter()
        .flat_map(|p| p.buildings.iter())
        .map(|b| b.id)
        .max()
        .unwrap_or_default();
    let mut next_mech_id = game.mechs.iter().map(|m| m.id).max().unwrap_or_default();

    for player in player_ids {
        let Some(orders) = orders_by_player.get(&player) else {
            continue;
        };
        let mut factories_used_this_turn = HashSet::new();

        for build in &orders.builds {
            let planet_id = build.planet_id();
            let owned_and_ready = match game.planet(planet_id) {
                Some(p) if p.owner == Some(player) => match build {
                    Build::Mech { .. } => p.has_factory() && !factories_used_this_turn.contains(&planet_id),
                    Build::Building { building_type, .. } => p.building_of(*building_type).is_none(),
                },
                _ => false,
            };
            if !owned_and_ready {
                continue;
            }

            let cost = build.cost();
            let Some(p) = game.player_mut(player) else { continue };
            if p.credits < cost {
                continue;
            }
            p.credits -= cost;

            match build {
                Build::Mech { mech_type, .. } => {
                    factories_used_this_turn.insert(planet_id);
                    let serial_slot = p.mech_serials.entry(*mech_type).or_insert(0);
                    let designation = next_designation(*mech_type, *serial_slot);
                    *serial_slot += 1;

                    next_mech_id = next_mech_id.next();
                    let loc = game.planet(planet_id).unwrap().loc;
                    game.mechs
                        .push(Mech::new(next_mech_id, player, *mech_type, loc, designation));

                    logs.push(CombatLogEntry::new(
                        game.current_turn,
                        Some(loc),
                        CombatLogKind::BuildMech {
                            player,
                            planet: planet_id,
                        },
                    ));
                }
                Build::Building { building_type, .. } => {
                    next_building_id = next_building_id.next();
                    let building =
                        super::building::Building::new(next_building_id, planet_id, *building_type);
                    let loc = game.planet(planet_id).unwrap().loc;
                    game.planet_mut(planet_id).unwrap().buildings.push(building);

                    logs.push(CombatLogEntry::new(
                        game.current_turn,
                        Some(loc),
                        CombatLogKind::BuildBuilding {
                            player,
                            planet: planet_id,
                        },
                    ));
                }
            }
        }
    }
}

/// Stage 7: income.
fn apply_income(game: &mut GameState, logs: &mut Vec<CombatLogEntry>) {
    let player_ids: Vec<PlayerId> = game.non_eliminated_players().map(|p| p.id).collect();
    for player in player_ids {
        let income: i64 = game
            .planets_owned_by(player)
            .map(|p| p.base_income + p.mining_building_count() * crate::conf::MINING_INCOME_BONUS)
            .sum();
        if let Some(p) = game.player_mut(player) {
            p.credits += income;
        }
        logs.push(CombatLogEntry::new(
            game.current_turn,
            None,
            CombatLogKind::Income { player, amount: income },
        ));
    }
}

/// Stage 8: maintenance.
fn apply_maintenance(game: &mut GameState, logs: &mut Vec<CombatLogEntry>) {
    let player_ids: Vec<PlayerId> = game.non_eliminated_players().map(|p| p.id).collect();
    for player in player_ids {
        let cost: i64 = game
            .mechs_owned_by(player)
            .map(|m| m.mech_type.maintenance_cost())
            .sum();

        let failed = {
            let p = game.player_mut(player).unwrap();
            p.credits -= cost;
            p.maintenance_failed = p.credits < 0;
            p.maintenance_failed
        };

        logs.push(CombatLogEntry::new(
            game.current_turn,
            None,
            CombatLogKind::Maintenance { player, cost },
        ));

        if failed {
            for mech in game.mechs.iter_mut().filter(|m| m.owner == player) {
                mech.hp -= 1;
            }
            game.mechs.retain(|m| !(m.owner == player && m.hp <= 0));
            logs.push(CombatLogEntry::new(
                game.current_turn,
                None,
                CombatLogKind::MaintenanceFailure { player },
            ));
        }
    }
}

/// Stage 9: repair.
fn apply_repair(game: &mut GameState, logs: &mut Vec<CombatLogEntry>) {
    let mut repaired: HashSet<PlayerId> = HashSet::new();

    for mech in game.mechs.iter_mut() {
        let failed = game.players.iter().find(|p| p.id == mech.owner).map_or(true, |p| p.maintenance_failed);
        if !failed {
            mech.heal(crate::conf::MECH_REPAIR_PER_TURN);
            repaired.insert(mech.owner);
        }
    }

    for planet in game.planets.iter_mut() {
        let Some(owner) = planet.owner else { continue };
        let failed = game
            .players
            .iter()
            .find(|p| p.id == owner)
            .map_or(true, |p| p.maintenance_failed);
        if failed {
            continue;
        }
        if let Some(fort) = planet.fortification_mut() {
            fort.repair();
            repaired.insert(owner);
        }
    }

    for player in repaired {
        logs.push(CombatLogEntry::new(
            game.current_turn,
            None,
            CombatLogKind::Repair { player },
        ));
    }
}

/// Stage 10: eliminations.
fn apply_eliminations(game: &mut GameState, logs: &mut Vec<CombatLogEntry>) {
    let player_ids: Vec<PlayerId> = game.non_eliminated_players().map(|p| p.id).collect();
    for player in player_ids {
        let has_planets = game.planets_owned_by(player).next().is_some();
        let has_mechs = game.mechs_owned_by(player).next().is_some();
        if !has_planets && !has_mechs {
            if let Some(p) = game.player_mut(player) {
                p.eliminated = true;
            }
            logs.push(CombatLogEntry::new(
                game.current_turn,
                None,
                CombatLogKind::Defeat { player },
            ));
        }
    }
}

/// Stage 11: win check.
fn check_win(game: &mut GameState, logs: &mut Vec<CombatLogEntry>) {
    let remaining: Vec<PlayerId> = game.non_eliminated_players().map(|p| p.id).collect();
    if remaining.len() == 1 {
        let winner = remaining[0];
        game.status = GameStatus::Finished;
        game.winner = Some(winner);
        logs.push(CombatLogEntry::new(
            game.current_turn,
            None,
            CombatLogKind::Victory { winner },
        ));
    }
}

/// Stage 12: advance, unless the game just finished.
fn advance(game: &mut GameState, now: u64, logs: &mut Vec<CombatLogEntry>) {
    if game.status == GameStatus::Finished {
        return;
    }
    for player in game.players.iter_mut().filter(|p| !p.eliminated) {
        player.submitted_this_turn = false;
    }
    game.current_turn += 1;
    game.turn_deadline = now + game.turn_timer_secs;

    for player in game.non_eliminated_players().map(|p| p.id).collect::<Vec<_>>() {
        logs.push(CombatLogEntry::new(
            game.current_turn,
            None,
            CombatLogKind::TurnStart { player },
        ));
    }
}

/// Fatal-class invariant checks (spec.md §7/§8), run once at the end of the
/// pipeline. A failure here means the turn is not saved; the Dispatcher
/// retries the tick and an operator must intervene if it keeps failing.
fn verify_invariants(game: &GameState) -> Result<(), PipelineError> {
    for mech in &game.mechs {
        if !mech.loc.in_bounds(game.grid_size) {
            return Err(PipelineError::InvariantViolated {
                stage: "movements",
                detail: format!("mech {:?} out of bounds at {}", mech.id, mech.loc),
            });
        }
        if mech.hp <= 0 || mech.hp > mech.max_hp {
            return Err(PipelineError::InvariantViolated {
                stage: "combat",
                detail: format!("mech {:?} has invalid hp {}", mech.id, mech.hp),
            });
        }
    }
    for planet in &game.planets {
        let mut seen = HashSet::new();
        for building in &planet.buildings {
            if !seen.insert(building.building_type) {
                return Err(PipelineError::InvariantViolated {
                    stage: "builds",
                    detail: format!("planet {:?} has duplicate {:?}", planet.id, building.building_type),
                });
            }
            if building.building_type == BuildingType::Fortification
                && (building.hp < 0 || building.hp > crate::conf::FORTIFICATION_MAX_HP)
            {
                return Err(PipelineError::InvariantViolated {
                    stage: "repair",
                    detail: format!("planet {:?} fortification hp {} out of bounds", planet.id, building.hp),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::building::Building;
    use crate::game::ids::{BuildingId, GameId, MechId, PlanetId, PlayerId};
    use crate::game::mech::MechType;
    use crate::game::planet::Planet;
    use crate::game::player::{EmpireColor, Player, PlayerKind};
    use crate::game::store::{InMemoryStore, Store};
    use crate::util::{GridSize, Location};
    use rand::{rngs::StdRng, SeedableRng};

    fn two_player_game() -> GameState {
        let mut game = GameState::new(GameId::new(1), "t".into(), GridSize::new(25).unwrap(), 2, 60);
        game.status = GameStatus::Active;
        game.current_turn = 1;

        let p1 = PlayerId::new(1);
        let p2 = PlayerId::new(2);
        game.players.push(Player::new(p1, 1, PlayerKind::Human, "A".into(), EmpireColor(1)));
        game.players.push(Player::new(p2, 2, PlayerKind::Human, "B".into(), EmpireColor(2)));

        let mut home1 = Planet::new(PlanetId::new(1), Location::new(1, 1), 5, "Home1".into());
        home1.owner = Some(p1);
        home1.homeworld = true;
        let mut home2 = Planet::new(PlanetId::new(2), Location::new(20, 20), 5, "Home2".into());
        home2.owner = Some(p2);
        home2.homeworld = true;
        game.planets.push(home1);
        game.planets.push(home2);

        game
    }

    #[tokio::test]
    async fn empty_turn_increments_credits_and_turn() {
        let mut game = two_player_game();
        game.turn_deadline = 1000;
        let store = InMemoryStore::new();
        store.create_game(game.clone()).await.unwrap();

        let mut rng = StdRng::seed_from_u64(1);
        process_turn(&store, game.id, 2000, &mut rng).await.unwrap();

        let updated = store.load_game(game.id).await.unwrap();
        assert_eq!(updated.current_turn, 2);
        assert_eq!(updated.player(PlayerId::new(1)).unwrap().credits, 5);
        assert_eq!(updated.player(PlayerId::new(2)).unwrap().credits, 5);

        let logs = store.logs_for(game.id).await.unwrap();
        assert!(!logs.iter().any(|l| matches!(l.kind, CombatLogKind::Battle { .. })));
        assert!(logs.iter().any(|l| matches!(l.kind, CombatLogKind::TurnStart { .. })));
    }

    #[tokio::test]
    async fn adjacent_move_updates_coords() {
        let mut game = two_player_game();
        let mech_id = MechId::new(1);
        game.mechs.push(Mech::new(
            mech_id,
            PlayerId::new(1),
            MechType::Light,
            Location::new(5, 5),
            "Light-0001".into(),
        ));
        let store = InMemoryStore::new();
        store.create_game(game.clone()).await.unwrap();
        store
            .submit_orders(
                game.id,
                PlayerId::new(1),
                1,
                Orders {
                    moves: vec![super::super::orders::MoveOrder {
                        mech_id,
                        to: Location::new(6, 5),
                    }],
                    builds: vec![],
                },
            )
            .await
            .unwrap();

        let mut rng = StdRng::seed_from_u64(1);
        process_turn(&store, game.id, 2000, &mut rng).await.unwrap();

        let updated = store.load_game(game.id).await.unwrap();
        let mech = updated.mechs.iter().find(|m| m.id == mech_id).unwrap();
        assert_eq!(mech.loc, Location::new(6, 5));
    }

    #[tokio::test]
    async fn factory_build_deducts_credits_and_spawns_mech() {
        let mut game = two_player_game();
        game.player_mut(PlayerId::new(1)).unwrap().credits = 10;
        game.planet_mut(PlanetId::new(1))
            .unwrap()
            .buildings
            .push(Building::new(BuildingId::new(1), PlanetId::new(1), BuildingType::Factory));
        let store = InMemoryStore::new();
        store.create_game(game.clone()).await.unwrap();
        store
            .submit_orders(
                game.id,
                PlayerId::new(1),
                1,
                Orders {
                    moves: vec![],
                    builds: vec![Build::Mech {
                        planet_id: PlanetId::new(1),
                        mech_type: MechType::Medium,
                    }],
                },
            )
            .await
            .unwrap();

        let mut rng = StdRng::seed_from_u64(1);
        process_turn(&store, game.id, 2000, &mut rng).await.unwrap();

        let updated = store.load_game(game.id).await.unwrap();
        // 10 - 5 (medium build cost) + 5 (homeworld income) - 2 (the new medium's
        // upkeep, charged the same turn it's built) = 8
        assert_eq!(updated.player(PlayerId::new(1)).unwrap().credits, 8);
        let new_mech = updated
            .mechs
            .iter()
            .find(|m| m.mech_type == MechType::Medium)
            .unwrap();
        assert_eq!(new_mech.hp, 10);
        let logs = store.logs_for(game.id).await.unwrap();
        assert!(logs.iter().any(|l| matches!(l.kind, CombatLogKind::BuildMech { .. })));
    }

    #[tokio::test]
    async fn undefended_capture_wipes_buildings_and_transfers_owner() {
        let mut game = two_player_game();
        // Neutral planet with no buildings, at the tile a mech will move onto.
        let mut neutral = Planet::new(PlanetId::new(3), Location::new(10, 10), 2, "Neutral".into());
        neutral.owner = None;
        game.planets.push(neutral);
        let mech_id = MechId::new(1);
        game.mechs.push(Mech::new(
            mech_id,
            PlayerId::new(1),
            MechType::Light,
            Location::new(9, 10),
            "Light-0001".into(),
        ));
        let store = InMemoryStore::new();
        store.create_game(game.clone()).await.unwrap();
        store
            .submit_orders(
                game.id,
                PlayerId::new(1),
                1,
                Orders {
                    moves: vec![super::super::orders::MoveOrder {
                        mech_id,
                        to: Location::new(10, 10),
                    }],
                    builds: vec![],
                },
            )
            .await
            .unwrap();

        let mut rng = StdRng::seed_from_u64(1);
        process_turn(&store, game.id, 2000, &mut rng).await.unwrap();

        let updated = store.load_game(game.id).await.unwrap();
        let neutral = updated.planet(PlanetId::new(3)).unwrap();
        assert_eq!(neutral.owner, Some(PlayerId::new(1)));
        assert!(neutral.buildings.is_empty());
        let logs = store.logs_for(game.id).await.unwrap();
        assert!(logs.iter().any(|l| matches!(l.kind, CombatLogKind::Capture { .. })));
    }

    #[tokio::test]
    async fn fortified_garrisoned_planet_repels_a_lone_attacker() {
        let mut game = two_player_game();
        game.planet_mut(PlanetId::new(2))
            .unwrap()
            .buildings
            .push(Building::new(
                BuildingId::new(1),
                PlanetId::new(2),
                BuildingType::Fortification,
            ));
        game.mechs.push(Mech::new(
            MechId::new(1),
            PlayerId::new(2),
            MechType::Assault,
            Location::new(20, 20),
            "Assault-0001".into(),
        ));
        let attacker_id = MechId::new(2);
        game.mechs.push(Mech::new(
            attacker_id,
            PlayerId::new(1),
            MechType::Light,
            Location::new(19, 20),
            "Light-0001".into(),
        ));
        let store = InMemoryStore::new();
        store.create_game(game.clone()).await.unwrap();
        store
            .submit_orders(
                game.id,
                PlayerId::new(1),
                1,
                Orders {
                    moves: vec![super::super::orders::MoveOrder {
                        mech_id: attacker_id,
                        to: Location::new(20, 20),
                    }],
                    builds: vec![],
                },
            )
            .await
            .unwrap();

        let mut rng = StdRng::seed_from_u64(3);
        process_turn(&store, game.id, 2000, &mut rng).await.unwrap();

        let updated = store.load_game(game.id).await.unwrap();
        // The lone light mech stands no chance against an assault garrison
        // backed by a fortification; the planet stays with its owner.
        assert_eq!(updated.planet(PlanetId::new(2)).unwrap().owner, Some(PlayerId::new(2)));
        assert!(updated.mechs.iter().all(|m| m.id != attacker_id));
        let logs = store.logs_for(game.id).await.unwrap();
        assert!(logs.iter().any(|l| matches!(l.kind, CombatLogKind::Battle { .. })));
    }

    #[tokio::test]
    async fn maintenance_failure_damages_mechs_and_is_forgiven_next_turn() {
        let mut game = two_player_game();
        game.player_mut(PlayerId::new(1)).unwrap().credits = 0;
        for i in 0..10u64 {
            game.mechs.push(Mech::new(
                MechId::new(i + 1),
                PlayerId::new(1),
                MechType::Heavy,
                Location::new(1, 1),
                format!("Heavy-{:04}", i + 1),
            ));
        }
        let store = InMemoryStore::new();
        store.create_game(game.clone()).await.unwrap();

        let mut rng = StdRng::seed_from_u64(1);
        process_turn(&store, game.id, 2000, &mut rng).await.unwrap();

        let updated = store.load_game(game.id).await.unwrap();
        let p1 = updated.player(PlayerId::new(1)).unwrap();
        assert!(p1.maintenance_failed);
        assert_eq!(p1.credits, 5 - 30);
        for mech in updated.mechs_owned_by(PlayerId::new(1)) {
            assert_eq!(mech.hp, mech.max_hp - 1);
        }

        process_turn(&store, game.id, 3000, &mut rng).await.unwrap();
        let updated = store.load_game(game.id).await.unwrap();
        // Stage 2 wiped the -25 carried in from last turn before income/upkeep
        // ran again; with this fixture's upkeep still outstripping income the
        // player ends up back at -25, not a cumulative -50.
        assert_eq!(updated.player(PlayerId::new(1)).unwrap().credits, 5 - 30);
    }
}
