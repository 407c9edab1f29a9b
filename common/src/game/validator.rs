//! The order validator (spec.md §4.3): a reusable predicate filtering or
//! rejecting orders against current state, shared by human submission
//! (strict mode) and AI submission (filtering mode).

use std::collections::HashSet;

use super::error::GameError;
use super::ids::{PlanetId, PlayerId};
use super::orders::{Build, FilteredOrders, MoveOrder, Orders};
use super::GameState;

fn validate_move(game: &GameState, player: PlayerId, order: &MoveOrder) -> Result<(), GameError> {
    let mech = game
        .mechs
        .iter()
        .find(|m| m.id == order.mech_id)
        .ok_or(GameError::NoSuchMech(order.mech_id))?;

    if mech.owner != player {
        return Err(GameError::MechNotOwned(order.mech_id));
    }

    if !order.to.in_bounds(game.grid_size) {
        return Err(GameError::OutOfBounds(order.to));
    }

    if mech.loc.chebyshev_distance(order.to) != 1 {
        return Err(GameError::InvalidMoveDestination);
    }

    Ok(())
}

fn validate_build(
    game: &GameState,
    player: PlayerId,
    build: &Build,
    factories_used: &HashSet<PlanetId>,
) -> Result<(), GameError> {
    let planet_id = build.planet_id();
    let planet = game
        .planet(planet_id)
        .ok_or(GameError::NoSuchPlanet(planet_id))?;

    if planet.owner != Some(player) {
        return Err(GameError::PlanetNotOwned(planet_id));
    }

    match build {
        Build::Mech { .. } => {
            if !planet.has_factory() {
                return Err(GameError::NoFactory(planet_id));
            }
            if factories_used.contains(&planet_id) {
                return Err(GameError::FactoryAlreadyUsedThisTurn);
            }
        }
        Build::Building { building_type, .. } => {
            if planet.building_of(*building_type).is_some() {
                return Err(GameError::DuplicateBuilding(planet_id));
            }
        }
    }

    Ok(())
}

fn validate_budget(game: &GameState, player: PlayerId, builds: &[Build]) -> Result<(), GameError> {
    if builds.is_empty() {
        return Ok(());
    }
    let spent: i64 = builds.iter().map(Build::cost).sum();
    let available = game.player(player).map(|p| p.credits).unwrap_or(0);
    if spent > available {
        return Err(GameError::InsufficientCredits { spent, available });
    }
    Ok(())
}

/// Strict validation (human submission): reject the whole submission at the
/// first error encountered.
pub fn validate_strict(game: &GameState, player: PlayerId, orders: &Orders) -> Result<(), GameError> {
    for mv in &orders.moves {
        validate_move(game, player, mv)?;
    }

    let mut factories_used = HashSet::new();
    for build in &orders.builds {
        validate_build(game, player, build, &factories_used)?;
        if matches!(build, Build::Mech { .. }) {
            factories_used.insert(build.planet_id());
        }
    }

    validate_budget(game, player, &orders.builds)?;

    Ok(())
}

/// Filtering validation (AI submission): keep every order that passes,
/// silently discard (with a reason) every order that doesn't.
pub fn filter_valid(game: &GameState, player: PlayerId, orders: &Orders) -> FilteredOrders {
    let mut result = FilteredOrders::default();

    for mv in &orders.moves {
        match validate_move(game, player, mv) {
            Ok(()) => result.accepted.moves.push(*mv),
            Err(e) => result.discarded.push(format!("move {:?}: {}", mv.mech_id, e)),
        }
    }

    let mut factories_used = HashSet::new();
    let mut accepted_builds = Vec::new();
    for build in &orders.builds {
        match validate_build(game, player, build, &factories_used) {
            Ok(()) => {
                if matches!(build, Build::Mech { .. }) {
                    factories_used.insert(build.planet_id());
                }
                accepted_builds.push(*build);
            }
            Err(e) => result
                .discarded
                .push(format!("build on {:?}: {}", build.planet_id(), e)),
        }
    }

    // Budget is enforced last, against the whole accepted set, dropping
    // builds from the tail until the remainder fits.
    let available = game.player(player).map(|p| p.credits).unwrap_or(0);
    let mut spent = 0i64;
    for build in accepted_builds {
        let cost = build.cost();
        if spent + cost <= available {
            spent += cost;
            result.accepted.builds.push(build);
        } else {
            result
                .discarded
                .push(format!("build on {:?}: insufficient credits", build.planet_id()));
        }
    }

    result
}
