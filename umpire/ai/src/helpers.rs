//! Shared movement and targeting helpers used by every strategy, in the
//! same spirit as the teacher's `random.rs`/`skip.rs` strategies sharing
//! `ActionwiseTurnTaker2`'s default methods rather than each reimplementing
//! pathing from scratch.

use std::collections::HashSet;

use common::game::mech::{Mech, MechType};
use common::game::view::{PlayerView, VisiblePlanet};
use common::util::{GridSize, Location};

/// One tile toward `to` from `from`: dominant axis first, falling back to
/// the orthogonal axis if the dominant step would leave the grid.
pub fn one_step_toward(from: Location, to: Location, grid_size: GridSize) -> Location {
    if from == to {
        return from;
    }
    let dx = to.x as i32 - from.x as i32;
    let dy = to.y as i32 - from.y as i32;
    let step_x = dx.signum();
    let step_y = dy.signum();

    let dominant_is_x = dx.abs() >= dy.abs();
    let primary = clamp_step(from, if dominant_is_x { step_x } else { 0 }, if dominant_is_x { 0 } else { step_y });
    if primary.in_bounds(grid_size) {
        return primary;
    }
    let fallback = clamp_step(from, if dominant_is_x { 0 } else { step_x }, if dominant_is_x { step_y } else { 0 });
    if fallback.in_bounds(grid_size) {
        fallback
    } else {
        from
    }
}

fn clamp_step(from: Location, dx: i32, dy: i32) -> Location {
    let x = (from.x as i32 + dx).max(0) as u16;
    let y = (from.y as i32 + dy).max(0) as u16;
    Location::new(x, y)
}

/// How many tiles within radius `radius` of `candidate` are NOT currently
/// visible; higher means `candidate` leads deeper into unexplored territory.
pub fn frontier_score(candidate: Location, radius: u16, grid_size: GridSize, visible: &HashSet<Location>) -> usize {
    grid_size.window(candidate, radius).filter(|t| !visible.contains(t)).count()
}

/// The best of the 8 neighboring tiles (plus staying put) to step toward
/// from `from`, ranked by how much unexplored territory it opens up.
pub fn best_frontier_step(from: Location, grid_size: GridSize, visible: &HashSet<Location>) -> Location {
    let mut best = from;
    let mut best_score = frontier_score(from, 5, grid_size, visible);
    for dx in -1i32..=1 {
        for dy in -1i32..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let candidate = clamp_step(from, dx, dy);
            if !candidate.in_bounds(grid_size) {
                continue;
            }
            let score = frontier_score(candidate, 5, grid_size, visible);
            if score > best_score {
                best_score = score;
                best = candidate;
            }
        }
    }
    best
}

pub fn count_type(view: &PlayerView, mech_type: MechType) -> usize {
    view.own_mechs.iter().filter(|m| m.mech_type == mech_type).count()
}

pub fn scout_count(view: &PlayerView) -> usize {
    count_type(view, MechType::Light)
}

/// Owned heavy/assault strength, the spec's informal "combat strength"
/// figure used to gate offensives.
pub fn combat_strength(view: &PlayerView) -> usize {
    count_type(view, MechType::Heavy) + count_type(view, MechType::Assault)
}

pub fn own_factory_planets<'a>(view: &'a PlayerView) -> impl Iterator<Item = &'a VisiblePlanet> {
    view.visible_planets
        .iter()
        .filter(move |p| p.owner == Some(view.player) && p.buildings.iter().any(|b| b.is_factory()))
}

/// Tile locations hosting at least `min_count` of the owner's own
/// heavy-or-assault mechs, a naive "attack group" detector: a strike force
/// forms wherever enough heavy hitters have rendezvoused.
pub fn attack_group_locations(own_mechs: &[Mech], min_count: usize) -> Vec<Location> {
    let mut counts: std::collections::HashMap<Location, usize> = std::collections::HashMap::new();
    for m in own_mechs {
        if matches!(m.mech_type, MechType::Heavy | MechType::Assault) {
            *counts.entry(m.loc).or_insert(0) += 1;
        }
    }
    counts.into_iter().filter(|(_, c)| *c >= min_count).map(|(l, _)| l).collect()
}

/// The nearest (Chebyshev) visible planet not owned by `view.player`, if
/// any — a capture target for offense-minded strategies.
pub fn nearest_uncontrolled_planet(view: &PlayerView, from: Location) -> Option<Location> {
    view.visible_planets
        .iter()
        .filter(|p| p.owner != Some(view.player))
        .min_by_key(|p| p.loc.chebyshev_distance(from))
        .map(|p| p.loc)
}

trait HasFactory {
    fn is_factory(&self) -> bool;
}

impl HasFactory for common::game::building::Building {
    fn is_factory(&self) -> bool {
        self.building_type == common::game::building::BuildingType::Factory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_step_toward_moves_along_dominant_axis() {
        let grid = GridSize::new(25).unwrap();
        let from = Location::new(5, 5);
        let to = Location::new(10, 6);
        let step = one_step_toward(from, to, grid);
        assert_eq!(step, Location::new(6, 5));
    }

    #[test]
    fn one_step_toward_falls_back_at_the_edge() {
        let grid = GridSize::new(25).unwrap();
        let from = Location::new(24, 5);
        let to = Location::new(24, 10);
        let step = one_step_toward(from, to, grid);
        assert_eq!(step, Location::new(24, 6));
    }
}
