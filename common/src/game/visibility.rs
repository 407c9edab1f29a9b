//! The fog-of-war visibility function (spec.md §4.1).
//!
//! A pure function: no line-of-sight, no obstruction, no memory of
//! previously-seen tiles. Called once per `/state` request and from within
//! the AI strategies when they build a `PlayerView`.

use std::collections::HashSet;

use crate::conf;
use crate::util::{GridSize, Location};

/// The set of tiles visible to a player who owns `planets` and `mechs`.
///
/// Idempotent, deterministic, side-effect-free: calling it twice with the
/// same inputs always yields the same set.
pub fn visibility(
    grid_size: GridSize,
    planets: impl IntoIterator<Item = Location>,
    mechs: impl IntoIterator<Item = Location>,
) -> HashSet<Location> {
    let mut visible = HashSet::new();

    for loc in planets {
        visible.extend(grid_size.window(loc, conf::VISIBILITY_RADIUS_PLANET));
    }
    for loc in mechs {
        visible.extend(grid_size.window(loc, conf::VISIBILITY_RADIUS_MECH));
    }

    visible
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planet_illuminates_radius_three() {
        let size = GridSize::new(25).unwrap();
        let visible = visibility(size, vec![Location::new(10, 10)], vec![]);
        assert!(visible.contains(&Location::new(13, 10)));
        assert!(!visible.contains(&Location::new(14, 10)));
    }

    #[test]
    fn mech_illuminates_radius_two() {
        let size = GridSize::new(25).unwrap();
        let visible = visibility(size, vec![], vec![Location::new(10, 10)]);
        assert!(visible.contains(&Location::new(12, 10)));
        assert!(!visible.contains(&Location::new(13, 10)));
    }

    #[test]
    fn is_idempotent_and_order_independent() {
        let size = GridSize::new(25).unwrap();
        let a = visibility(
            size,
            vec![Location::new(1, 1), Location::new(20, 20)],
            vec![Location::new(5, 5)],
        );
        let b = visibility(
            size,
            vec![Location::new(20, 20), Location::new(1, 1)],
            vec![Location::new(5, 5)],
        );
        assert_eq!(a, b);
    }
}
