//! Newtype identifiers, in the teacher's `CityID`/`UnitID` style: a thin
//! wrapper around `u64` with `new`/`next` constructors rather than a bare
//! integer, so the compiler catches an accidental planet id where a mech id
//! belongs.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($name:ident) => {
        #[derive(
            Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
        )]
        pub struct $name(u64);

        impl $name {
            pub fn new(id: u64) -> Self {
                Self(id)
            }

            pub fn next(self) -> Self {
                Self(self.0 + 1)
            }

            pub fn raw(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(GameId);
id_type!(PlanetId);
id_type!(BuildingId);
id_type!(MechId);

/// A player's 1-based seat number within a game, per spec.md's `player
/// number in [1, maxPlayers]`. Kept distinct from `PlayerId` (a durable
/// identity that survives elimination/revival) in case the two ever diverge;
/// today they're assigned together at join time.
pub type PlayerNum = u8;

id_type!(PlayerId);
