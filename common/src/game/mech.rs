//! Mobile units.

use std::fmt;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::conf;
use crate::util::Location;

use super::ids::{MechId, PlayerId};

#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum MechType {
    Light,
    Medium,
    Heavy,
    Assault,
}

impl MechType {
    pub const ALL: [MechType; 4] = [
        MechType::Light,
        MechType::Medium,
        MechType::Heavy,
        MechType::Assault,
    ];

    pub fn build_cost(self) -> i64 {
        match self {
            MechType::Light => conf::MECH_COST_LIGHT,
            MechType::Medium => conf::MECH_COST_MEDIUM,
            MechType::Heavy => conf::MECH_COST_HEAVY,
            MechType::Assault => conf::MECH_COST_ASSAULT,
        }
    }

    pub fn maintenance_cost(self) -> i64 {
        match self {
            MechType::Light => conf::MECH_MAINTENANCE_LIGHT,
            MechType::Medium => conf::MECH_MAINTENANCE_MEDIUM,
            MechType::Heavy => conf::MECH_MAINTENANCE_HEAVY,
            MechType::Assault => conf::MECH_MAINTENANCE_ASSAULT,
        }
    }

    /// Starting/maximum hit points. Spec scenario 3 pins `medium` at 10; the
    /// rest scale with build cost and damage dice in the same proportion
    /// (an Open Question the spec leaves to the implementer, resolved here
    /// and recorded in DESIGN.md).
    pub fn max_hp(self) -> i64 {
        match self {
            MechType::Light => 6,
            MechType::Medium => 10,
            MechType::Heavy => 18,
            MechType::Assault => 26,
        }
    }

    /// Roll this mech type's damage dice. The full rolled amount is applied
    /// without clamping to the target's remaining hp.
    pub fn roll_damage<R: RngCore>(self, rng: &mut R) -> i64 {
        match self {
            MechType::Light => roll_dice(rng, 1, 4),
            MechType::Medium => roll_dice(rng, 1, 6),
            MechType::Heavy => roll_dice(rng, 2, 6),
            MechType::Assault => roll_dice(rng, 2, 8),
        }
    }

    fn designation_prefix(self) -> &'static str {
        match self {
            MechType::Light => "Light",
            MechType::Medium => "Medium",
            MechType::Heavy => "Heavy",
            MechType::Assault => "Assault",
        }
    }
}

impl fmt::Display for MechType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Roll `count` dice of `sides` sides and sum them. Shared by mech damage
/// rolls and the fortification's 2d6 attack.
pub fn roll_dice<R: RngCore>(rng: &mut R, count: u32, sides: u32) -> i64 {
    (0..count)
        .map(|_| 1 + (rng.next_u32() % sides) as i64)
        .sum()
}

/// Build a fresh designation of the form `Type-NNNN`, one greater than the
/// highest existing serial for this (owner, type) pair, left-padded to at
/// least `conf::DESIGNATION_MIN_DIGITS` digits.
pub fn next_designation(mech_type: MechType, existing_max_serial: u64) -> String {
    format!(
        "{}-{:0width$}",
        mech_type.designation_prefix(),
        existing_max_serial + 1,
        width = conf::DESIGNATION_MIN_DIGITS
    )
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Mech {
    pub id: MechId,
    pub owner: PlayerId,
    pub mech_type: MechType,
    pub hp: i64,
    pub max_hp: i64,
    pub loc: Location,
    pub designation: String,
}

impl Mech {
    pub fn new(
        id: MechId,
        owner: PlayerId,
        mech_type: MechType,
        loc: Location,
        designation: String,
    ) -> Self {
        Self {
            id,
            owner,
            mech_type,
            hp: mech_type.max_hp(),
            max_hp: mech_type.max_hp(),
            loc,
            designation,
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.hp <= 0
    }

    pub fn heal(&mut self, amount: i64) {
        self.hp = (self.hp + amount).min(self.max_hp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn designation_is_left_padded_and_monotonic() {
        assert_eq!(next_designation(MechType::Light, 0), "Light-0001");
        assert_eq!(next_designation(MechType::Light, 1), "Light-0002");
        assert_eq!(next_designation(MechType::Heavy, 9999), "Heavy-10000");
    }
}
