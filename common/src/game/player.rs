//! Players: the humans and AIs competing in a game.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ids::{PlayerId, PlayerNum};
use super::mech::MechType;

/// The five named AI policies the spec requires (§4.6). The `Strategy`
/// implementations themselves live in the `warbots-ai` crate, which is kept
/// separate from `warbots-common` so the core engine has no dependency on
/// any particular policy, in the same separation the teacher draws between
/// `common` (the engine) and `umpire-ai` (the policies).
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum AiStrategyKind {
    Balanced,
    Expansionist,
    Infestor,
    Defensive,
    Generic,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum PlayerKind {
    Human,
    Ai(AiStrategyKind),
}

impl PlayerKind {
    pub fn is_ai(&self) -> bool {
        matches!(self, PlayerKind::Ai(_))
    }
}

/// An empire's identifying color. Spec.md requires these be pairwise
/// distinct among active players within a game.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct EmpireColor(pub u32);

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Player {
    pub id: PlayerId,
    pub player_num: PlayerNum,
    pub kind: PlayerKind,
    pub empire_name: String,
    pub empire_color: EmpireColor,
    pub credits: i64,
    pub eliminated: bool,
    pub submitted_this_turn: bool,

    /// Set when maintenance (stage 8 of the Turn Processor) left this
    /// player's credits negative on the turn just processed; consulted by
    /// stage 9 (Repair) to skip healing for this player this turn.
    pub maintenance_failed: bool,

    /// Highest designation serial issued so far per mech type, so a
    /// destroyed mech's number is never reissued (spec.md §8: designations
    /// are "unique per (owner, type) and monotonic in creation order").
    pub mech_serials: BTreeMap<MechType, u64>,
}

impl Player {
    pub fn new(
        id: PlayerId,
        player_num: PlayerNum,
        kind: PlayerKind,
        empire_name: String,
        empire_color: EmpireColor,
    ) -> Self {
        Self {
            id,
            player_num,
            kind,
            empire_name,
            empire_color,
            credits: 0,
            eliminated: false,
            submitted_this_turn: false,
            maintenance_failed: false,
            mech_serials: BTreeMap::new(),
        }
    }
}
