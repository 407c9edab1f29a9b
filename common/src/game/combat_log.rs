//! Append-only combat/event log entries (spec.md §3's `Combat Log` entity).
//!
//! Distinct from the old teacher `log` module (a UI-presentation channel
//! for the now-removed TUI); this is durable, structured audit data that
//! the Turn Processor appends during every pipeline stage.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::combat::{Casualties, CombatLogRecord};
use super::ids::{PlayerId, PlanetId};
use crate::util::Location;

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum CombatLogKind {
    Battle {
        participants: Vec<PlayerId>,
        winner: Option<PlayerId>,
        casualties: BTreeMap<PlayerId, Casualties>,
        detail: Vec<CombatLogRecord>,
    },
    Capture {
        planet: PlanetId,
        previous_owner: Option<PlayerId>,
        new_owner: PlayerId,
    },
    Income {
        player: PlayerId,
        amount: i64,
    },
    Repair {
        player: PlayerId,
    },
    Maintenance {
        player: PlayerId,
        cost: i64,
    },
    MaintenanceFailure {
        player: PlayerId,
    },
    BuildMech {
        player: PlayerId,
        planet: PlanetId,
    },
    BuildBuilding {
        player: PlayerId,
        planet: PlanetId,
    },
    TurnStart {
        player: PlayerId,
    },
    Defeat {
        player: PlayerId,
    },
    Victory {
        winner: PlayerId,
    },
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct CombatLogEntry {
    pub turn: u64,
    pub loc: Option<Location>,
    pub kind: CombatLogKind,
}

impl CombatLogEntry {
    pub fn new(turn: u64, loc: Option<Location>, kind: CombatLogKind) -> Self {
        Self { turn, loc, kind }
    }
}
