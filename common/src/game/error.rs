//! Error taxonomy (spec.md §7).
//!
//! `GameError` covers Validation/Authorization/Not-found/Conflict: errors
//! returned directly to a caller that never mutate engine state. The
//! teacher's `GameError` derives `failure::Fail`; `failure` is unmaintained,
//! so this uses `thiserror`, the crate the rest of the example corpus
//! reaches for instead.

use serde::{Deserialize, Serialize};

use super::ids::{MechId, PlanetId, PlayerId};
use crate::util::Location;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, thiserror::Error)]
pub enum GameError {
    #[error("There is no player {0}")]
    NoSuchPlayer(PlayerId),

    #[error("Player {0} is eliminated")]
    PlayerEliminated(PlayerId),

    #[error("No mech with id {0:?} exists")]
    NoSuchMech(MechId),

    #[error("Mech {0:?} is not controlled by the submitting player")]
    MechNotOwned(MechId),

    #[error("No planet with id {0:?} exists")]
    NoSuchPlanet(PlanetId),

    #[error("Planet {0:?} is not owned by the submitting player")]
    PlanetNotOwned(PlanetId),

    #[error("Invalid move destination")]
    InvalidMoveDestination,

    #[error("Destination {0} is out of bounds")]
    OutOfBounds(Location),

    #[error("Planet {0:?} has no factory")]
    NoFactory(PlanetId),

    #[error("Each factory can only produce 1 mech per turn")]
    FactoryAlreadyUsedThisTurn,

    #[error("Planet {0:?} already has a building of that type")]
    DuplicateBuilding(PlanetId),

    #[error("Insufficient credits: {spent} requested against {available} available")]
    InsufficientCredits { spent: i64, available: i64 },

    #[error("The requested empire color is already taken")]
    ColorTaken,

    #[error("The game is full")]
    GameFull,

    #[error("It is not possible to submit orders for a game that is not active")]
    GameNotActive,

    #[error("Player {0} has already submitted this turn")]
    AlreadySubmitted(PlayerId),

    #[error("Only the host may perform this action")]
    NotHost,

    #[error("At least 2 players and unique colors are required to start")]
    StartRequirementsNotMet,

    #[error("No game with id {0} exists")]
    NoSuchGame(u64),

    #[error("Player {0} is not a member of this game")]
    NotInGame(PlayerId),

    #[error("This action requires the game to be in the waiting lobby")]
    GameNotWaiting,

    #[error("Grid size must be one of {{25, 50, 100}}; got {0}")]
    InvalidGridSize(u16),

    #[error("Max players must be within [2, 8]; got {0}")]
    InvalidMaxPlayers(usize),

    #[error("Turn timer must be within [30, 604800] seconds; got {0}")]
    InvalidTurnTimer(u64),

    #[error("Map generation failed to place every homeworld within its attempt budget")]
    MapGenerationFailed,

    #[error("storage unavailable: {0}")]
    Storage(String),
}

/// Internal invariant violations detected at runtime inside the Turn
/// Processor (spec.md §7's Fatal class) and storage failures (the
/// Transient class). These never reach an RPC caller directly; the
/// Dispatcher logs them and retries or halts the affected game only.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("storage unavailable: {0}")]
    Storage(String),

    #[error("invariant violated after stage '{stage}': {detail}")]
    InvariantViolated { stage: &'static str, detail: String },
}
