//! Shared types for the Turn Dispatcher (spec.md §4.7): the event stream
//! vocabulary and per-game summaries, kept in `common` so both the
//! `warbots-server` binary (which owns the actual per-game state machines)
//! and any RPC client can agree on their shape without depending on the
//! server crate.

use serde::{Deserialize, Serialize};

use super::ids::{GameId, PlayerId};

/// One entry in a game's server-sent event stream (spec.md §6 "Event
/// stream format"). `connected` carries no payload beyond the variant tag
/// at the wire layer; it's included here for completeness of the contract.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    Connected,
    PlayerJoined { player: PlayerId, empire_name: String },
    GameStarted,
    TurnResolved { turn: u64 },
    GameFinished { winner: PlayerId },
}

/// A game as it appears in the `list open games` / `list my games` RPCs:
/// enough to render a lobby row without fetching the full fog-filtered
/// state.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GameSummary {
    pub id: GameId,
    pub name: String,
    pub grid_size: u16,
    pub player_count: usize,
    pub max_players: usize,
    pub status: super::GameStatus,
}
