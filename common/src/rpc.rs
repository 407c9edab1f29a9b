//! The Warbots RPC interface (spec.md §6), generated over tarpc in the same
//! shape as the teacher's `UmpireRpc`: a flat trait of async methods, the
//! macro generating a `WarbotsRpcClient` for callers. Session/OAuth, HTTP
//! routing, and SSE framing live outside this crate's scope (spec.md §1);
//! every method here takes the calling player's id directly in lieu of a
//! session lookup, and `poll_events` stands in for the true SSE stream
//! described in spec.md §6.

use serde::{Deserialize, Serialize};

use crate::game::dispatcher_types::{GameSummary, ServerEvent};
use crate::game::error::GameError;
use crate::game::ids::{GameId, PlayerId};
use crate::game::orders::Orders;
use crate::game::player::EmpireColor;
use crate::game::view::PlayerView;

pub type WarbotsResult<T> = Result<T, GameError>;

/// Response shape for `available_colors`: the colors still free to pick,
/// alongside the full palette, so a client can render taken colors greyed
/// out rather than simply absent.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ColorAvailability {
    pub available: Vec<EmpireColor>,
    pub all: Vec<EmpireColor>,
}

/// The Warbots RPC interface. The macro generates a client impl called
/// `WarbotsRpcClient`.
#[tarpc::service]
pub trait WarbotsRpc {
    async fn list_open_games() -> Vec<GameSummary>;

    async fn list_my_games(player: PlayerId) -> Vec<GameSummary>;

    async fn create_game(
        player: PlayerId,
        name: String,
        grid_size: u16,
        max_players: usize,
        turn_timer_secs: u64,
        empire_name: String,
        empire_color: EmpireColor,
    ) -> WarbotsResult<GameId>;

    async fn join_game(
        game: GameId,
        player: PlayerId,
        empire_name: String,
        empire_color: EmpireColor,
    ) -> WarbotsResult<()>;

    async fn available_colors(game: GameId) -> WarbotsResult<ColorAvailability>;

    /// Host-only; requires ≥2 players and pairwise-distinct colors.
    async fn start_game(game: GameId, player: PlayerId) -> WarbotsResult<()>;

    /// Host-only; cascades to every entity the game owns.
    async fn delete_game(game: GameId, player: PlayerId) -> WarbotsResult<()>;

    /// The fog-of-war-filtered projection for `player` (spec.md §4.1/§4.6).
    async fn state(game: GameId, player: PlayerId) -> WarbotsResult<PlayerView>;

    /// Submits a full turn. The `bool` result is whether every
    /// non-eliminated player has now submitted, which the caller can use to
    /// anticipate an imminent `turn_resolved` event.
    async fn submit_turn(game: GameId, player: PlayerId, orders: Orders) -> WarbotsResult<bool>;

    /// Saves a draft adopted at deadline if no full submission arrives.
    async fn save_draft(game: GameId, player: PlayerId, orders: Orders) -> WarbotsResult<()>;

    /// Polls the event stream for events with index ≥ `since`; stands in
    /// for the SSE stream of spec.md §6 (out of this crate's scope).
    async fn poll_events(game: GameId, since: usize) -> WarbotsResult<Vec<ServerEvent>>;
}
