//! The `Store` capability (spec.md §9 "Embedded SQL everywhere"): a
//! transactional persistence boundary the Turn Processor is handed rather
//! than reaching for SQL directly, with narrow query methods rather than
//! a generic query language. `InMemoryStore` is the reference
//! implementation used by every test in this crate; a relational
//! implementation lives outside this crate's scope per spec.md §1.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::combat_log::CombatLogEntry;
use super::error::PipelineError;
use super::ids::{GameId, PlayerId};
use super::orders::Orders;
use super::GameState;

#[async_trait]
pub trait Store: Send + Sync {
    async fn create_game(&self, game: GameState) -> Result<(), PipelineError>;
    async fn load_game(&self, id: GameId) -> Result<GameState, PipelineError>;
    async fn save_game(&self, game: &GameState) -> Result<(), PipelineError>;

    /// Deletes the game and cascades to every entity it owns: players,
    /// planets, buildings, mechs, submissions, drafts, combat logs.
    async fn delete_game(&self, id: GameId) -> Result<(), PipelineError>;
    async fn list_games(&self) -> Result<Vec<GameId>, PipelineError>;

    /// Records a player's full submission for the current turn, retained
    /// for audit after the turn advances.
    async fn submit_orders(
        &self,
        game: GameId,
        player: PlayerId,
        turn: u64,
        orders: Orders,
    ) -> Result<(), PipelineError>;

    /// The submission recorded for `player` on `turn`, if any.
    async fn submission(
        &self,
        game: GameId,
        player: PlayerId,
        turn: u64,
    ) -> Result<Option<Orders>, PipelineError>;

    /// A player's saved draft (spec.md §9 "Pending orders"), adopted by
    /// stage 1 of the Turn Processor if no full submission arrived.
    async fn save_draft(&self, game: GameId, player: PlayerId, orders: Orders) -> Result<(), PipelineError>;

    /// Removes every player's draft for `game`, called unconditionally at
    /// the end of stage 1 regardless of whether a draft was adopted.
    async fn clear_drafts(&self, game: GameId) -> Result<HashMap<PlayerId, Orders>, PipelineError>;

    async fn append_log(&self, game: GameId, entry: CombatLogEntry) -> Result<(), PipelineError>;
    async fn logs_for(&self, game: GameId) -> Result<Vec<CombatLogEntry>, PipelineError>;
}

#[derive(Default)]
struct GameRecord {
    state: GameState,
    submissions: HashMap<(PlayerId, u64), Orders>,
    drafts: HashMap<PlayerId, Orders>,
    logs: Vec<CombatLogEntry>,
}

#[derive(Default)]
pub struct InMemoryStore {
    games: Mutex<HashMap<GameId, GameRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn create_game(&self, game: GameState) -> Result<(), PipelineError> {
        let mut games = self.games.lock().unwrap();
        games.insert(
            game.id,
            GameRecord {
                state: game,
                ..Default::default()
            },
        );
        Ok(())
    }

    async fn load_game(&self, id: GameId) -> Result<GameState, PipelineError> {
        let games = self.games.lock().unwrap();
        games
            .get(&id)
            .map(|r| r.state.clone())
            .ok_or_else(|| PipelineError::Storage(format!("no such game {id}")))
    }

    async fn save_game(&self, game: &GameState) -> Result<(), PipelineError> {
        let mut games = self.games.lock().unwrap();
        let record = games
            .get_mut(&game.id)
            .ok_or_else(|| PipelineError::Storage(format!("no such game {}", game.id)))?;
        record.state = game.clone();
        Ok(())
    }

    async fn delete_game(&self, id: GameId) -> Result<(), PipelineError> {
        let mut games = self.games.lock().unwrap();
        games.remove(&id);
        Ok(())
    }

    async fn list_games(&self) -> Result<Vec<GameId>, PipelineError> {
        let games = self.games.lock().unwrap();
        Ok(games.keys().copied().collect())
    }

    async fn submit_orders(
        &self,
        game: GameId,
        player: PlayerId,
        turn: u64,
        orders: Orders,
    ) -> Result<(), PipelineError> {
        let mut games = self.games.lock().unwrap();
        let record = games
            .get_mut(&game)
            .ok_or_else(|| PipelineError::Storage(format!("no such game {game}")))?;
        record.submissions.insert((player, turn), orders);
        if let Some(p) = record.state.player_mut(player) {
            p.submitted_this_turn = true;
        }
        Ok(())
    }

    async fn submission(
        &self,
        game: GameId,
        player: PlayerId,
        turn: u64,
    ) -> Result<Option<Orders>, PipelineError> {
        let games = self.games.lock().unwrap();
        Ok(games
            .get(&game)
            .and_then(|r| r.submissions.get(&(player, turn)).cloned()))
    }

    async fn save_draft(&self, game: GameId, player: PlayerId, orders: Orders) -> Result<(), PipelineError> {
        let mut games = self.games.lock().unwrap();
        let record = games
            .get_mut(&game)
            .ok_or_else(|| PipelineError::Storage(format!("no such game {game}")))?;
        record.drafts.insert(player, orders);
        Ok(())
    }

    async fn clear_drafts(&self, game: GameId) -> Result<HashMap<PlayerId, Orders>, PipelineError> {
        let mut games = self.games.lock().unwrap();
        let record = games
            .get_mut(&game)
            .ok_or_else(|| PipelineError::Storage(format!("no such game {game}")))?;
        Ok(std::mem::take(&mut record.drafts))
    }

    async fn append_log(&self, game: GameId, entry: CombatLogEntry) -> Result<(), PipelineError> {
        let mut games = self.games.lock().unwrap();
        let record = games
            .get_mut(&game)
            .ok_or_else(|| PipelineError::Storage(format!("no such game {game}")))?;
        record.logs.push(entry);
        Ok(())
    }

    async fn logs_for(&self, game: GameId) -> Result<Vec<CombatLogEntry>, PipelineError> {
        let games = self.games.lock().unwrap();
        Ok(games.get(&game).map(|r| r.logs.clone()).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::GridSize;

    fn new_game(id: u64) -> GameState {
        GameState::new(GameId::new(id), "t".into(), GridSize::new(25).unwrap(), 2, 60)
    }

    #[tokio::test]
    async fn draft_round_trips_and_clears() {
        let store = InMemoryStore::new();
        store.create_game(new_game(1)).await.unwrap();
        let player = PlayerId::new(1);
        store
            .save_draft(GameId::new(1), player, Orders::default())
            .await
            .unwrap();
        let drafts = store.clear_drafts(GameId::new(1)).await.unwrap();
        assert!(drafts.contains_key(&player));
        let drafts_again = store.clear_drafts(GameId::new(1)).await.unwrap();
        assert!(drafts_again.is_empty());
    }

    #[tokio::test]
    async fn delete_game_cascades_logs_and_submissions() {
        let store = InMemoryStore::new();
        store.create_game(new_game(2)).await.unwrap();
        store
            .append_log(
                GameId::new(2),
                CombatLogEntry::new(1, None, super::super::combat_log::CombatLogKind::Income {
                    player: PlayerId::new(1),
                    amount: 5,
                }),
            )
            .await
            .unwrap();
        store.delete_game(GameId::new(2)).await.unwrap();
        assert!(store.load_game(GameId::new(2)).await.is_err());
        assert!(store.logs_for(GameId::new(2)).await.unwrap().is_empty());
    }
}
