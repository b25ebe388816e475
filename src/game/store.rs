use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::{
    error::GameError,
    models::{Game, GameSummary},
};

/// Keyed storage for live games.
///
/// `update` runs its closure while holding exclusive access to one game and
/// only commits the result if the closure succeeds.
pub trait GameStore {
    fn get(&self, game_id: &str) -> Result<Game, GameError>;
    fn put(&self, game: Game);
    fn delete(&self, game_id: &str) -> Option<Game>;
    fn contains(&self, game_id: &str) -> bool;
    fn update<T>(
        &self,
        game_id: &str,
        f: impl FnOnce(&mut Game) -> Result<T, GameError>,
    ) -> Result<T, GameError>;
    fn list_summaries(&self) -> Vec<GameSummary>;
    fn ids(&self) -> Vec<String>;
    /// Remove games whose last activity is before `cutoff`; returns how many went
    fn delete_older_than(&self, cutoff: DateTime<Utc>) -> usize;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-process store backed by a sharded concurrent map
#[derive(Default)]
pub struct MemoryGameStore {
    games: DashMap<String, Game>,
}

impl MemoryGameStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameStore for MemoryGameStore {
    fn get(&self, game_id: &str) -> Result<Game, GameError> {
        self.games
            .get(game_id)
            .map(|game| game.clone())
            .ok_or_else(|| GameError::game_not_found(game_id))
    }

    fn put(&self, game: Game) {
        self.games.insert(game.game_id.clone(), game);
    }

    fn delete(&self, game_id: &str) -> Option<Game> {
        self.games.remove(game_id).map(|(_, game)| game)
    }

    fn contains(&self, game_id: &str) -> bool {
        self.games.contains_key(game_id)
    }

    fn update<T>(
        &self,
        game_id: &str,
        f: impl FnOnce(&mut Game) -> Result<T, GameError>,
    ) -> Result<T, GameError> {
        let mut entry = self
            .games
            .get_mut(game_id)
            .ok_or_else(|| GameError::game_not_found(game_id))?;

        let mut draft = entry.clone();
        let result = f(&mut draft)?;
        *entry = draft;
        Ok(result)
    }

    fn list_summaries(&self) -> Vec<GameSummary> {
        let mut summaries: Vec<GameSummary> =
            self.games.iter().map(|game| game.summary()).collect();
        summaries.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        summaries
    }

    fn ids(&self) -> Vec<String> {
        self.games.iter().map(|game| game.key().clone()).collect()
    }

    fn delete_older_than(&self, cutoff: DateTime<Utc>) -> usize {
        let mut removed = 0;
        self.games.retain(|_, game| {
            let keep = game.last_activity >= cutoff;
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    fn len(&self) -> usize {
        self.games.len()
    }
}
