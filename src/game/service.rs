use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{
    error::GameError,
    game::{
        engine::{TurnEngine, TurnOutcome},
        store::{GameStore, MemoryGameStore},
    },
    models::{Game, GameSettings, GameStats, GameSummary, SettingsOverrides},
    utils::ids::generate_game_id,
    words::WordService,
};

#[derive(Debug, Clone, Deserialize)]
pub struct NewTeam {
    pub name: String,
    pub color: String,
}

/// Inbound operations on games, as called by HTTP and websocket handlers.
///
/// Each call locks one game in the store, runs an engine transition on it and
/// returns a snapshot of the result.
pub struct GameService<S = MemoryGameStore> {
    store: S,
    words: Arc<WordService>,
    defaults: GameSettings,
    default_language: String,
}

impl<S: GameStore> GameService<S> {
    pub fn new(
        store: S,
        words: Arc<WordService>,
        defaults: GameSettings,
        default_language: String,
    ) -> Self {
        Self {
            store,
            words,
            defaults,
            default_language,
        }
    }

    pub fn create_game(
        &self,
        overrides: &SettingsOverrides,
        language: Option<&str>,
        teams: &[NewTeam],
    ) -> Result<Game, GameError> {
        let settings = overrides.apply(self.defaults);
        if settings.winning_position == 0 || settings.turn_duration == 0 {
            return Err(GameError::Validation(
                "winningPosition and turnDuration must be greater than zero".to_string(),
            ));
        }

        let language = language.unwrap_or(&self.default_language).to_string();
        if !self.words.supports(&language) {
            return Err(GameError::Validation(format!(
                "Unsupported language: {}",
                language
            )));
        }

        let mut game_id = generate_game_id();
        while self.store.contains(&game_id) {
            game_id = generate_game_id();
        }

        let mut game = Game::new(game_id, settings, language, Utc::now());
        for team in teams {
            TurnEngine::add_team(&mut game, &team.name, &team.color)?;
        }

        self.store.put(game.clone());
        tracing::info!(
            "Created new game: {} ({} teams, goal {})",
            game.game_id,
            game.teams.len(),
            settings.winning_position
        );
        Ok(game)
    }

    /// Current state of a game; counts as activity for cleanup purposes
    pub fn get_game(&self, game_id: &str) -> Result<Game, GameError> {
        self.mutate(game_id, |_, _| Ok(()))
            .map(|(game, _)| game)
    }

    pub fn add_team(&self, game_id: &str, name: &str, color: &str) -> Result<Game, GameError> {
        let (game, team_id) = self.mutate(game_id, |game, _| TurnEngine::add_team(game, name, color))?;
        tracing::info!("Game {}: added team {} ({})", game_id, name.trim(), team_id);
        Ok(game)
    }

    pub fn start_game(&self, game_id: &str) -> Result<Game, GameError> {
        let words = self.words.as_ref();
        let (game, _) = self.mutate(game_id, |game, _| TurnEngine::start_game(game, words))?;
        tracing::info!("Game {} started with {} teams", game_id, game.teams.len());
        Ok(game)
    }

    pub fn start_turn(&self, game_id: &str, team_index: usize) -> Result<Game, GameError> {
        let words = self.words.as_ref();
        let (game, _) = self.mutate(game_id, |game, now| {
            TurnEngine::start_turn(game, team_index, words, now)
        })?;
        tracing::debug!("Game {}: turn started for team {}", game_id, team_index);
        Ok(game)
    }

    pub fn record_guess(&self, game_id: &str) -> Result<Game, GameError> {
        let words = self.words.as_ref();
        self.mutate(game_id, |game, _| TurnEngine::mark_guessed(game, words))
            .map(|(game, _)| game)
    }

    pub fn record_skip(&self, game_id: &str) -> Result<Game, GameError> {
        let words = self.words.as_ref();
        self.mutate(game_id, |game, _| TurnEngine::mark_skipped(game, words))
            .map(|(game, _)| game)
    }

    pub fn end_turn(&self, game_id: &str) -> Result<(Game, TurnOutcome), GameError> {
        self.mutate(game_id, |game, now| TurnEngine::end_turn(game, now))
    }

    pub fn submit_turn(
        &self,
        game_id: &str,
        words_guessed: u32,
        words_skipped: u32,
    ) -> Result<(Game, TurnOutcome), GameError> {
        self.mutate(game_id, |game, now| {
            TurnEngine::submit_turn(game, words_guessed, words_skipped, now)
        })
    }

    pub fn reset_game(&self, game_id: &str) -> Result<Game, GameError> {
        let (game, _) = self.mutate(game_id, |game, _| {
            TurnEngine::reset_game(game);
            Ok(())
        })?;
        tracing::info!("Game {} reset", game_id);
        Ok(game)
    }

    pub fn delete_game(&self, game_id: &str) -> Result<(), GameError> {
        self.store
            .delete(game_id)
            .ok_or_else(|| GameError::game_not_found(game_id))?;
        tracing::info!("Deleted game: {}", game_id);
        Ok(())
    }

    pub fn list_games(&self) -> Vec<GameSummary> {
        self.store.list_summaries()
    }

    pub fn game_stats(&self, game_id: &str) -> Result<GameStats, GameError> {
        let game = self.get_game(game_id)?;
        Ok(game.stats(Utc::now()))
    }

    pub fn cleanup_older_than(&self, max_age: chrono::Duration) -> usize {
        let Some(cutoff) = Utc::now().checked_sub_signed(max_age) else {
            return 0;
        };
        let cleaned = self.store.delete_older_than(cutoff);
        if cleaned > 0 {
            tracing::info!("Cleaned up {} old games", cleaned);
        }
        cleaned
    }

    /// End every turn whose clock ran out before `now`
    pub fn expire_turns(&self, now: DateTime<Utc>) -> Vec<(Game, TurnOutcome)> {
        let mut ended = Vec::new();
        for game_id in self.store.ids() {
            let result = self.store.update(&game_id, |game| {
                if !TurnEngine::turn_expired(game, now) {
                    return Ok(None);
                }
                let outcome = TurnEngine::end_turn(game, now)?;
                game.last_activity = now;
                Ok(Some((game.clone(), outcome)))
            });
            // A game deleted between listing and locking just drops out here
            if let Ok(Some(entry)) = result {
                tracing::debug!("Game {}: turn ended by clock", game_id);
                ended.push(entry);
            }
        }
        ended
    }

    pub fn active_game_count(&self) -> usize {
        self.store.len()
    }

    /// Existence check that does not count as activity
    pub fn game_exists(&self, game_id: &str) -> bool {
        self.store.contains(game_id)
    }

    /// Run a transition against one game, refresh its clock and activity
    /// stamp, and hand back the committed snapshot.
    fn mutate<T>(
        &self,
        game_id: &str,
        f: impl FnOnce(&mut Game, DateTime<Utc>) -> Result<T, GameError>,
    ) -> Result<(Game, T), GameError> {
        let now = Utc::now();
        self.store.update(game_id, |game| {
            let result = f(game, now)?;
            game.last_activity = now;
            TurnEngine::sync_clock(game, now);
            Ok((game.clone(), result))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio_test::{assert_err, assert_ok};

    fn service() -> GameService {
        let mut lists = HashMap::new();
        lists.insert(
            "en".to_string(),
            vec!["apple", "river", "guitar", "planet", "candle"]
                .into_iter()
                .map(String::from)
                .collect(),
        );
        let words = Arc::new(WordService::from_lists(lists).unwrap());
        GameService::new(
            MemoryGameStore::new(),
            words,
            GameSettings {
                winning_position: 10,
                turn_duration: 60,
            },
            "en".to_string(),
        )
    }

    fn teams(names: &[&str]) -> Vec<NewTeam> {
        names
            .iter()
            .map(|name| NewTeam {
                name: name.to_string(),
                color: "#abcdef".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_create_game_applies_overrides() {
        let service = service();
        let overrides = SettingsOverrides {
            winning_position: Some(5),
            turn_duration: None,
        };
        let game = assert_ok!(service.create_game(&overrides, None, &[]));
        assert_eq!(game.game_settings.winning_position, 5);
        assert_eq!(game.game_settings.turn_duration, 60);
        assert_eq!(game.language, "en");
        assert_eq!(service.active_game_count(), 1);
    }

    #[test]
    fn test_create_game_rejects_bad_input() {
        let service = service();
        let zero = SettingsOverrides {
            winning_position: Some(0),
            turn_duration: None,
        };
        assert_err!(service.create_game(&zero, None, &[]));
        assert_err!(service.create_game(&SettingsOverrides::default(), Some("xx"), &[]));
        assert_err!(service.create_game(
            &SettingsOverrides::default(),
            None,
            &teams(&["A", "B", "C", "D", "E"])
        ));
        assert_eq!(service.active_game_count(), 0);
    }

    #[test]
    fn test_full_game_through_service() {
        let service = service();
        let game = assert_ok!(service.create_game(&SettingsOverrides::default(), None, &[]));
        let id = game.game_id;

        assert_ok!(service.add_team(&id, "Red", "#f00"));
        assert_ok!(service.add_team(&id, "Blue", "#00f"));
        let game = assert_ok!(service.start_game(&id));
        assert!(!game.current_word.is_empty());

        assert_ok!(service.start_turn(&id, 0));
        for _ in 0..6 {
            assert_ok!(service.record_guess(&id));
        }
        for _ in 0..2 {
            assert_ok!(service.record_skip(&id));
        }
        let (game, outcome) = assert_ok!(service.end_turn(&id));
        assert_eq!(game.teams[0].position, 4);
        assert_eq!(outcome, TurnOutcome::Continue { next_team_index: 1 });

        assert_ok!(service.start_turn(&id, 1));
        let (game, outcome) = assert_ok!(service.submit_turn(&id, 10, 0));
        assert!(matches!(outcome, TurnOutcome::GameOver { .. }));
        assert_eq!(game.winner.as_deref(), Some("Blue"));

        let stats = assert_ok!(service.game_stats(&id));
        assert_eq!(stats.total_turns, 2);
        assert_eq!(stats.teams[1].average_score, 10.0);

        let game = assert_ok!(service.reset_game(&id));
        assert!(game.winner.is_none());
        assert_eq!(game.teams.len(), 2);
    }

    #[test]
    fn test_unknown_game_is_not_found() {
        let service = service();
        assert!(matches!(
            service.start_game("missing"),
            Err(GameError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_game("missing"),
            Err(GameError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_and_list() {
        let service = service();
        let a = assert_ok!(service.create_game(&SettingsOverrides::default(), None, &teams(&["A", "B"])));
        assert_ok!(service.create_game(&SettingsOverrides::default(), None, &[]));
        assert_eq!(service.list_games().len(), 2);

        assert_ok!(service.delete_game(&a.game_id));
        assert_eq!(service.list_games().len(), 1);
        assert_err!(service.get_game(&a.game_id));
    }

    #[test]
    fn test_cleanup_keeps_recent_games() {
        let service = service();
        assert_ok!(service.create_game(&SettingsOverrides::default(), None, &[]));
        assert_eq!(service.cleanup_older_than(chrono::Duration::hours(24)), 0);
        assert_eq!(service.cleanup_older_than(chrono::TimeDelta::MAX), 0);
        assert_eq!(service.cleanup_older_than(chrono::Duration::seconds(-1)), 1);
        assert_eq!(service.active_game_count(), 0);
    }

    #[test]
    fn test_expire_turns_ends_each_turn_once() {
        let service = service();
        let game = assert_ok!(service.create_game(&SettingsOverrides::default(), None, &teams(&["A", "B"])));
        let id = game.game_id;
        assert_ok!(service.start_game(&id));
        assert_ok!(service.start_turn(&id, 0));
        assert_ok!(service.record_guess(&id));

        assert!(service.expire_turns(Utc::now()).is_empty());

        let later = Utc::now() + chrono::Duration::seconds(61);
        let ended = service.expire_turns(later);
        assert_eq!(ended.len(), 1);
        assert_eq!(ended[0].0.teams[0].position, 1);

        assert!(service.expire_turns(later).is_empty());
        assert_err!(service.end_turn(&id));
    }
}
