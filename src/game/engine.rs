use chrono::{DateTime, Utc};

use crate::{
    error::GameError,
    models::{Game, GamePhase, Team, TurnRecord, MAX_TEAMS, MIN_TEAMS},
    words::WordSource,
};

/// Most words a client may report for one side of a single turn
pub const MAX_TURN_WORDS: u32 = 1000;

/// What `end_turn` did to the game
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Play continues with the next team
    Continue { next_team_index: usize },
    /// The starting team reached the goal; everyone else gets to catch up
    FinalRoundStarted { target_turns: u32 },
    /// A winner was declared
    GameOver { winner: String, winner_index: usize },
}

/// Turn and game progression rules.
///
/// Every method is a synchronous transition over one `Game` value. Checks run
/// before any field is touched, so a returned error means the game is unchanged.
pub struct TurnEngine;

impl TurnEngine {
    pub fn add_team(game: &mut Game, name: &str, color: &str) -> Result<usize, GameError> {
        let name = name.trim();
        let color = color.trim();
        if name.is_empty() || color.is_empty() {
            return Err(GameError::Validation(
                "Team name and color are required".to_string(),
            ));
        }
        if game.phase() != GamePhase::Setup {
            return Err(GameError::InvalidState(
                "Teams can only be added before the game starts".to_string(),
            ));
        }
        if game.teams.len() >= MAX_TEAMS {
            return Err(GameError::LimitExceeded(format!(
                "Maximum {} teams allowed",
                MAX_TEAMS
            )));
        }

        let id = game.teams.len();
        game.teams
            .push(Team::new(id, name.to_string(), color.to_string()));
        Ok(id)
    }

    pub fn start_game(game: &mut Game, words: &dyn WordSource) -> Result<(), GameError> {
        if game.started {
            return Err(GameError::InvalidState("Game already started".to_string()));
        }
        if game.teams.len() < MIN_TEAMS {
            return Err(GameError::InvalidState(format!(
                "Need at least {} teams to start game",
                MIN_TEAMS
            )));
        }
        let first_word = words.next_word(&game.language)?;

        game.started = true;
        game.current_team_index = 0;
        game.winner = None;
        game.final_round_turns = None;
        game.starting_team_id = None;
        Self::reset_turn_fields(game);
        game.current_word = first_word;
        Ok(())
    }

    pub fn start_turn(
        game: &mut Game,
        team_index: usize,
        words: &dyn WordSource,
        now: DateTime<Utc>,
    ) -> Result<(), GameError> {
        match game.phase() {
            GamePhase::Setup => {
                return Err(GameError::InvalidState("Game not started".to_string()))
            }
            GamePhase::Finished => {
                return Err(GameError::InvalidState("Game already finished".to_string()))
            }
            GamePhase::InTurn => {
                return Err(GameError::InvalidState(
                    "A turn is already in progress".to_string(),
                ))
            }
            GamePhase::Idle => {}
        }
        let team_id = game
            .teams
            .get(team_index)
            .map(|team| team.id)
            .ok_or_else(|| GameError::NotFound(format!("Team not found: {}", team_index)))?;
        let word = words.next_word(&game.language)?;

        game.current_team_index = team_index;
        Self::reset_turn_fields(game);
        game.turn_active = true;
        game.turn_started_at = Some(now);
        game.current_word = word;
        if game.starting_team_id.is_none() {
            game.starting_team_id = Some(team_id);
        }
        Ok(())
    }

    pub fn mark_guessed(game: &mut Game, words: &dyn WordSource) -> Result<(), GameError> {
        Self::ensure_in_turn(game)?;
        let word = words.next_word(&game.language)?;

        game.turn_score += 1;
        game.words_guessed += 1;
        game.current_word = word;
        Ok(())
    }

    /// The visible turn score never drops below zero; the skip still counts
    /// against the team when the turn ends.
    pub fn mark_skipped(game: &mut Game, words: &dyn WordSource) -> Result<(), GameError> {
        Self::ensure_in_turn(game)?;
        let word = words.next_word(&game.language)?;

        game.turn_score = game.turn_score.saturating_sub(1);
        game.words_skipped += 1;
        game.current_word = word;
        Ok(())
    }

    /// Replace the turn's counters with a result tallied by the client, then end it
    pub fn submit_turn(
        game: &mut Game,
        words_guessed: u32,
        words_skipped: u32,
        now: DateTime<Utc>,
    ) -> Result<TurnOutcome, GameError> {
        Self::ensure_in_turn(game)?;
        if words_guessed > MAX_TURN_WORDS || words_skipped > MAX_TURN_WORDS {
            return Err(GameError::Validation(format!(
                "wordsGuessed and wordsSkipped must be at most {}",
                MAX_TURN_WORDS
            )));
        }
        let saved = (game.words_guessed, game.words_skipped, game.turn_score);
        game.words_guessed = words_guessed;
        game.words_skipped = words_skipped;
        game.turn_score = words_guessed.saturating_sub(words_skipped);
        let outcome = Self::end_turn(game, now);
        if outcome.is_err() {
            (game.words_guessed, game.words_skipped, game.turn_score) = saved;
        }
        outcome
    }

    pub fn end_turn(game: &mut Game, now: DateTime<Utc>) -> Result<TurnOutcome, GameError> {
        Self::ensure_in_turn(game)?;
        let team_count = game.teams.len();
        let index = game.current_team_index;
        if index >= team_count {
            return Err(GameError::NotFound(format!("Team not found: {}", index)));
        }

        let winning_position = game.game_settings.winning_position;
        let score_out_of_range = || GameError::Validation("Turn score is out of range".to_string());
        let final_score = i32::try_from(game.words_guessed as i64 - game.words_skipped as i64)
            .map_err(|_| score_out_of_range())?;

        let team = &game.teams[index];
        let new_position = u32::try_from((team.position as i64 + final_score as i64).max(0))
            .map_err(|_| score_out_of_range())?;
        let total_score = team
            .total_score
            .checked_add(final_score)
            .ok_or_else(score_out_of_range)?;

        let team = &mut game.teams[index];
        team.position = new_position;
        team.total_score = total_score;
        team.turns_played += 1;
        let team_id = team.id;
        let team_name = team.name.clone();
        let turns_played = team.turns_played;

        game.turn_history.push(TurnRecord {
            team_id,
            team_name: team_name.clone(),
            score: final_score,
            words_guessed: game.words_guessed,
            words_skipped: game.words_skipped,
            new_position,
            timestamp: now,
        });

        tracing::debug!(
            "Game {}: {} scored {} (position {})",
            game.game_id,
            team_name,
            final_score,
            new_position
        );

        let reached_goal = new_position >= winning_position;
        let mut outcome = None;

        if reached_goal && game.final_round_turns.is_none() {
            let is_starting_team = game.starting_team_id == Some(team_id);
            if is_starting_team && team_count > 1 {
                game.final_round_turns = Some(turns_played);
                outcome = Some(TurnOutcome::FinalRoundStarted {
                    target_turns: turns_played,
                });
            } else {
                outcome = Some(Self::declare_winner(game, index));
            }
        }

        if !game.is_finished() {
            if let Some(target) = game.final_round_turns {
                if game.teams.iter().all(|team| team.turns_played >= target) {
                    let winner_index = Self::leader_index(&game.teams);
                    outcome = Some(Self::declare_winner(game, winner_index));
                }
            }
        }

        if !game.is_finished() {
            game.current_team_index = (index + 1) % team_count;
        }

        Self::reset_turn_fields(game);

        Ok(outcome.unwrap_or(TurnOutcome::Continue {
            next_team_index: game.current_team_index,
        }))
    }

    /// Back to setup with the same roster and a clean scoreboard
    pub fn reset_game(game: &mut Game) {
        for team in &mut game.teams {
            team.position = 0;
            team.total_score = 0;
            team.turns_played = 0;
        }
        game.current_team_index = 0;
        game.started = false;
        game.winner = None;
        game.final_round_turns = None;
        game.starting_team_id = None;
        game.turn_history.clear();
        Self::reset_turn_fields(game);
    }

    /// Seconds left in the running turn, measured from when it started
    pub fn time_left(game: &Game, now: DateTime<Utc>) -> u32 {
        let duration = game.game_settings.turn_duration;
        match (game.turn_active, game.turn_started_at) {
            (true, Some(started_at)) => {
                let elapsed = (now - started_at).num_seconds().max(0);
                (duration as i64 - elapsed).max(0) as u32
            }
            _ => duration,
        }
    }

    pub fn sync_clock(game: &mut Game, now: DateTime<Utc>) {
        game.time_left = Self::time_left(game, now);
    }

    pub fn turn_expired(game: &Game, now: DateTime<Utc>) -> bool {
        game.turn_active && Self::time_left(game, now) == 0
    }

    fn ensure_in_turn(game: &Game) -> Result<(), GameError> {
        match game.phase() {
            GamePhase::InTurn => Ok(()),
            GamePhase::Finished => Err(GameError::InvalidState(
                "Game already finished".to_string(),
            )),
            GamePhase::Setup => Err(GameError::InvalidState("Game not started".to_string())),
            GamePhase::Idle => Err(GameError::InvalidState(
                "No turn in progress".to_string(),
            )),
        }
    }

    fn declare_winner(game: &mut Game, winner_index: usize) -> TurnOutcome {
        let winner = game.teams[winner_index].name.clone();
        game.winner = Some(winner.clone());
        game.current_team_index = winner_index;
        tracing::info!("Game {} won by {}", game.game_id, winner);
        TurnOutcome::GameOver {
            winner,
            winner_index,
        }
    }

    /// Highest position wins; on a tie the team added first
    fn leader_index(teams: &[Team]) -> usize {
        let mut ranked: Vec<usize> = (0..teams.len()).collect();
        ranked.sort_by(|a, b| teams[*b].position.cmp(&teams[*a].position));
        ranked.first().copied().unwrap_or(0)
    }

    fn reset_turn_fields(game: &mut Game) {
        game.turn_score = 0;
        game.words_guessed = 0;
        game.words_skipped = 0;
        game.time_left = game.game_settings.turn_duration;
        game.current_word.clear();
        game.turn_active = false;
        game.turn_started_at = None;
    }
}
