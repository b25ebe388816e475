use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Hard cap on the roster of a single game
pub const MAX_TEAMS: usize = 4;
/// Minimum roster needed to start playing
pub const MIN_TEAMS: usize = 2;

pub const DEFAULT_WINNING_POSITION: u32 = 30;
pub const DEFAULT_TURN_DURATION: u32 = 60;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    pub winning_position: u32,
    /// Seconds
    pub turn_duration: u32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            winning_position: DEFAULT_WINNING_POSITION,
            turn_duration: DEFAULT_TURN_DURATION,
        }
    }
}

/// Partial settings supplied when creating a game; missing fields fall back
/// to the server defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsOverrides {
    pub winning_position: Option<u32>,
    pub turn_duration: Option<u32>,
}

impl SettingsOverrides {
    pub fn apply(&self, defaults: GameSettings) -> GameSettings {
        GameSettings {
            winning_position: self.winning_position.unwrap_or(defaults.winning_position),
            turn_duration: self.turn_duration.unwrap_or(defaults.turn_duration),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    /// Index in the roster, assigned in order of addition
    pub id: usize,
    pub name: String,
    pub color: String,
    /// Authoritative board position; may run past the goal
    pub position: u32,
    pub total_score: i32,
    pub turns_played: u32,
}

impl Team {
    pub fn new(id: usize, name: String, color: String) -> Self {
        Self {
            id,
            name,
            color,
            position: 0,
            total_score: 0,
            turns_played: 0,
        }
    }

    /// Position clamped to the goal, for drawing the board
    pub fn display_position(&self, winning_position: u32) -> u32 {
        self.position.min(winning_position)
    }

    /// How far past the goal this team has run
    pub fn overflow(&self, winning_position: u32) -> u32 {
        self.position.saturating_sub(winning_position)
    }

    pub fn average_score(&self) -> f64 {
        if self.turns_played == 0 {
            0.0
        } else {
            self.total_score as f64 / self.turns_played as f64
        }
    }
}

/// One completed turn, appended to the game's history and never changed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TurnRecord {
    pub team_id: usize,
    pub team_name: String,
    /// Guessed minus skipped
    pub score: i32,
    pub words_guessed: u32,
    pub words_skipped: u32,
    pub new_position: u32,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// Roster is being assembled
    Setup,
    /// Started, between turns
    Idle,
    /// A team is currently guessing
    InTurn,
    /// A winner has been declared
    Finished,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub game_id: String,
    pub language: String,
    pub teams: Vec<Team>,
    pub current_team_index: usize,
    pub started: bool,
    pub turn_active: bool,
    pub winner: Option<String>,
    /// Turn count at which the starting team reached the goal
    pub final_round_turns: Option<u32>,
    pub starting_team_id: Option<usize>,
    pub game_settings: GameSettings,
    pub turn_history: Vec<TurnRecord>,

    // Per-turn fields, reset by the engine at every turn boundary
    pub turn_score: u32,
    pub words_guessed: u32,
    pub words_skipped: u32,
    pub time_left: u32,
    pub current_word: String,
    pub turn_started_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl Game {
    pub fn new(game_id: String, settings: GameSettings, language: String, now: DateTime<Utc>) -> Self {
        Self {
            game_id,
            language,
            teams: Vec::new(),
            current_team_index: 0,
            started: false,
            turn_active: false,
            winner: None,
            final_round_turns: None,
            starting_team_id: None,
            game_settings: settings,
            turn_history: Vec::new(),
            turn_score: 0,
            words_guessed: 0,
            words_skipped: 0,
            time_left: settings.turn_duration,
            current_word: String::new(),
            turn_started_at: None,
            created_at: now,
            last_activity: now,
        }
    }

    pub fn phase(&self) -> GamePhase {
        if self.winner.is_some() {
            GamePhase::Finished
        } else if !self.started {
            GamePhase::Setup
        } else if self.turn_active {
            GamePhase::InTurn
        } else {
            GamePhase::Idle
        }
    }

    pub fn is_finished(&self) -> bool {
        self.winner.is_some()
    }

    pub fn is_final_round(&self) -> bool {
        self.final_round_turns.is_some() && !self.is_finished()
    }

    pub fn summary(&self) -> GameSummary {
        GameSummary {
            game_id: self.game_id.clone(),
            teams: self.teams.len(),
            game_started: self.started,
            winner: self.winner.clone(),
            created_at: self.created_at,
            last_activity: self.last_activity,
        }
    }

    pub fn stats(&self, now: DateTime<Utc>) -> GameStats {
        let goal = self.game_settings.winning_position;
        GameStats {
            game_id: self.game_id.clone(),
            duration_secs: (now - self.created_at).num_seconds(),
            total_turns: self.turn_history.len(),
            teams: self
                .teams
                .iter()
                .map(|team| TeamStats {
                    name: team.name.clone(),
                    position: team.position,
                    display_position: team.display_position(goal),
                    overflow: team.overflow(goal),
                    total_score: team.total_score,
                    turns_played: team.turns_played,
                    average_score: team.average_score(),
                })
                .collect(),
            winner: self.winner.clone(),
            game_started: self.started,
            final_round: self.is_final_round(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub game_id: String,
    pub teams: usize,
    pub game_started: bool,
    pub winner: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStats {
    pub name: String,
    pub position: u32,
    /// Position clamped to the goal
    pub display_position: u32,
    pub overflow: u32,
    pub total_score: i32,
    pub turns_played: u32,
    pub average_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStats {
    pub game_id: String,
    pub duration_secs: i64,
    pub total_turns: usize,
    pub teams: Vec<TeamStats>,
    pub winner: Option<String>,
    pub game_started: bool,
    pub final_round: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_position_clamps_to_goal() {
        let mut team = Team::new(0, "Red".into(), "#f00".into());
        team.position = 34;
        assert_eq!(team.display_position(30), 30);
        assert_eq!(team.overflow(30), 4);

        team.position = 12;
        assert_eq!(team.display_position(30), 12);
        assert_eq!(team.overflow(30), 0);
    }

    #[test]
    fn test_settings_overrides_fill_missing_fields() {
        let overrides = SettingsOverrides {
            winning_position: Some(10),
            turn_duration: None,
        };
        let settings = overrides.apply(GameSettings::default());
        assert_eq!(settings.winning_position, 10);
        assert_eq!(settings.turn_duration, DEFAULT_TURN_DURATION);
    }

    #[test]
    fn test_new_game_is_in_setup() {
        let game = Game::new("g".into(), GameSettings::default(), "en".into(), Utc::now());
        assert_eq!(game.phase(), GamePhase::Setup);
        assert_eq!(game.time_left, DEFAULT_TURN_DURATION);
        assert!(!game.is_final_round());
    }

    #[test]
    fn test_stats_carry_board_display_fields() {
        let settings = GameSettings {
            winning_position: 10,
            turn_duration: 60,
        };
        let now = Utc::now();
        let mut game = Game::new("g".into(), settings, "en".into(), now);
        game.teams.push(Team::new(0, "Red".into(), "#f00".into()));
        game.teams.push(Team::new(1, "Blue".into(), "#00f".into()));
        game.started = true;
        game.teams[0].position = 13;
        game.teams[1].position = 4;
        game.final_round_turns = Some(1);

        let json = serde_json::to_value(game.stats(now)).unwrap();
        assert_eq!(json["teams"][0]["position"], 13);
        assert_eq!(json["teams"][0]["displayPosition"], 10);
        assert_eq!(json["teams"][0]["overflow"], 3);
        assert_eq!(json["teams"][1]["displayPosition"], 4);
        assert_eq!(json["teams"][1]["overflow"], 0);
        assert_eq!(json["finalRound"], true);
    }

    #[test]
    fn test_average_score() {
        let mut team = Team::new(0, "Blue".into(), "#00f".into());
        assert_eq!(team.average_score(), 0.0);
        team.total_score = 9;
        team.turns_played = 2;
        assert_eq!(team.average_score(), 4.5);
    }

    #[test]
    fn test_serializes_camel_case() {
        let game = Game::new("g".into(), GameSettings::default(), "en".into(), Utc::now());
        let json = serde_json::to_value(&game).unwrap();
        assert!(json.get("currentTeamIndex").is_some());
        assert_eq!(json["gameSettings"]["winningPosition"], 30);
    }
}
