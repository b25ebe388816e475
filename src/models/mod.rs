pub mod game;
pub mod leaderboard;

pub use game::{
    Game, GamePhase, GameSettings, GameStats, GameSummary, SettingsOverrides, Team, TurnRecord,
    MAX_TEAMS, MIN_TEAMS,
};
pub use leaderboard::{
    LeaderboardStats, PlayerStats, RankedEntry, ScoreEntry, ScoreMetadata, SubmissionResult,
};
