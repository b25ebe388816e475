use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreMetadata {
    pub words_attempted: u32,
    /// Percentage, 0-100
    pub accuracy: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    pub id: Uuid,
    pub name: String,
    pub score: u32,
    pub timestamp: DateTime<Utc>,
    pub metadata: ScoreMetadata,
}

/// A leaderboard row with its 1-based rank
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry {
    pub rank: usize,
    #[serde(flatten)]
    pub entry: ScoreEntry,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    /// None when the entry did not survive trimming to capacity
    pub rank: Option<usize>,
    pub total: usize,
    pub entry: ScoreEntry,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub player_name: String,
    pub best_score: u32,
    pub total_games: usize,
    pub average_score: f64,
    pub best_rank: Option<usize>,
    pub top_scores: Vec<ScoreEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardStats {
    pub total_scores: usize,
    pub unique_players: usize,
    pub average_score: f64,
    pub top_score: u32,
    pub qualifying_threshold: u32,
}
