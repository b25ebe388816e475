use std::collections::HashSet;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::GameError,
    models::{
        LeaderboardStats, PlayerStats, RankedEntry, ScoreEntry, ScoreMetadata, SubmissionResult,
    },
};

/// Longest player name kept on the board, in characters
pub const MAX_NAME_LENGTH: usize = 20;

/// Best practice scores, highest first, trimmed to a fixed capacity
pub struct Leaderboard {
    scores: Vec<ScoreEntry>,
    capacity: usize,
    min_qualifying_score: u32,
}

impl Leaderboard {
    pub fn new(capacity: usize, min_qualifying_score: u32) -> Self {
        Self {
            scores: Vec::new(),
            capacity,
            min_qualifying_score,
        }
    }

    pub fn add_score(
        &mut self,
        player_name: &str,
        score: u32,
        metadata: ScoreMetadata,
    ) -> Result<SubmissionResult, GameError> {
        let name: String = player_name.trim().chars().take(MAX_NAME_LENGTH).collect();
        if name.is_empty() {
            return Err(GameError::Validation("Player name is required".to_string()));
        }
        if score < self.min_qualifying_score {
            return Err(GameError::Validation(format!(
                "Score must be at least {}",
                self.min_qualifying_score
            )));
        }

        let entry = ScoreEntry {
            id: Uuid::new_v4(),
            name,
            score,
            timestamp: Utc::now(),
            metadata,
        };

        // Stable sort keeps older entries ahead on equal scores
        self.scores.push(entry.clone());
        self.scores.sort_by(|a, b| b.score.cmp(&a.score));
        self.scores.truncate(self.capacity);

        let rank = self
            .scores
            .iter()
            .position(|s| s.id == entry.id)
            .map(|index| index + 1);

        tracing::info!("New practice score: {} - {} points", entry.name, score);

        Ok(SubmissionResult {
            rank,
            total: self.scores.len(),
            entry,
        })
    }

    pub fn top(&self, limit: usize) -> Vec<RankedEntry> {
        self.scores
            .iter()
            .take(limit)
            .enumerate()
            .map(|(index, entry)| RankedEntry {
                rank: index + 1,
                entry: entry.clone(),
            })
            .collect()
    }

    pub fn player_stats(&self, player_name: &str) -> Option<PlayerStats> {
        let wanted = player_name.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }

        let positions: Vec<usize> = self
            .scores
            .iter()
            .enumerate()
            .filter(|(_, s)| s.name.to_lowercase() == wanted)
            .map(|(index, _)| index)
            .collect();
        let best_index = *positions.first()?;

        let total: u64 = positions.iter().map(|&i| self.scores[i].score as u64).sum();
        let average = total as f64 / positions.len() as f64;

        Some(PlayerStats {
            player_name: player_name.trim().to_string(),
            best_score: self.scores[best_index].score,
            total_games: positions.len(),
            average_score: round_one_decimal(average),
            best_rank: Some(best_index + 1),
            top_scores: positions
                .iter()
                .take(5)
                .map(|&i| self.scores[i].clone())
                .collect(),
        })
    }

    pub fn stats(&self) -> LeaderboardStats {
        let total_scores = self.scores.len();
        let average = if total_scores > 0 {
            self.scores.iter().map(|s| s.score as u64).sum::<u64>() as f64 / total_scores as f64
        } else {
            0.0
        };
        let unique_players: HashSet<String> =
            self.scores.iter().map(|s| s.name.to_lowercase()).collect();

        LeaderboardStats {
            total_scores,
            unique_players: unique_players.len(),
            average_score: round_one_decimal(average),
            top_score: self.scores.first().map(|s| s.score).unwrap_or(0),
            qualifying_threshold: self.min_qualifying_score,
        }
    }

    pub fn clear(&mut self) -> usize {
        let count = self.scores.len();
        self.scores.clear();
        tracing::info!("Cleared {} practice scores", count);
        count
    }

    pub fn remove(&mut self, score_id: Uuid) -> bool {
        let before = self.scores.len();
        self.scores.retain(|s| s.id != score_id);
        before > self.scores.len()
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
