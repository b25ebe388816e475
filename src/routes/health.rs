use std::{collections::BTreeMap, sync::Arc};

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::AppState;

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let words: BTreeMap<String, usize> = state
        .words
        .languages()
        .into_iter()
        .filter_map(|language| {
            let count = state.words.word_count(&language).ok()?;
            Some((language, count))
        })
        .collect();
    let practice = state.leaderboard.read().await.stats();

    Json(json!({
        "status": "ok",
        "service": "alias-backend",
        "version": env!("CARGO_PKG_VERSION"),
        "uptimeSecs": state.started_at.elapsed().as_secs(),
        "words": words,
        "activeGames": state.games.active_game_count(),
        "practiceSessions": state.practice_sessions.len(),
        "practiceScores": practice.total_scores,
        "practicePlayers": practice.unique_players,
    }))
}
