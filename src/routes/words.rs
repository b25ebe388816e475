use crate::{error::GameError, words::WordSource, AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Largest batch a client can ask for in one request
pub const MAX_BATCH_SIZE: usize = 100;
const DEFAULT_BATCH_SIZE: usize = 10;

#[derive(Debug, Deserialize)]
pub struct LanguageQuery {
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BatchQuery {
    pub language: Option<String>,
    pub count: Option<usize>,
}

fn language_or_default(state: &AppState, language: Option<String>) -> String {
    language.unwrap_or_else(|| state.config.words.default_language.clone())
}

pub async fn next_word(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<Value>, GameError> {
    let language = language_or_default(&state, query.language);
    let draw = state.words.draw(&language)?;
    Ok(Json(json!({
        "success": true,
        "word": draw.word,
        "remaining": draw.remaining,
        "total": draw.total,
        "language": draw.language,
    })))
}

pub async fn word_batch(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BatchQuery>,
) -> Result<Json<Value>, GameError> {
    let count = query.count.unwrap_or(DEFAULT_BATCH_SIZE);
    batch_response(&state, query.language, count)
}

pub async fn word_batch_sized(
    State(state): State<Arc<AppState>>,
    Path(count): Path<usize>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<Value>, GameError> {
    batch_response(&state, query.language, count)
}

fn batch_response(
    state: &AppState,
    language: Option<String>,
    count: usize,
) -> Result<Json<Value>, GameError> {
    if !(1..=MAX_BATCH_SIZE).contains(&count) {
        return Err(GameError::Validation(format!(
            "Count must be between 1 and {}",
            MAX_BATCH_SIZE
        )));
    }

    let language = language_or_default(state, language);
    let words = state.words.batch(&language, count)?;
    Ok(Json(json!({
        "success": true,
        "count": words.len(),
        "words": words,
        "language": language,
    })))
}

pub async fn word_stats(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<Value>, GameError> {
    let language = language_or_default(&state, query.language);
    let stats = state.words.stats(&language)?;
    Ok(Json(json!({
        "success": true,
        "stats": stats,
        "languages": state.words.languages(),
    })))
}

/// Re-read the word file from disk; the old pools stay if it fails
pub async fn reload_words(State(state): State<Arc<AppState>>) -> Response {
    match state.words.reload(&state.config.words.words_path).await {
        Ok(stats) => Json(json!({
            "success": true,
            "message": "Word lists reloaded",
            "stats": stats,
        }))
        .into_response(),
        Err(e) => {
            tracing::error!("Failed to reload word lists: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "error": format!("Failed to reload word lists: {}", e),
                })),
            )
                .into_response()
        }
    }
}
