use crate::{
    error::GameError,
    models::ScoreMetadata,
    practice::PracticeSession,
    routes::parse_json,
    AppState,
};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header::USER_AGENT, HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

type ApiResult<T = Json<Value>> = Result<T, GameError>;

/// Most leaderboard rows returned in one request
pub const MAX_LEADERBOARD_LIMIT: usize = 50;
const DEFAULT_LEADERBOARD_LIMIT: usize = 10;

#[derive(Debug, Default, Deserialize)]
pub struct StartSessionRequest {
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GuessRequest {
    #[serde(default)]
    pub guess: String,
}

/// A score either carried by a finished session or reported by the client
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSubmission {
    #[serde(alias = "name")]
    pub player_name: String,
    pub session_id: Option<Uuid>,
    pub score: Option<u32>,
    #[serde(default)]
    pub words_attempted: u32,
    #[serde(default)]
    pub accuracy: u32,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

fn session_not_found(session_id: Uuid) -> GameError {
    GameError::NotFound(format!("Practice session not found: {}", session_id))
}

pub async fn start_session(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let request: StartSessionRequest = if body.is_empty() {
        StartSessionRequest::default()
    } else {
        parse_json(&body)?
    };
    let language = request
        .language
        .unwrap_or_else(|| state.config.words.default_language.clone());

    let now = Utc::now();
    let session = {
        let mut rng = rand::rng();
        PracticeSession::start(&language, state.practice_rules(), now, &mut rng)?
    };
    let view = session.view(now);
    tracing::info!("Practice session {} started ({})", session.id, language);
    state.practice_sessions.insert(session.id, session);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "session": view })),
    ))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> ApiResult {
    let session = state
        .practice_sessions
        .get(&session_id)
        .ok_or_else(|| session_not_found(session_id))?;
    Ok(Json(json!({ "success": true, "session": session.view(Utc::now()) })))
}

pub async fn submit_guess(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    body: Bytes,
) -> ApiResult {
    let request: GuessRequest = parse_json(&body)?;
    let mut session = state
        .practice_sessions
        .get_mut(&session_id)
        .ok_or_else(|| session_not_found(session_id))?;

    let now = Utc::now();
    let attempt = session.guess(&request.guess, now)?;
    Ok(Json(json!({
        "success": true,
        "correct": attempt.correct,
        "points": attempt.points,
        "session": session.view(now),
    })))
}

pub async fn skip_word(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> ApiResult {
    let mut session = state
        .practice_sessions
        .get_mut(&session_id)
        .ok_or_else(|| session_not_found(session_id))?;

    let now = Utc::now();
    let attempt = session.skip(now)?;
    Ok(Json(json!({
        "success": true,
        "word": attempt.word,
        "session": session.view(now),
    })))
}

pub async fn finish_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> ApiResult {
    let mut session = state
        .practice_sessions
        .get_mut(&session_id)
        .ok_or_else(|| session_not_found(session_id))?;

    let results = session.finish(Utc::now());
    Ok(Json(json!({ "success": true, "results": results })))
}

pub async fn submit_score(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let request: ScoreSubmission = parse_json(&body)?;
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let (score, metadata) = match request.session_id {
        Some(session_id) => {
            // Take the session out so the same run cannot be submitted twice
            let now = Utc::now();
            let (_, session) = state
                .practice_sessions
                .remove_if(&session_id, |_, session| session.is_over(now))
                .ok_or_else(|| {
                    if state.practice_sessions.contains_key(&session_id) {
                        GameError::InvalidState("Practice session is still running".to_string())
                    } else {
                        session_not_found(session_id)
                    }
                })?;
            let results = session.results();
            (
                results.score,
                ScoreMetadata {
                    words_attempted: results.words_attempted as u32,
                    accuracy: results.accuracy,
                    user_agent,
                },
            )
        }
        None => {
            let score = request
                .score
                .ok_or_else(|| GameError::Validation("Score is required".to_string()))?;
            (
                score,
                ScoreMetadata {
                    words_attempted: request.words_attempted,
                    accuracy: request.accuracy.min(100),
                    user_agent,
                },
            )
        }
    };

    let result = state
        .leaderboard
        .write()
        .await
        .add_score(&request.player_name, score, metadata)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "entry": result.entry,
            "rank": result.rank,
            "total": result.total,
        })),
    ))
}

pub async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> Json<Value> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
        .min(MAX_LEADERBOARD_LIMIT);
    let board = state.leaderboard.read().await;
    let leaderboard = board.top(limit);
    Json(json!({
        "success": true,
        "leaderboard": leaderboard,
        "total": board.stats().total_scores,
    }))
}

pub async fn player_stats(
    State(state): State<Arc<AppState>>,
    Path(player_name): Path<String>,
) -> ApiResult {
    let stats = state
        .leaderboard
        .read()
        .await
        .player_stats(&player_name)
        .ok_or_else(|| GameError::NotFound(format!("Player not found: {}", player_name)))?;
    Ok(Json(json!({ "success": true, "stats": stats })))
}

pub async fn leaderboard_stats(State(state): State<Arc<AppState>>) -> Json<Value> {
    let stats = state.leaderboard.read().await.stats();
    Json(json!({ "success": true, "stats": stats }))
}

pub async fn clear_leaderboard(State(state): State<Arc<AppState>>) -> Json<Value> {
    let cleared = state.leaderboard.write().await.clear();
    Json(json!({
        "success": true,
        "message": format!("Cleared {} scores", cleared),
        "cleared": cleared,
    }))
}

pub async fn delete_score(
    State(state): State<Arc<AppState>>,
    Path(score_id): Path<Uuid>,
) -> ApiResult {
    if !state.leaderboard.write().await.remove(score_id) {
        return Err(GameError::NotFound(format!("Score not found: {}", score_id)));
    }
    Ok(Json(json!({ "success": true, "message": "Score deleted" })))
}
