use crate::{
    error::GameError,
    game::NewTeam,
    models::SettingsOverrides,
    routes::parse_json,
    AppState,
};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

type ApiResult<T = Json<Value>> = Result<T, GameError>;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    #[serde(default)]
    pub settings: SettingsOverrides,
    #[serde(default)]
    pub teams: Vec<NewTeam>,
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddTeamRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartTurnRequest {
    pub team_id: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTurnRequest {
    pub words_guessed: u32,
    pub words_skipped: u32,
}

/// Create a new game; the body is optional
pub async fn create_game(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let request: CreateGameRequest = if body.is_empty() {
        CreateGameRequest::default()
    } else {
        parse_json(&body)?
    };

    let game = state.games.create_game(
        &request.settings,
        request.language.as_deref(),
        &request.teams,
    )?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "gameId": game.game_id,
            "gameState": game,
        })),
    ))
}

pub async fn get_game(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> ApiResult {
    let game = state.games.get_game(&game_id)?;
    Ok(Json(json!({ "success": true, "gameState": game })))
}

pub async fn add_team(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    body: Bytes,
) -> ApiResult {
    let request: AddTeamRequest = parse_json(&body)?;
    let game = state
        .games
        .add_team(&game_id, &request.name, &request.color)?;
    state.events.publish_state(&game);
    Ok(Json(json!({ "success": true, "gameState": game })))
}

pub async fn start_game(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> ApiResult {
    let game = state.games.start_game(&game_id)?;
    state.events.publish_state(&game);
    Ok(Json(json!({ "success": true, "gameState": game })))
}

pub async fn start_turn(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    body: Bytes,
) -> ApiResult {
    let request: StartTurnRequest = parse_json(&body)?;
    let game = state.games.start_turn(&game_id, request.team_id)?;
    state.events.publish_state(&game);
    Ok(Json(json!({ "success": true, "gameState": game })))
}

pub async fn record_guess(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> ApiResult {
    let game = state.games.record_guess(&game_id)?;
    state.events.publish_state(&game);
    Ok(Json(json!({ "success": true, "gameState": game })))
}

pub async fn record_skip(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> ApiResult {
    let game = state.games.record_skip(&game_id)?;
    state.events.publish_state(&game);
    Ok(Json(json!({ "success": true, "gameState": game })))
}

pub async fn end_turn(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> ApiResult {
    let (game, outcome) = state.games.end_turn(&game_id)?;
    state.events.publish_turn_end(&game, &outcome);
    Ok(Json(json!({ "success": true, "gameState": game })))
}

/// Submit a turn tallied on the client
pub async fn submit_turn(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    body: Bytes,
) -> ApiResult {
    let request: SubmitTurnRequest = parse_json(&body)?;
    let (game, outcome) =
        state
            .games
            .submit_turn(&game_id, request.words_guessed, request.words_skipped)?;
    state.events.publish_turn_end(&game, &outcome);
    Ok(Json(json!({ "success": true, "gameState": game })))
}

pub async fn reset_game(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> ApiResult {
    let game = state.games.reset_game(&game_id)?;
    state.events.publish_state(&game);
    Ok(Json(json!({ "success": true, "gameState": game })))
}

pub async fn delete_game(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> ApiResult {
    state.games.delete_game(&game_id)?;
    state.events.close(&game_id);
    Ok(Json(json!({
        "success": true,
        "message": "Game deleted successfully",
    })))
}

pub async fn game_stats(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> ApiResult {
    let stats = state.games.game_stats(&game_id)?;
    Ok(Json(json!({ "success": true, "stats": stats })))
}

pub async fn list_games(State(state): State<Arc<AppState>>) -> Json<Value> {
    let games = state.games.list_games();
    Json(json!({
        "success": true,
        "count": games.len(),
        "games": games,
    }))
}

pub async fn cleanup_games(State(state): State<Arc<AppState>>) -> Json<Value> {
    let cleaned = state.games.cleanup_older_than(state.game_expiry());
    Json(json!({
        "success": true,
        "message": format!("Cleaned up {} old games", cleaned),
        "cleaned": cleaned,
    }))
}
