pub mod game;
pub mod health;
pub mod practice;
pub mod words;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use serde::de::DeserializeOwned;

use crate::{error::GameError, websocket, AppState};

pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/game", game_routes())
        .nest("/api/words", word_routes())
        .nest("/api/practice", practice_routes())
}

fn game_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(game::list_games))
        .route("/create", post(game::create_game))
        .route("/cleanup", post(game::cleanup_games))
        .route("/{id}", get(game::get_game).delete(game::delete_game))
        .route("/{id}/stats", get(game::game_stats))
        .route("/{id}/teams", post(game::add_team))
        .route("/{id}/start", post(game::start_game))
        .route("/{id}/reset", post(game::reset_game))
        .route("/{id}/turn/start", post(game::start_turn))
        .route("/{id}/turn/guess", post(game::record_guess))
        .route("/{id}/turn/skip", post(game::record_skip))
        .route("/{id}/turn/end", post(game::end_turn))
        .route("/{id}/turn/submit", post(game::submit_turn))
        .route("/{id}/ws", get(websocket::handle_websocket))
}

fn word_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/next", get(words::next_word))
        .route("/batch", get(words::word_batch))
        .route("/batch/{count}", get(words::word_batch_sized))
        .route("/stats", get(words::word_stats))
        .route("/reload", post(words::reload_words))
}

fn practice_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sessions", post(practice::start_session))
        .route("/sessions/{id}", get(practice::get_session))
        .route("/sessions/{id}/guess", post(practice::submit_guess))
        .route("/sessions/{id}/skip", post(practice::skip_word))
        .route("/sessions/{id}/finish", post(practice::finish_session))
        .route("/score", post(practice::submit_score))
        .route("/score/{id}", delete(practice::delete_score))
        .route(
            "/leaderboard",
            get(practice::get_leaderboard).delete(practice::clear_leaderboard),
        )
        .route("/player/{name}", get(practice::player_stats))
        .route("/stats", get(practice::leaderboard_stats))
}

/// Parse a JSON request body, reporting malformed input in the usual error shape
pub(crate) fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, GameError> {
    serde_json::from_slice(body)
        .map_err(|e| GameError::Validation(format!("Invalid request body: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_state;
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    fn app() -> Router {
        create_routes().with_state(test_state())
    }

    async fn create_started_game(app: &Router) -> String {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/game/create",
            Some(json!({
                "settings": { "winningPosition": 3 },
                "teams": [
                    { "name": "Red", "color": "#f00" },
                    { "name": "Blue", "color": "#00f" }
                ]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let game_id = body["gameId"].as_str().unwrap().to_string();

        let (status, _) = send(app, Method::POST, &format!("/api/game/{}/start", game_id), None).await;
        assert_eq!(status, StatusCode::OK);
        game_id
    }

    #[tokio::test]
    async fn test_health_reports_word_counts() {
        let (status, body) = send(&app(), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert!(body["words"]["en"].as_u64().unwrap() > 0);
        assert_eq!(body["activeGames"], 0);
    }

    #[tokio::test]
    async fn test_create_game_without_body_uses_defaults() {
        let app = app();
        let (status, body) = send(&app, Method::POST, "/api/game/create", None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(body["gameState"]["gameSettings"]["winningPosition"], 30);
        assert_eq!(body["gameState"]["language"], "en");
        assert_eq!(body["gameId"].as_str().unwrap().len(), 16);
    }

    #[tokio::test]
    async fn test_full_turn_over_http() {
        let app = app();
        let game_id = create_started_game(&app).await;
        let base = format!("/api/game/{}", game_id);

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("{}/turn/start", base),
            Some(json!({ "teamId": 0 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["gameState"]["turnActive"], true);

        send(&app, Method::POST, &format!("{}/turn/guess", base), None).await;
        send(&app, Method::POST, &format!("{}/turn/guess", base), None).await;
        send(&app, Method::POST, &format!("{}/turn/skip", base), None).await;
        let (status, body) = send(&app, Method::POST, &format!("{}/turn/end", base), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["gameState"]["teams"][0]["position"], 1);
        assert_eq!(body["gameState"]["currentTeamIndex"], 1);

        // The turn already ended
        let (status, body) = send(&app, Method::POST, &format!("{}/turn/end", base), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, body) = send(&app, Method::GET, &format!("{}/stats", base), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stats"]["totalTurns"], 1);
    }

    #[tokio::test]
    async fn test_submit_turn_can_finish_game() {
        let app = app();
        let game_id = create_started_game(&app).await;
        let base = format!("/api/game/{}", game_id);

        // Red reaches the goal; Blue still gets the final-round turn
        send(&app, Method::POST, &format!("{}/turn/start", base), Some(json!({ "teamId": 0 }))).await;
        let (_, body) = send(
            &app,
            Method::POST,
            &format!("{}/turn/submit", base),
            Some(json!({ "wordsGuessed": 4, "wordsSkipped": 0 })),
        )
        .await;
        assert!(body["gameState"]["winner"].is_null());

        send(&app, Method::POST, &format!("{}/turn/start", base), Some(json!({ "teamId": 1 }))).await;
        let (status, body) = send(
            &app,
            Method::POST,
            &format!("{}/turn/submit", base),
            Some(json!({ "wordsGuessed": 1, "wordsSkipped": 0 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["gameState"]["winner"], "Red");
    }

    #[tokio::test]
    async fn test_submit_turn_rejects_oversized_counts() {
        let app = app();
        let game_id = create_started_game(&app).await;
        let base = format!("/api/game/{}", game_id);

        send(&app, Method::POST, &format!("{}/turn/start", base), Some(json!({ "teamId": 0 }))).await;
        for counts in [
            json!({ "wordsGuessed": 4294967295u64, "wordsSkipped": 0 }),
            json!({ "wordsGuessed": 0, "wordsSkipped": 2147483647 }),
        ] {
            let (status, body) =
                send(&app, Method::POST, &format!("{}/turn/submit", base), Some(counts)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["success"], false);
        }

        let (_, body) = send(&app, Method::GET, &base, None).await;
        let state = &body["gameState"];
        assert_eq!(state["teams"][0]["position"], 0);
        assert_eq!(state["teams"][0]["totalScore"], 0);
        assert_eq!(state["turnHistory"].as_array().unwrap().len(), 0);
        assert_eq!(state["turnActive"], true);
    }

    #[tokio::test]
    async fn test_unknown_game_is_404() {
        let app = app();
        let (status, body) = send(&app, Method::GET, "/api/game/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Game not found: nope");

        let (status, _) = send(&app, Method::DELETE, "/api/game/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected() {
        let app = app();
        let (_, body) = send(&app, Method::POST, "/api/game/create", None).await;
        let game_id = body["gameId"].as_str().unwrap();

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/game/{}/turn/start", game_id),
            Some(json!({ "team": "zero" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
    }

    #[tokio::test]
    async fn test_delete_and_list_games() {
        let app = app();
        let game_id = create_started_game(&app).await;

        let (_, body) = send(&app, Method::GET, "/api/game", None).await;
        assert_eq!(body["count"], 1);

        let (status, _) = send(&app, Method::DELETE, &format!("/api/game/{}", game_id), None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&app, Method::GET, "/api/game", None).await;
        assert_eq!(body["count"], 0);

        let (status, body) = send(&app, Method::POST, "/api/game/cleanup", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cleaned"], 0);
    }

    #[tokio::test]
    async fn test_word_routes() {
        let app = app();
        let (status, body) = send(&app, Method::GET, "/api/words/next", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["language"], "en");
        assert!(body["word"].is_string());

        let (status, body) = send(&app, Method::GET, "/api/words/batch/3", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["words"].as_array().unwrap().len(), 3);

        let (status, _) = send(&app, Method::GET, "/api/words/batch/101", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = send(&app, Method::GET, "/api/words/batch?count=0", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, Method::GET, "/api/words/next?language=xx", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Unsupported language: xx");

        let (status, body) = send(&app, Method::GET, "/api/words/stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["stats"]["totalWords"].as_u64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_practice_session_flow() {
        let app = app();
        let (status, body) = send(&app, Method::POST, "/api/practice/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        let session_id = body["session"]["sessionId"].as_str().unwrap().to_string();
        assert!(body["session"]["hint"].is_string());
        // The answer is never part of a live session view
        assert!(body["session"].get("word").is_none());

        let base = format!("/api/practice/sessions/{}", session_id);
        let (status, body) = send(
            &app,
            Method::POST,
            &format!("{}/guess", base),
            Some(json!({ "guess": "surely-not-a-deck-word" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["correct"], false);

        let (status, body) = send(&app, Method::POST, &format!("{}/finish", base), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"]["wordsAttempted"], 1);
        assert_eq!(body["results"]["qualifies"], false);

        let (status, _) = send(&app, Method::POST, &format!("{}/skip", base), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // Score 0 does not qualify for the board
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/practice/score",
            Some(json!({ "playerName": "Dana", "sessionId": session_id })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_leaderboard_routes() {
        let app = app();
        for (name, score) in [("Dana", 5), ("Avi", 9), ("dana", 7)] {
            let (status, _) = send(
                &app,
                Method::POST,
                "/api/practice/score",
                Some(json!({ "playerName": name, "score": score, "wordsAttempted": 10 })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (_, body) = send(&app, Method::GET, "/api/practice/leaderboard?limit=2", None).await;
        let rows = body["leaderboard"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["name"], "Avi");
        assert_eq!(rows[0]["rank"], 1);
        assert_eq!(body["total"], 3);

        let (status, body) = send(&app, Method::GET, "/api/practice/player/DANA", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stats"]["totalGames"], 2);
        assert_eq!(body["stats"]["bestScore"], 7);

        let (status, _) = send(&app, Method::GET, "/api/practice/player/ghost", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = send(&app, Method::GET, "/api/practice/stats", None).await;
        assert_eq!(body["stats"]["uniquePlayers"], 2);

        let score_id = rows[1]["id"].as_str().unwrap().to_string();
        let (status, _) =
            send(&app, Method::DELETE, &format!("/api/practice/score/{}", score_id), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) =
            send(&app, Method::DELETE, &format!("/api/practice/score/{}", score_id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = send(&app, Method::DELETE, "/api/practice/leaderboard", None).await;
        assert_eq!(body["cleared"], 2);
    }
}
