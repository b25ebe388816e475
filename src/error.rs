use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Errors raised by game, word and practice operations.
///
/// Every variant is local and non-retryable: the operation that produced it
/// left its state untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// Bad input (missing team name, out-of-range count, unknown language)
    #[error("{0}")]
    Validation(String),
    /// Unknown game, team, session or score id
    #[error("{0}")]
    NotFound(String),
    /// Operation not allowed in the current phase
    #[error("{0}")]
    InvalidState(String),
    /// A hard cap was reached (team roster)
    #[error("{0}")]
    LimitExceeded(String),
}

impl GameError {
    pub fn game_not_found(game_id: &str) -> Self {
        Self::NotFound(format!("Game not found: {}", game_id))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            GameError::NotFound(_) => StatusCode::NOT_FOUND,
            GameError::Validation(_)
            | GameError::InvalidState(_)
            | GameError::LimitExceeded(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::debug!("Request rejected with {}: {}", status, self);
        (
            status,
            Json(json!({
                "success": false,
                "error": self.to_string(),
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(
            GameError::game_not_found("abc").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            GameError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GameError::InvalidState("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GameError::LimitExceeded("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_not_found_message_names_game() {
        let err = GameError::game_not_found("deadbeef");
        assert_eq!(err.to_string(), "Game not found: deadbeef");
    }
}
