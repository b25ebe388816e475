use crate::{
    error::GameError,
    models::Game,
    websocket::messages::{ClientMessage, ServerMessage},
    AppState,
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

/// WebSocket upgrade handler for watching and driving one game
pub async fn handle_websocket(
    ws: WebSocketUpgrade,
    Path(game_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, GameError> {
    let game = state.games.get_game(&game_id)?;
    tracing::info!("WebSocket connection requested for game {}", game_id);
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, game)))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>, game: Game) {
    let game_id = game.game_id.clone();
    let (mut sender, mut receiver) = socket.split();
    // Replies meant only for this client (snapshots on request, errors)
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(16);
    let mut events = state.events.subscribe(&game_id);

    let _ = tx.send(ServerMessage::state(&game)).await;

    // Spawn a task to send messages to the client
    let mut send_task = tokio::spawn(async move {
        loop {
            let msg = tokio::select! {
                Some(msg) = rx.recv() => msg,
                event = events.recv() => match event {
                    Ok(msg) => msg,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("WebSocket watcher lagged, skipped {} updates", skipped);
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            };

            let closing = matches!(msg, ServerMessage::GameDeleted { .. });
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to serialize message: {}", e);
                }
            }
            if closing {
                break;
            }
        }
    });

    // Handle incoming messages from the client
    let state_for_recv = state.clone();
    let game_for_recv = game_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<ClientMessage>(text.as_str()) {
                    Ok(client_msg) => {
                        match handle_client_message(client_msg, &state_for_recv, &game_for_recv) {
                            Ok(Some(reply)) => {
                                let _ = tx.send(reply).await;
                            }
                            Ok(None) => {}
                            Err(e) => {
                                tracing::debug!("Rejected message for game {}: {}", game_for_recv, e);
                                let _ = tx
                                    .send(ServerMessage::Error {
                                        message: e.to_string(),
                                    })
                                    .await;
                            }
                        }
                    }
                    Err(e) => {
                        tracing::error!("Failed to parse message: {}", e);
                        let error_msg = ServerMessage::Error {
                            message: format!("Invalid message format: {}", e),
                        };
                        let _ = tx.send(error_msg).await;
                    }
                },
                Message::Close(_) => {
                    tracing::info!("Client disconnected from game {}", game_for_recv);
                    break;
                }
                _ => {}
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
        }
        _ = (&mut recv_task) => {
            send_task.abort();
        }
    }

    tracing::info!("WebSocket connection closed for game {}", game_id);
}

/// Apply a client message to the game; broadcast updates go to every watcher,
/// the returned message only to the sender.
fn handle_client_message(
    msg: ClientMessage,
    state: &AppState,
    game_id: &str,
) -> Result<Option<ServerMessage>, GameError> {
    match msg {
        ClientMessage::StartTurn { team_index } => {
            let game = state.games.start_turn(game_id, team_index)?;
            state.events.publish_state(&game);
        }
        ClientMessage::Guess => {
            let game = state.games.record_guess(game_id)?;
            state.events.publish_state(&game);
        }
        ClientMessage::Skip => {
            let game = state.games.record_skip(game_id)?;
            state.events.publish_state(&game);
        }
        ClientMessage::EndTurn => {
            let (game, outcome) = state.games.end_turn(game_id)?;
            state.events.publish_turn_end(&game, &outcome);
        }
        ClientMessage::Sync => {
            let game = state.games.get_game(game_id)?;
            return Ok(Some(ServerMessage::state(&game)));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_state;

    #[tokio::test]
    async fn test_client_messages_drive_the_game() {
        let state = test_state();
        let game = state
            .games
            .create_game(&Default::default(), None, &crate::test_support::two_teams())
            .unwrap();
        state.games.start_game(&game.game_id).unwrap();
        let mut rx = state.events.subscribe(&game.game_id);

        handle_client_message(ClientMessage::StartTurn { team_index: 0 }, &state, &game.game_id)
            .unwrap();
        handle_client_message(ClientMessage::Guess, &state, &game.game_id).unwrap();
        handle_client_message(ClientMessage::EndTurn, &state, &game.game_id).unwrap();

        let mut snapshots = 0;
        while let Ok(msg) = rx.try_recv() {
            if matches!(msg, ServerMessage::GameState { .. }) {
                snapshots += 1;
            }
        }
        assert_eq!(snapshots, 3);
        assert_eq!(state.games.get_game(&game.game_id).unwrap().teams[0].position, 1);
    }

    #[tokio::test]
    async fn test_rejected_message_reports_error() {
        let state = test_state();
        let game = state
            .games
            .create_game(&Default::default(), None, &[])
            .unwrap();

        let result = handle_client_message(ClientMessage::Guess, &state, &game.game_id);
        assert!(matches!(result, Err(GameError::InvalidState(_))));

        let reply = handle_client_message(ClientMessage::Sync, &state, &game.game_id).unwrap();
        assert!(matches!(reply, Some(ServerMessage::GameState { .. })));
    }
}
