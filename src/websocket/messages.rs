use serde::{Deserialize, Serialize};

use crate::{game::TurnOutcome, models::Game};

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    StartTurn { team_index: usize },
    Guess,
    Skip,
    EndTurn,
    /// Ask for a fresh snapshot
    Sync,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    GameState {
        game: Box<Game>,
    },
    FinalRound {
        target_turns: u32,
    },
    GameOver {
        winner: String,
        winner_index: usize,
    },
    GameDeleted {
        game_id: String,
    },
    Error {
        message: String,
    },
}

impl ServerMessage {
    pub fn state(game: &Game) -> Self {
        ServerMessage::GameState {
            game: Box::new(game.clone()),
        }
    }

    /// Announcement for outcomes worth more than a state refresh
    pub fn from_outcome(outcome: &TurnOutcome) -> Option<Self> {
        match outcome {
            TurnOutcome::Continue { .. } => None,
            TurnOutcome::FinalRoundStarted { target_turns } => Some(ServerMessage::FinalRound {
                target_turns: *target_turns,
            }),
            TurnOutcome::GameOver {
                winner,
                winner_index,
            } => Some(ServerMessage::GameOver {
                winner: winner.clone(),
                winner_index: *winner_index,
            }),
        }
    }
}
