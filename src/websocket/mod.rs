pub mod handler;
pub mod messages;

use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::{game::TurnOutcome, models::Game};
use messages::ServerMessage;

pub use handler::handle_websocket;

/// Buffered messages per game before slow subscribers start lagging
const CHANNEL_CAPACITY: usize = 64;

/// Fan-out of game updates to everyone watching a game
#[derive(Default)]
pub struct GameEvents {
    channels: DashMap<String, broadcast::Sender<ServerMessage>>,
}

impl GameEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, game_id: &str) -> broadcast::Receiver<ServerMessage> {
        self.channels
            .entry(game_id.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    pub fn publish(&self, game_id: &str, message: ServerMessage) {
        if let Some(tx) = self.channels.get(game_id) {
            // No receivers just means nobody is watching right now
            let _ = tx.send(message);
        }
    }

    pub fn publish_state(&self, game: &Game) {
        self.publish(&game.game_id, ServerMessage::state(game));
    }

    pub fn publish_turn_end(&self, game: &Game, outcome: &TurnOutcome) {
        self.publish_state(game);
        if let Some(message) = ServerMessage::from_outcome(outcome) {
            self.publish(&game.game_id, message);
        }
    }

    /// Tell watchers the game is gone and drop its channel
    pub fn close(&self, game_id: &str) {
        self.publish(
            game_id,
            ServerMessage::GameDeleted {
                game_id: game_id.to_string(),
            },
        );
        self.channels.remove(game_id);
    }

    /// Close the channels of games that no longer exist
    pub fn close_missing(&self, exists: impl Fn(&str) -> bool) -> usize {
        let missing: Vec<String> = self
            .channels
            .iter()
            .filter(|entry| !exists(entry.key()))
            .map(|entry| entry.key().clone())
            .collect();
        for game_id in &missing {
            self.close(game_id);
        }
        missing.len()
    }

    /// Drop channels nobody listens to any more
    pub fn prune(&self) -> usize {
        let before = self.channels.len();
        self.channels.retain(|_, tx| tx.receiver_count() > 0);
        before - self.channels.len()
    }

    pub fn watcher_count(&self, game_id: &str) -> usize {
        self.channels
            .get(game_id)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }
}
