mod config;
mod error;
mod game;
mod models;
mod practice;
mod routes;
#[cfg(test)]
mod test_support;
mod utils;
mod websocket;
mod words;

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Result;
use chrono::Utc;
use config::Config;
use dashmap::DashMap;
use game::{GameService, MemoryGameStore};
use models::GameSettings;
use practice::{Leaderboard, PracticeRules, PracticeSession};
use tokio::sync::RwLock;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;
use websocket::GameEvents;
use words::WordService;

/// How often the turn clock is checked when turns end on their own
const TURN_EXPIRY_TICK: Duration = Duration::from_secs(1);

/// Application state shared across all handlers
pub struct AppState {
    pub config: Config,
    pub words: Arc<WordService>,
    pub games: GameService<MemoryGameStore>,
    /// Live update channels, one per watched game
    pub events: GameEvents,
    pub practice_sessions: DashMap<Uuid, PracticeSession>,
    pub leaderboard: RwLock<Leaderboard>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Config, words: Arc<WordService>) -> Self {
        let defaults = GameSettings {
            winning_position: config.game.winning_position,
            turn_duration: config.game.turn_duration,
        };
        let games = GameService::new(
            MemoryGameStore::new(),
            words.clone(),
            defaults,
            config.words.default_language.clone(),
        );
        let leaderboard = Leaderboard::new(
            config.practice.leaderboard_capacity,
            config.practice.min_qualifying_score,
        );

        Self {
            config,
            words,
            games,
            events: GameEvents::new(),
            practice_sessions: DashMap::new(),
            leaderboard: RwLock::new(leaderboard),
            started_at: Instant::now(),
        }
    }

    pub fn practice_rules(&self) -> PracticeRules {
        PracticeRules {
            duration_secs: self.config.practice.session_duration,
            hint_interval_secs: self.config.practice.hint_interval,
            min_qualifying_score: self.config.practice.min_qualifying_score,
        }
    }

    /// Idle time after which a game is removed
    pub fn game_expiry(&self) -> chrono::Duration {
        chrono::Duration::hours(self.config.game.game_expiry_hours)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "alias_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Alias backend server...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Load word lists
    let words = match WordService::load(&config.words.words_path).await {
        Ok(words) => {
            tracing::info!("Word lists loaded for {:?}", words.languages());
            words
        }
        Err(e) => {
            tracing::warn!("Failed to load word lists: {:#}. Starting without words.", e);
            tracing::warn!(
                "Put a word file at {} and call POST /api/words/reload",
                config.words.words_path
            );
            WordService::empty()
        }
    };

    let state = Arc::new(AppState::new(config.clone(), Arc::new(words)));

    // Spawn background task to remove idle games and stale practice sessions
    let cleanup_state = state.clone();
    tokio::spawn(async move {
        cleanup_task(cleanup_state).await;
    });

    if config.game.auto_end_turns {
        let expiry_state = state.clone();
        tokio::spawn(async move {
            turn_expiry_task(expiry_state).await;
        });
        tracing::info!("Turns end automatically when their clock runs out");
    }

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = routes::create_routes()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Game API: http://{}/api/game", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Background task that periodically removes idle games and finished practice sessions
async fn cleanup_task(state: Arc<AppState>) {
    let mut interval =
        tokio::time::interval(Duration::from_secs(state.config.game.cleanup_interval_secs.max(1)));
    // The first tick fires immediately; nothing is old enough yet
    interval.tick().await;

    loop {
        interval.tick().await;
        run_cleanup(&state);
    }
}

/// One cleanup pass; returns (games removed, practice sessions removed)
fn run_cleanup(state: &AppState) -> (usize, usize) {
    let games = state.games.cleanup_older_than(state.game_expiry());
    let closed = state
        .events
        .close_missing(|game_id| state.games.game_exists(game_id));
    let pruned = state.events.prune();

    let now = Utc::now();
    let before = state.practice_sessions.len();
    state
        .practice_sessions
        .retain(|_, session| !session.is_stale(now));
    let sessions = before.saturating_sub(state.practice_sessions.len());

    if games + sessions + closed + pruned > 0 {
        tracing::info!(
            "Cleanup removed {} games, {} practice sessions, {} event channels",
            games,
            sessions,
            closed + pruned
        );
    }
    (games, sessions)
}

/// Background task that ends turns whose clock has run out
async fn turn_expiry_task(state: Arc<AppState>) {
    let mut interval = tokio::time::interval(TURN_EXPIRY_TICK);

    loop {
        interval.tick().await;
        for (game, outcome) in state.games.expire_turns(Utc::now()) {
            state.events.publish_turn_end(&game, &outcome);
        }
    }
}
