use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub game: GameConfig,
    pub words: WordsConfig,
    pub practice: PracticeConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    /// Default board goal for new games
    pub winning_position: u32,
    /// Default turn length in seconds for new games
    pub turn_duration: u32,
    /// Games idle longer than this are removed by the cleanup task
    pub game_expiry_hours: i64,
    pub cleanup_interval_secs: u64,
    /// End turns server-side once their clock runs out
    pub auto_end_turns: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WordsConfig {
    pub words_path: String,
    pub default_language: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PracticeConfig {
    pub leaderboard_capacity: usize,
    pub min_qualifying_score: u32,
    pub session_duration: u32,
    pub hint_interval: u32,
}

fn parse_var<T: std::str::FromStr>(name: &str, default: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .with_context(|| format!("{} must be a valid value", name))
}

/// Longest idle time a game may be kept: one year
pub const MAX_GAME_EXPIRY_HOURS: i64 = 24 * 365;

impl GameConfig {
    pub fn validate(&self) -> Result<()> {
        if self.winning_position == 0 || self.turn_duration == 0 {
            anyhow::bail!("WINNING_POSITION and TURN_DURATION must be greater than zero");
        }
        if !(1..=MAX_GAME_EXPIRY_HOURS).contains(&self.game_expiry_hours) {
            anyhow::bail!(
                "GAME_EXPIRY_HOURS must be between 1 and {}",
                MAX_GAME_EXPIRY_HOURS
            );
        }
        Ok(())
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let server = ServerConfig {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", "3001")?,
        };

        let game = GameConfig {
            winning_position: parse_var("WINNING_POSITION", "30")?,
            turn_duration: parse_var("TURN_DURATION", "60")?,
            game_expiry_hours: parse_var("GAME_EXPIRY_HOURS", "24")?,
            cleanup_interval_secs: parse_var("CLEANUP_INTERVAL_SECS", "3600")?,
            auto_end_turns: parse_var("AUTO_END_TURNS", "false")?,
        };

        game.validate()?;

        let words = WordsConfig {
            words_path: env::var("WORDS_PATH")
                .unwrap_or_else(|_| "./data/words.json".to_string()),
            default_language: env::var("DEFAULT_LANGUAGE").unwrap_or_else(|_| "he".to_string()),
        };

        let practice = PracticeConfig {
            leaderboard_capacity: parse_var("LEADERBOARD_CAPACITY", "100")?,
            min_qualifying_score: parse_var("MIN_QUALIFYING_SCORE", "4")?,
            session_duration: parse_var("PRACTICE_DURATION", "60")?,
            hint_interval: parse_var("HINT_INTERVAL", "15")?,
        };

        Ok(Config {
            server,
            game,
            words,
            practice,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
impl Config {
    /// Defaults used by handler tests, independent of the process environment
    pub fn for_tests() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            game: GameConfig {
                winning_position: 30,
                turn_duration: 60,
                game_expiry_hours: 24,
                cleanup_interval_secs: 3600,
                auto_end_turns: false,
            },
            words: WordsConfig {
                words_path: "./data/words.json".to_string(),
                default_language: "en".to_string(),
            },
            practice: PracticeConfig {
                leaderboard_capacity: 100,
                min_qualifying_score: 4,
                session_duration: 60,
                hint_interval: 15,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_var_uses_default_when_unset() {
        let value: u32 = parse_var("ALIAS_TEST_SURELY_UNSET_VAR", "42").unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_parse_var_rejects_garbage_default() {
        let value: Result<u32> = parse_var("ALIAS_TEST_SURELY_UNSET_VAR", "forty-two");
        assert!(value.is_err());
    }

    #[test]
    fn test_game_config_validation() {
        let valid = Config::for_tests().game;
        assert!(valid.validate().is_ok());

        for hours in [0, -1, MAX_GAME_EXPIRY_HOURS + 1, i64::MAX] {
            let game = GameConfig {
                game_expiry_hours: hours,
                ..valid.clone()
            };
            assert!(game.validate().is_err(), "expiry of {} hours accepted", hours);
        }

        let game = GameConfig {
            turn_duration: 0,
            ..valid.clone()
        };
        assert!(game.validate().is_err());
    }

    #[test]
    fn test_server_addr() {
        let config = Config::for_tests();
        assert_eq!(config.server_addr(), "127.0.0.1:0");
    }
}
