//! Shared fixtures for handler and websocket tests

use std::{collections::HashMap, sync::Arc};

use crate::{config::Config, game::NewTeam, words::WordService, AppState};

pub fn test_words() -> Arc<WordService> {
    let mut lists = HashMap::new();
    lists.insert(
        "en".to_string(),
        ["apple", "bridge", "candle", "dragon", "engine", "forest", "guitar", "harbor"]
            .iter()
            .map(|word| word.to_string())
            .collect(),
    );
    lists.insert(
        "he".to_string(),
        ["כלב", "חתול", "שולחן", "מחשב"]
            .iter()
            .map(|word| word.to_string())
            .collect(),
    );
    Arc::new(WordService::from_lists(lists).unwrap())
}

pub fn test_state() -> Arc<AppState> {
    Arc::new(AppState::new(Config::for_tests(), test_words()))
}

pub fn two_teams() -> Vec<NewTeam> {
    vec![
        NewTeam {
            name: "Red".to_string(),
            color: "#e74c3c".to_string(),
        },
        NewTeam {
            name: "Blue".to_string(),
            color: "#3498db".to_string(),
        },
    ]
}
