// Single-player practice mode and its leaderboard

pub mod deck;
pub mod leaderboard;
pub mod session;

pub use leaderboard::Leaderboard;
pub use session::{PracticeRules, PracticeSession};
