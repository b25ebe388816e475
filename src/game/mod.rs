pub mod engine;
pub mod service;
pub mod store;

pub use engine::TurnOutcome;
pub use service::{GameService, NewTeam};
pub use store::MemoryGameStore;
