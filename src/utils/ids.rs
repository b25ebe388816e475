use rand::Rng;

/// Random game id: 64 random bits as 16 lowercase hex digits
pub fn generate_game_id() -> String {
    format!("{:016x}", rand::rng().random::<u64>())
}
