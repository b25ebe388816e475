use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::GameError,
    practice::deck::{self, PracticeCard},
    words::shuffle,
};

/// Highest hint index; hints get easier as the level rises
pub const MAX_HINT_LEVEL: usize = 2;
/// Correct answers in a row needed before the streak bonus applies
pub const STREAK_BONUS_THRESHOLD: u32 = 3;

/// Sessions are kept around this long after they end so results can be read
const STALE_AFTER_SECS: i64 = 600;

#[derive(Debug, Clone, Copy)]
pub struct PracticeRules {
    pub duration_secs: u32,
    pub hint_interval_secs: u32,
    pub min_qualifying_score: u32,
}

impl Default for PracticeRules {
    fn default() -> Self {
        Self {
            duration_secs: 60,
            hint_interval_secs: 15,
            min_qualifying_score: 4,
        }
    }
}

/// Points for a correct answer at the given hint level.
/// 3 on the hardest hint down to 1 on the easiest, plus one while on a streak.
pub fn points_for(hint_level: usize, streak: u32) -> u32 {
    let base = match hint_level {
        0 => 3,
        1 => 2,
        _ => 1,
    };
    if streak >= STREAK_BONUS_THRESHOLD {
        base + 1
    } else {
        base
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PracticeAttempt {
    pub word: String,
    /// None when the word was skipped
    pub guess: Option<String>,
    pub correct: bool,
    pub hint_level: usize,
    pub points: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeView {
    pub session_id: Uuid,
    pub language: String,
    /// Hint for the current word; None once the session is over
    pub hint: Option<String>,
    pub hint_level: usize,
    pub time_left: u32,
    pub score: u32,
    pub streak: u32,
    pub words_attempted: usize,
    pub finished: bool,
    pub last_attempt: Option<PracticeAttempt>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PracticeResults {
    pub score: u32,
    pub words_attempted: usize,
    pub correct: usize,
    /// Percentage of attempts answered correctly
    pub accuracy: u32,
    pub duration_secs: u32,
    pub qualifies: bool,
    pub attempts: Vec<PracticeAttempt>,
}

/// A single player's timed run through a shuffled practice deck
#[derive(Debug, Clone)]
pub struct PracticeSession {
    pub id: Uuid,
    pub language: String,
    cards: Vec<PracticeCard>,
    card_index: usize,
    card_shown_at: DateTime<Utc>,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    rules: PracticeRules,
    score: u32,
    streak: u32,
    attempts: Vec<PracticeAttempt>,
}

impl PracticeSession {
    pub fn start<R: Rng + ?Sized>(
        language: &str,
        rules: PracticeRules,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        let deck = deck::deck(language).ok_or_else(|| {
            GameError::Validation(format!("No practice deck for language: {}", language))
        })?;
        let mut cards = deck.to_vec();
        shuffle(&mut cards, rng);

        Ok(Self {
            id: Uuid::new_v4(),
            language: language.to_string(),
            cards,
            card_index: 0,
            card_shown_at: now,
            started_at: now,
            ended_at: None,
            rules,
            score: 0,
            streak: 0,
            attempts: Vec::new(),
        })
    }

    fn deadline(&self) -> DateTime<Utc> {
        self.started_at + Duration::seconds(self.rules.duration_secs as i64)
    }

    pub fn is_over(&self, now: DateTime<Utc>) -> bool {
        self.ended_at.is_some() || now >= self.deadline()
    }

    pub fn time_left(&self, now: DateTime<Utc>) -> u32 {
        if self.ended_at.is_some() {
            return 0;
        }
        (self.deadline() - now).num_seconds().clamp(0, self.rules.duration_secs as i64) as u32
    }

    /// Hints step down every `hint_interval_secs` the current word stays up
    pub fn hint_level(&self, now: DateTime<Utc>) -> usize {
        let interval = self.rules.hint_interval_secs.max(1) as i64;
        let elapsed = (now - self.card_shown_at).num_seconds().max(0);
        ((elapsed / interval) as usize).min(MAX_HINT_LEVEL)
    }

    fn current_card(&self) -> Option<&PracticeCard> {
        self.cards.get(self.card_index % self.cards.len().max(1))
    }

    fn ensure_live(&self, now: DateTime<Utc>) -> Result<PracticeCard, GameError> {
        if self.is_over(now) {
            return Err(GameError::InvalidState(
                "Practice session is over".to_string(),
            ));
        }
        self.current_card()
            .copied()
            .ok_or_else(|| GameError::InvalidState("Practice deck is empty".to_string()))
    }

    pub fn guess(&mut self, guess: &str, now: DateTime<Utc>) -> Result<PracticeAttempt, GameError> {
        let guess = guess.trim();
        if guess.is_empty() {
            return Err(GameError::Validation("Guess is required".to_string()));
        }
        let card = self.ensure_live(now)?;
        let hint_level = self.hint_level(now);
        let correct = guess.to_lowercase() == card.word.to_lowercase();

        let points = if correct {
            points_for(hint_level, self.streak)
        } else {
            0
        };
        self.score += points;
        self.streak = if correct { self.streak + 1 } else { 0 };

        let attempt = PracticeAttempt {
            word: card.word.to_string(),
            guess: Some(guess.to_string()),
            correct,
            hint_level,
            points,
        };
        self.advance(attempt.clone(), now);
        Ok(attempt)
    }

    pub fn skip(&mut self, now: DateTime<Utc>) -> Result<PracticeAttempt, GameError> {
        let card = self.ensure_live(now)?;
        self.streak = 0;

        let attempt = PracticeAttempt {
            word: card.word.to_string(),
            guess: None,
            correct: false,
            hint_level: self.hint_level(now),
            points: 0,
        };
        self.advance(attempt.clone(), now);
        Ok(attempt)
    }

    fn advance(&mut self, attempt: PracticeAttempt, now: DateTime<Utc>) {
        self.attempts.push(attempt);
        self.card_index = (self.card_index + 1) % self.cards.len().max(1);
        self.card_shown_at = now;
    }

    /// Stop the clock early; a no-op once the session is already over
    pub fn finish(&mut self, now: DateTime<Utc>) -> PracticeResults {
        if self.ended_at.is_none() {
            self.ended_at = Some(now.min(self.deadline()));
        }
        self.results()
    }

    pub fn results(&self) -> PracticeResults {
        let words_attempted = self.attempts.len();
        let correct = self.attempts.iter().filter(|a| a.correct).count();
        let accuracy = if words_attempted > 0 {
            ((correct as f64 / words_attempted as f64) * 100.0).round() as u32
        } else {
            0
        };
        let played_until = self.ended_at.unwrap_or_else(|| self.deadline());
        let duration_secs = (played_until - self.started_at)
            .num_seconds()
            .clamp(0, self.rules.duration_secs as i64) as u32;

        PracticeResults {
            score: self.score,
            words_attempted,
            correct,
            accuracy,
            duration_secs,
            qualifies: self.score >= self.rules.min_qualifying_score,
            attempts: self.attempts.clone(),
        }
    }

    pub fn view(&self, now: DateTime<Utc>) -> PracticeView {
        let finished = self.is_over(now);
        let hint_level = self.hint_level(now);
        let hint = if finished {
            None
        } else {
            self.current_card()
                .map(|card| card.hints[hint_level].to_string())
        };

        PracticeView {
            session_id: self.id,
            language: self.language.clone(),
            hint,
            hint_level,
            time_left: self.time_left(now),
            score: self.score,
            streak: self.streak,
            words_attempted: self.attempts.len(),
            finished,
            last_attempt: self.attempts.last().cloned(),
        }
    }

    /// Over long enough that nobody is coming back for the results
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        let ended = self.ended_at.unwrap_or_else(|| self.deadline());
        now - ended > Duration::seconds(STALE_AFTER_SECS)
    }

    #[cfg(test)]
    fn current_word(&self) -> &'static str {
        self.current_card().map(|card| card.word).unwrap_or_default()
    }
}
