use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use dashmap::DashMap;
use rand::Rng;
use serde::Serialize;
use tokio::fs;

use crate::error::GameError;

/// Supplier of words for a game, keyed by language
pub trait WordSource {
    /// Next word from the language's shuffled cursor
    fn next_word(&self, language: &str) -> Result<String, GameError>;

    /// Up to `count` words without moving the cursor
    fn batch(&self, language: &str, count: usize) -> Result<Vec<String>, GameError>;
}

/// In-place Fisher–Yates shuffle
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordDraw {
    pub word: String,
    pub remaining: usize,
    pub total: usize,
    pub language: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolStats {
    pub language: String,
    pub total_words: usize,
    pub remaining_in_shuffle: usize,
    pub current_index: usize,
    pub shuffle_complete: bool,
}

/// One language's word list with a cursor through a shuffled copy of it
#[derive(Debug, Clone)]
pub struct WordPool {
    words: Vec<String>,
    order: Vec<String>,
    cursor: usize,
}

impl WordPool {
    pub fn new<R: Rng + ?Sized>(words: Vec<String>, rng: &mut R) -> Self {
        let mut order = words.clone();
        shuffle(&mut order, rng);
        Self {
            words,
            order,
            cursor: 0,
        }
    }

    /// Take the next word, reshuffling the whole list once the cursor runs out
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<String> {
        if self.cursor >= self.order.len() {
            self.order = self.words.clone();
            shuffle(&mut self.order, rng);
            self.cursor = 0;
        }

        let word = self.order.get(self.cursor).cloned()?;
        self.cursor += 1;
        Some(word)
    }

    /// A fresh shuffle truncated to `count`; the whole pool if it is not larger
    pub fn sample<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<String> {
        if count >= self.words.len() {
            return self.words.clone();
        }
        let mut sample = self.words.clone();
        shuffle(&mut sample, rng);
        sample.truncate(count);
        sample
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn remaining(&self) -> usize {
        self.order.len().saturating_sub(self.cursor)
    }

    pub fn stats(&self, language: &str) -> PoolStats {
        PoolStats {
            language: language.to_string(),
            total_words: self.words.len(),
            remaining_in_shuffle: self.remaining(),
            current_index: self.cursor,
            shuffle_complete: self.cursor >= self.order.len(),
        }
    }
}

/// Per-language word pools shared by every game on the server
pub struct WordService {
    pools: DashMap<String, WordPool>,
}

impl WordService {
    /// Load word lists from a JSON file shaped like `{ "en": ["word", ...], ... }`
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let service = Self::empty();
        service.reload(path).await?;
        Ok(service)
    }

    /// Build pools from in-memory lists
    pub fn from_lists(lists: HashMap<String, Vec<String>>) -> Result<Self> {
        let service = Self::empty();
        service.replace_pools(Self::build_pools(lists)?);
        Ok(service)
    }

    /// Create a service with no languages (for startup without a word file)
    pub fn empty() -> Self {
        Self {
            pools: DashMap::new(),
        }
    }

    /// Re-read the word file, swapping in the new pools only if all of them parse
    pub async fn reload<P: AsRef<Path>>(&self, path: P) -> Result<Vec<PoolStats>> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read word file {}", path.display()))?;
        let lists = parse_word_lists(&content)?;
        self.replace_pools(Self::build_pools(lists)?);

        Ok(self
            .languages()
            .iter()
            .filter_map(|language| self.stats(language).ok())
            .collect())
    }

    fn build_pools(lists: HashMap<String, Vec<String>>) -> Result<Vec<(String, WordPool)>> {
        if lists.is_empty() {
            anyhow::bail!("Word file does not contain any languages");
        }

        let mut rng = rand::rng();
        let mut pools = Vec::with_capacity(lists.len());
        for (language, words) in lists {
            let words: Vec<String> = words
                .into_iter()
                .map(|word| word.trim().to_string())
                .filter(|word| !word.is_empty())
                .collect();

            if words.is_empty() {
                anyhow::bail!("No words found for language: {}", language);
            }

            tracing::info!("Loaded {} words for language \"{}\"", words.len(), language);
            pools.push((language, WordPool::new(words, &mut rng)));
        }
        Ok(pools)
    }

    fn replace_pools(&self, pools: Vec<(String, WordPool)>) {
        let keep: HashSet<String> = pools.iter().map(|(language, _)| language.clone()).collect();
        for (language, pool) in pools {
            self.pools.insert(language, pool);
        }
        self.pools.retain(|language, _| keep.contains(language));
    }

    pub fn languages(&self) -> Vec<String> {
        let mut languages: Vec<String> = self.pools.iter().map(|p| p.key().clone()).collect();
        languages.sort();
        languages
    }

    pub fn supports(&self, language: &str) -> bool {
        self.pools.contains_key(language)
    }

    pub fn word_count(&self, language: &str) -> Result<usize, GameError> {
        self.pools
            .get(language)
            .map(|pool| pool.len())
            .ok_or_else(|| unsupported(language))
    }

    pub fn draw(&self, language: &str) -> Result<WordDraw, GameError> {
        let mut pool = self
            .pools
            .get_mut(language)
            .ok_or_else(|| unsupported(language))?;

        let mut rng = rand::rng();
        let word = pool
            .draw(&mut rng)
            .ok_or_else(|| GameError::InvalidState("Word pool is empty".to_string()))?;

        Ok(WordDraw {
            word,
            remaining: pool.remaining(),
            total: pool.len(),
            language: language.to_string(),
        })
    }

    pub fn stats(&self, language: &str) -> Result<PoolStats, GameError> {
        self.pools
            .get(language)
            .map(|pool| pool.stats(language))
            .ok_or_else(|| unsupported(language))
    }
}

impl WordSource for WordService {
    fn next_word(&self, language: &str) -> Result<String, GameError> {
        self.draw(language).map(|draw| draw.word)
    }

    fn batch(&self, language: &str, count: usize) -> Result<Vec<String>, GameError> {
        let pool = self.pools.get(language).ok_or_else(|| unsupported(language))?;
        let mut rng = rand::rng();
        Ok(pool.sample(count, &mut rng))
    }
}

fn unsupported(language: &str) -> GameError {
    GameError::Validation(format!("Unsupported language: {}", language))
}

/// Non-string entries are ignored
fn parse_word_lists(content: &str) -> Result<HashMap<String, Vec<String>>> {
    let parsed: HashMap<String, Vec<serde_json::Value>> =
        serde_json::from_str(content).context("Word file is not a valid JSON object")?;

    Ok(parsed
        .into_iter()
        .map(|(language, entries)| {
            let words = entries
                .into_iter()
                .filter_map(|entry| entry.as_str().map(str::to_string))
                .collect();
            (language, words)
        })
        .collect())
}
