//! Run leaderboard
//!
//! Keeps the top 10 finished runs. Serialized as JSON so hosts can persist it
//! wherever they like.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::settings::ConfigError;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single finished run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Platforms landed on
    pub landings: u32,
    /// Highest multiplier reached
    pub best_multiplier: u32,
    /// Seed of the run, for replay
    pub seed: u64,
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Record a finished run
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify
    pub fn add_score(
        &mut self,
        score: u64,
        landings: u32,
        best_multiplier: u32,
        seed: u64,
    ) -> Option<usize> {
        let rank = self.potential_rank(score)?;
        self.entries.insert(
            rank - 1,
            HighScoreEntry {
                score,
                landings,
                best_multiplier,
                seed,
            },
        );
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut scores: HighScores = serde_json::from_str(json)?;
        // Hand-edited files may be unsorted or oversized
        scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
        scores.entries.truncate(MAX_HIGH_SCORES);
        Ok(scores)
    }

    /// Load from a file, starting fresh if it is missing or unreadable
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(scores) => {
                    log::info!("Loaded {} high scores", scores.entries.len());
                    scores
                }
                Err(e) => {
                    log::warn!("Ignoring corrupt high scores {}: {}", path.display(), e);
                    Self::new()
                }
            },
            Err(_) => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        fs::write(path, self.to_json()?)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_never_qualifies() {
        let mut scores = HighScores::new();
        assert!(!scores.qualifies(0));
        assert_eq!(scores.add_score(0, 0, 1, 7), None);
        assert!(scores.is_empty());
    }

    #[test]
    fn test_sorted_descending() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score(5, 3, 2, 1), Some(1));
        assert_eq!(scores.add_score(12, 4, 8, 2), Some(1));
        assert_eq!(scores.add_score(7, 4, 2, 3), Some(2));
        let order: Vec<u64> = scores.entries.iter().map(|e| e.score).collect();
        assert_eq!(order, vec![12, 7, 5]);
        assert_eq!(scores.top_score(), Some(12));
    }

    #[test]
    fn test_full_board_rejects_low_scores() {
        let mut scores = HighScores::new();
        for i in 1..=MAX_HIGH_SCORES as u64 {
            scores.add_score(i * 10, 1, 1, i);
        }
        assert!(!scores.qualifies(10));
        assert_eq!(scores.add_score(5, 1, 1, 99), None);
        assert_eq!(scores.add_score(15, 1, 1, 99), Some(10));
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.entries.last().map(|e| e.score), Some(15));
    }

    #[test]
    fn test_from_json_sorts_and_trims() {
        let mut entries = Vec::new();
        for i in 0..12u64 {
            entries.push(HighScoreEntry {
                score: i,
                landings: 0,
                best_multiplier: 1,
                seed: i,
            });
        }
        let json = serde_json::to_string(&HighScores { entries }).unwrap();
        let scores = HighScores::from_json(&json).unwrap();
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.top_score(), Some(11));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            HighScores::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
