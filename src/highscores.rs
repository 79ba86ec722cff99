//! High score leaderboard system
//!
//! In-memory, tracks the top 10 finished runs of a session.

use serde::{Deserialize, Serialize};

use crate::consts::TICKS_PER_SECOND;
use crate::sim::GameState;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Enemies killed
    pub score: u64,
    /// Level reached
    pub level: u32,
    pub kills: u32,
    /// Playing ticks survived
    pub ticks: u64,
    /// Run seed, so the run can be replayed
    pub seed: u64,
}

impl HighScoreEntry {
    /// Summarize a finished (or abandoned) run
    pub fn from_state(state: &GameState) -> Self {
        Self {
            score: state.score,
            level: state.player.level,
            kills: state.player.kills,
            ticks: state.time_ticks,
            seed: state.seed,
        }
    }

    pub fn survived_secs(&self) -> f64 {
        self.ticks as f64 / TICKS_PER_SECOND as f64
    }
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
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
        // Check if score beats the lowest entry
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

    /// Add a run to the leaderboard (if it qualifies).
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify.
    /// Ties keep the earlier run ahead.
    pub fn add(&mut self, entry: HighScoreEntry) -> Option<usize> {
        if !self.qualifies(entry.score) {
            return None;
        }

        // Find insertion point (sorted descending by score)
        let pos = self.entries.iter().position(|e| entry.score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        // Trim to max size
        self.entries.truncate(MAX_HIGH_SCORES);

        log::info!("New high score at rank {}", rank);
        Some(rank)
    }

    /// Record the run held in `state`
    pub fn record(&mut self, state: &GameState) -> Option<usize> {
        self.add(HighScoreEntry::from_state(state))
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}
