//! Score and coin totals

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::highscores::{HighScoreEntry, HighScores, now_millis};
use crate::lock;

/// Point-in-time copy of the run totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub score: u64,
    pub coins: u64,
    /// Best score on the leaderboard (or this run, if higher)
    pub high_score: u64,
}

#[derive(Debug, Default)]
struct ScoreState {
    score: u64,
    coins: u64,
    board: HighScores,
}

#[derive(Debug, Default)]
pub struct ScoreManager {
    state: Mutex<ScoreState>,
}

impl ScoreManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add points; returns the new score
    pub fn add_points(&self, points: u64) -> u64 {
        let mut state = lock(&self.state);
        state.score = state.score.saturating_add(points);
        state.score
    }

    /// Add coins; returns the new coin total
    pub fn add_coins(&self, coins: u64) -> u64 {
        let mut state = lock(&self.state);
        state.coins = state.coins.saturating_add(coins);
        state.coins
    }

    pub fn score(&self) -> u64 {
        lock(&self.state).score
    }

    pub fn coins(&self) -> u64 {
        lock(&self.state).coins
    }

    pub fn snapshot(&self) -> ScoreSnapshot {
        let state = lock(&self.state);
        ScoreSnapshot {
            score: state.score,
            coins: state.coins,
            high_score: state.board.top_score().unwrap_or(0).max(state.score),
        }
    }

    /// Install the persisted leaderboard (session start)
    pub fn set_high_scores(&self, board: HighScores) {
        lock(&self.state).board = board;
    }

    pub fn high_scores(&self) -> HighScores {
        lock(&self.state).board.clone()
    }

    /// Record the finished run on the leaderboard; returns its rank if it placed
    pub fn commit_run(&self, level: u32) -> Option<usize> {
        let mut state = lock(&self.state);
        let entry = HighScoreEntry {
            score: state.score,
            level,
            coins: state.coins,
            timestamp: now_millis(),
        };
        state.board.add_score(entry)
    }

    /// Clear run totals; the leaderboard is kept
    pub fn reset(&self) {
        let mut state = lock(&self.state);
        state.score = 0;
        state.coins = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_and_reset() {
        let score = ScoreManager::new();
        assert_eq!(score.add_points(100), 100);
        assert_eq!(score.add_coins(1), 1);
        assert_eq!(score.add_coins(1), 2);
        score.reset();
        assert_eq!(score.snapshot(), ScoreSnapshot::default());
    }

    #[test]
    fn test_commit_run_places_on_board() {
        let score = ScoreManager::new();
        score.add_points(500);
        assert_eq!(score.commit_run(3), Some(1));
        assert_eq!(score.high_scores().top_score(), Some(500));

        score.reset();
        assert_eq!(score.snapshot().high_score, 500);
        // Empty run never places
        assert_eq!(score.commit_run(1), None);
    }
}
