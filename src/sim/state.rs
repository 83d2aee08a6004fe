//! Run state: score, high score and the run-level flags

use serde::{Deserialize, Serialize};

use crate::consts::HIGH_SCORE_KEY;
use crate::persistence::KeyValueStore;

/// Coarse phase derived from the flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Run ended
    GameOver,
}

/// Result of adding points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreUpdate {
    pub score: u64,
    /// Set when this addition raised the high score
    pub new_high_score: Option<u64>,
}

/// Score and flags for the current run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    score: u64,
    high_score: u64,
    game_over: bool,
    paused: bool,
    has_dropped_any: bool,
}

impl RunState {
    pub fn new(high_score: u64) -> Self {
        Self {
            score: 0,
            high_score,
            game_over: false,
            paused: false,
            has_dropped_any: false,
        }
    }

    /// Fresh run with the persisted high score
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let high_score = store.get_int(HIGH_SCORE_KEY, 0).max(0) as u64;
        Self::new(high_score)
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn has_dropped_any(&self) -> bool {
        self.has_dropped_any
    }

    pub fn phase(&self) -> RunPhase {
        if self.game_over {
            RunPhase::GameOver
        } else if self.paused {
            RunPhase::Paused
        } else {
            RunPhase::Playing
        }
    }

    /// Add points, raising the high score when it is passed
    pub fn add_score(&mut self, points: u64) -> ScoreUpdate {
        self.score = self.score.saturating_add(points);
        let new_high_score = if self.score > self.high_score {
            self.high_score = self.score;
            Some(self.high_score)
        } else {
            None
        };
        ScoreUpdate {
            score: self.score,
            new_high_score,
        }
    }

    /// End the run; false if it had already ended
    pub fn mark_game_over(&mut self) -> bool {
        if self.game_over {
            return false;
        }
        self.game_over = true;
        self.paused = false;
        true
    }

    /// Set the pause flag; false (and no change) once the run is over
    pub fn set_paused(&mut self, paused: bool) -> bool {
        if self.game_over {
            return false;
        }
        self.paused = paused;
        true
    }

    pub fn mark_dropped(&mut self) {
        self.has_dropped_any = true;
    }

    /// Start over, keeping the high score
    pub fn reset_run(&mut self) {
        self.score = 0;
        self.game_over = false;
        self.paused = false;
        self.has_dropped_any = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_add_zero_never_changes_high_score() {
        let mut run = RunState::new(100);
        for _ in 0..5 {
            let update = run.add_score(0);
            assert_eq!(update.new_high_score, None);
        }
        assert_eq!(run.high_score(), 100);
    }

    #[test]
    fn test_high_score_tracks_crossing() {
        let mut run = RunState::new(50);
        assert_eq!(run.add_score(40).new_high_score, None);
        assert_eq!(run.add_score(20).new_high_score, Some(60));
        assert_eq!(run.add_score(10).new_high_score, Some(70));
        assert_eq!(run.high_score(), 70);
    }

    #[test]
    fn test_equal_score_is_not_a_new_high() {
        let mut run = RunState::new(50);
        assert_eq!(run.add_score(50).new_high_score, None);
    }

    #[test]
    fn test_game_over_is_one_way() {
        let mut run = RunState::new(0);
        run.set_paused(true);
        assert!(run.mark_game_over());
        assert!(!run.is_paused());
        assert!(!run.mark_game_over());
        assert!(!run.set_paused(true));
        assert_eq!(run.phase(), RunPhase::GameOver);
    }

    #[test]
    fn test_reset_keeps_high_score() {
        let mut run = RunState::new(0);
        run.add_score(90);
        run.mark_dropped();
        run.mark_game_over();
        run.reset_run();
        assert_eq!(run.score(), 0);
        assert_eq!(run.high_score(), 90);
        assert!(!run.has_dropped_any());
        assert_eq!(run.phase(), RunPhase::Playing);
    }

    #[test]
    fn test_load_reads_persisted_high_score() {
        let mut store = MemoryStore::new();
        store.set_int(HIGH_SCORE_KEY, 321);
        assert_eq!(RunState::load(&store).high_score(), 321);

        store.set_int(HIGH_SCORE_KEY, -5);
        assert_eq!(RunState::load(&store).high_score(), 0);
    }
}
