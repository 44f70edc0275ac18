//! Puzzle rush: solve as many as possible within a time budget. Wrong
//! answers cost a fixed penalty. The caller owns the clock and reports
//! elapsed time through `elapse`.

use std::sync::Arc;
use std::time::Duration;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ModeController, ModeKind, RatingRamp, RunHistory, RunStats};
use crate::puzzle::Puzzle;
use crate::rating::RatingChange;
use crate::selector::Selector;
use crate::session::Attempt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RushConfig {
    pub budget: Duration,
    pub penalty: Duration,
    pub ramp: RatingRamp,
}

impl Default for RushConfig {
    fn default() -> Self {
        Self {
            budget: Duration::from_secs(180),
            penalty: Duration::from_secs(5),
            ramp: RatingRamp::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rush {
    config: RushConfig,
    remaining: Duration,
    history: RunHistory,
    stats: RunStats,
}

impl Rush {
    pub fn new(config: RushConfig) -> Self {
        Self {
            remaining: config.budget,
            config,
            history: RunHistory::default(),
            stats: RunStats::default(),
        }
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Subtract wall-clock time measured by the caller.
    pub fn elapse(&mut self, elapsed: Duration) {
        self.remaining = self.remaining.saturating_sub(elapsed);
    }

    pub fn target_rating(&self) -> i32 {
        self.config.ramp.target(self.stats.solved)
    }
}

impl ModeController for Rush {
    fn kind(&self) -> ModeKind {
        ModeKind::Rush
    }

    fn next_puzzle(&mut self, selector: &Selector<'_>, rng: &mut dyn RngCore) -> Option<Arc<Puzzle>> {
        if self.is_over() {
            return None;
        }
        let base = self.config.ramp.filters(self.stats.solved);
        let selection = self.history.draw(selector, base, rng)?;
        Some(self.history.serve(selection))
    }

    fn record(&mut self, attempt: &Attempt) -> Option<RatingChange> {
        self.stats.record(attempt.solved);
        if !attempt.solved {
            self.remaining = self.remaining.saturating_sub(self.config.penalty);
            debug!(remaining_ms = self.remaining.as_millis() as u64, "Rush penalty applied");
        }
        None
    }

    fn is_over(&self) -> bool {
        self.remaining.is_zero()
    }

    fn stats(&self) -> &RunStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::test_support::{attempt, ladder_corpus};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_penalty_and_clock() {
        let index = ladder_corpus(3);
        let selector = Selector::new(&index);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut rush = Rush::new(RushConfig {
            budget: Duration::from_secs(12),
            ..Default::default()
        });

        let puzzle = rush.next_puzzle(&selector, &mut rng).unwrap();
        assert_eq!(rush.record(&attempt(&puzzle, false)), None);
        assert_eq!(rush.remaining(), Duration::from_secs(7));

        rush.elapse(Duration::from_secs(3));
        assert_eq!(rush.remaining(), Duration::from_secs(4));
        assert!(!rush.is_over());

        let puzzle = rush.next_puzzle(&selector, &mut rng).unwrap();
        rush.record(&attempt(&puzzle, false));
        assert!(rush.is_over());
        assert_eq!(rush.remaining(), Duration::ZERO);
        assert!(rush.next_puzzle(&selector, &mut rng).is_none());
        assert_eq!(rush.stats().failed, 2);
    }

    #[test]
    fn test_solves_ramp_difficulty() {
        let index = ladder_corpus(3);
        let selector = Selector::new(&index);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut rush = Rush::new(RushConfig::default());

        assert_eq!(rush.target_rating(), 800);
        for _ in 0..6 {
            let puzzle = rush.next_puzzle(&selector, &mut rng).unwrap();
            assert!((puzzle.rating - rush.target_rating()).abs() <= 200);
            rush.record(&attempt(&puzzle, true));
        }
        assert_eq!(rush.target_rating(), 1100);
        assert_eq!(rush.remaining(), Duration::from_secs(180));
    }

    #[test]
    fn test_clock_alone_ends_the_run() {
        let mut rush = Rush::new(RushConfig::default());
        rush.elapse(Duration::from_secs(179));
        assert!(!rush.is_over());
        rush.elapse(Duration::from_secs(5));
        assert!(rush.is_over());
    }
}
