//! Rated ladder: every attempt moves the solver's rating, and the next
//! puzzle is centered on the new rating.

use std::sync::Arc;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ModeController, ModeKind, RunHistory, RunStats};
use crate::puzzle::Puzzle;
use crate::rating::{RatingChange, RatingPolicy, RatingRecord};
use crate::selector::{SelectionFilters, Selector, DEFAULT_RATING_RANGE};
use crate::session::Attempt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LadderConfig {
    pub rating_range: i32,
    pub policy: RatingPolicy,
}

impl Default for LadderConfig {
    fn default() -> Self {
        Self {
            rating_range: DEFAULT_RATING_RANGE,
            policy: RatingPolicy::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RatedLadder {
    config: LadderConfig,
    rating: RatingRecord,
    history: RunHistory,
    stats: RunStats,
}

impl RatedLadder {
    pub fn new(rating: RatingRecord, config: LadderConfig) -> Self {
        Self {
            config,
            rating,
            history: RunHistory::default(),
            stats: RunStats::default(),
        }
    }

    pub fn rating(&self) -> RatingRecord {
        self.rating
    }
}

impl ModeController for RatedLadder {
    fn kind(&self) -> ModeKind {
        ModeKind::RatedLadder
    }

    fn next_puzzle(&mut self, selector: &Selector<'_>, rng: &mut dyn RngCore) -> Option<Arc<Puzzle>> {
        let base = SelectionFilters::around(self.rating.rating).with_range(self.config.rating_range);
        let selection = self.history.draw(selector, base, rng)?;
        Some(self.history.serve(selection))
    }

    fn record(&mut self, attempt: &Attempt) -> Option<RatingChange> {
        self.stats.record(attempt.solved);
        let change = self
            .rating
            .record(&self.config.policy, attempt.puzzle_rating, attempt.solved);
        debug!(
            puzzle_id = %attempt.puzzle_id,
            solved = attempt.solved,
            new_rating = change.new_rating,
            delta = change.delta,
            "Ladder rating updated"
        );
        Some(change)
    }

    /// The ladder runs until the caller stops it.
    fn is_over(&self) -> bool {
        false
    }

    fn stats(&self) -> &RunStats {
        &self.stats
    }
}
