//! Survival: keep solving until the lives run out.

use std::sync::Arc;

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
pub struct SurvivalConfig {
    pub lives: u32,
    pub ramp: RatingRamp,
}

impl Default for SurvivalConfig {
    fn default() -> Self {
        Self {
            lives: 3,
            ramp: RatingRamp::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Survival {
    config: SurvivalConfig,
    lives_left: u32,
    history: RunHistory,
    stats: RunStats,
}

impl Survival {
    pub fn new(config: SurvivalConfig) -> Self {
        Self {
            lives_left: config.lives,
            config,
            history: RunHistory::default(),
            stats: RunStats::default(),
        }
    }

    pub fn lives_left(&self) -> u32 {
        self.lives_left
    }

    pub fn target_rating(&self) -> i32 {
        self.config.ramp.target(self.stats.solved)
    }
}

impl ModeController for Survival {
    fn kind(&self) -> ModeKind {
        ModeKind::Survival
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
            self.lives_left = self.lives_left.saturating_sub(1);
            debug!(lives_left = self.lives_left, "Survival life lost");
        }
        None
    }

    fn is_over(&self) -> bool {
        self.lives_left == 0
    }

    fn stats(&self) -> &RunStats {
        &self.stats
    }
}
