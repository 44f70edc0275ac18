//! Curated set: a fixed list assembled up front from per-theme quotas,
//! shuffled once and played through exactly once.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{ModeController, ModeKind, RunStats};
use crate::puzzle::Puzzle;
use crate::rating::RatingChange;
use crate::selector::{SelectionFilters, Selector};
use crate::session::Attempt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeQuota {
    pub theme: String,
    pub count: usize,
}

impl ThemeQuota {
    pub fn new(theme: impl Into<String>, count: usize) -> Self {
        Self {
            theme: theme.into(),
            count,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CuratedSet {
    queue: VecDeque<Arc<Puzzle>>,
    total: usize,
    stats: RunStats,
}

impl CuratedSet {
    /// Sample each quota without repeats across the whole set. A theme with
    /// too few puzzles contributes what it has.
    pub fn assemble<R: Rng + ?Sized>(selector: &Selector<'_>, plan: &[ThemeQuota], rng: &mut R) -> Self {
        let mut chosen: Vec<Arc<Puzzle>> = Vec::new();
        let mut taken: HashSet<String> = HashSet::new();

        for quota in plan {
            let filters = SelectionFilters::default()
                .with_theme(quota.theme.clone())
                .excluding(taken.iter().cloned());

            let picked = selector.select_batch_with(quota.count, &filters, rng);

            if picked.len() < quota.count {
                warn!(
                    theme = %quota.theme,
                    wanted = quota.count,
                    found = picked.len(),
                    "Theme quota not filled"
                );
            }

            for puzzle in picked {
                taken.insert(puzzle.id.clone());
                chosen.push(puzzle);
            }
        }

        chosen.shuffle(rng);
        info!(puzzles = chosen.len(), themes = plan.len(), "Curated set assembled");
        Self::from_puzzles(chosen)
    }

    /// Use a list assembled elsewhere, in the given order.
    pub fn from_puzzles(puzzles: Vec<Arc<Puzzle>>) -> Self {
        Self {
            total: puzzles.len(),
            queue: puzzles.into(),
            stats: RunStats::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Puzzles not yet handed out.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl ModeController for CuratedSet {
    fn kind(&self) -> ModeKind {
        ModeKind::CuratedSet
    }

    fn next_puzzle(&mut self, _selector: &Selector<'_>, _rng: &mut dyn RngCore) -> Option<Arc<Puzzle>> {
        self.queue.pop_front()
    }

    fn record(&mut self, attempt: &Attempt) -> Option<RatingChange> {
        self.stats.record(attempt.solved);
        None
    }

    fn is_over(&self) -> bool {
        self.queue.is_empty() && self.stats.attempted as usize >= self.total
    }

    fn stats(&self) -> &RunStats {
        &self.stats
    }
}
