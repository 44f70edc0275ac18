//! Mode controllers: thin policies over the shared selector and session.
//!
//! A controller decides which filters to select with, when to stop, and
//! what a terminal session outcome costs. It never looks inside a session;
//! the caller opens sessions and reports each `Attempt` back.

pub mod curated;
pub mod ladder;
pub mod rush;
pub mod survival;
pub mod themed;

use std::collections::HashSet;
use std::sync::Arc;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::puzzle::{Puzzle, PuzzleId};
use crate::rating::RatingChange;
use crate::selector::{Selection, SelectionFilters, Selector};
use crate::session::Attempt;

pub use curated::{CuratedSet, ThemeQuota};
pub use ladder::{LadderConfig, RatedLadder};
pub use rush::{Rush, RushConfig};
pub use survival::{Survival, SurvivalConfig};
pub use themed::ThemedDrill;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModeKind {
    RatedLadder,
    Rush,
    Survival,
    ThemedDrill,
    CuratedSet,
}

pub trait ModeController {
    fn kind(&self) -> ModeKind;

    /// Next puzzle to open, or None once the run is over.
    fn next_puzzle(&mut self, selector: &Selector<'_>, rng: &mut dyn RngCore) -> Option<Arc<Puzzle>>;

    /// Report a terminal session outcome. Rated modes return the rating change.
    fn record(&mut self, attempt: &Attempt) -> Option<RatingChange>;

    fn is_over(&self) -> bool;

    fn stats(&self) -> &RunStats;
}

/// Per-run counters shared by every mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    pub attempted: u32,
    pub solved: u32,
    pub failed: u32,
    pub streak: u32,
    pub best_streak: u32,
}

impl RunStats {
    pub fn record(&mut self, solved: bool) {
        self.attempted += 1;
        if solved {
            self.solved += 1;
            self.streak += 1;
            self.best_streak = self.best_streak.max(self.streak);
        } else {
            self.failed += 1;
            self.streak = 0;
        }
    }
}

/// Puzzles already served in this run, threaded into every selection.
#[derive(Debug, Clone, Default)]
pub(crate) struct RunHistory {
    seen: HashSet<PuzzleId>,
    previous: Option<PuzzleId>,
}

impl RunHistory {
    pub(crate) fn filters(&self, base: SelectionFilters) -> SelectionFilters {
        SelectionFilters {
            exclude: base.exclude.union(&self.seen).cloned().collect(),
            previous: self.previous.clone(),
            ..base
        }
    }

    pub(crate) fn serve(&mut self, selection: Selection) -> Arc<Puzzle> {
        self.seen.insert(selection.puzzle.id.clone());
        self.previous = Some(selection.puzzle.id.clone());
        selection.puzzle
    }

    pub(crate) fn draw(
        &mut self,
        selector: &Selector<'_>,
        base: SelectionFilters,
        rng: &mut dyn RngCore,
    ) -> Option<Selection> {
        selector.select_with(&self.filters(base), rng).ok()
    }

    /// Allow already served puzzles again; the previous one is still avoided.
    pub(crate) fn forget(&mut self) {
        self.seen.clear();
    }

    pub(crate) fn served(&self) -> usize {
        self.seen.len()
    }
}

/// Target rating that climbs with every solve (rush and survival).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingRamp {
    pub start_rating: i32,
    pub step: i32,
    pub range: i32,
}

impl Default for RatingRamp {
    fn default() -> Self {
        Self {
            start_rating: 800,
            step: 50,
            range: crate::selector::DEFAULT_RATING_RANGE,
        }
    }
}

impl RatingRamp {
    pub fn target(&self, solved: u32) -> i32 {
        self.start_rating + self.step * solved as i32
    }

    pub fn filters(&self, solved: u32) -> SelectionFilters {
        SelectionFilters::around(self.target(solved)).with_range(self.range)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::index::CorpusIndex;

    /// `per_bucket` puzzles in every 100-point bucket from 600 to 2500,
    /// themed "fork" on even buckets and "pin" on odd ones.
    pub fn ladder_corpus(per_bucket: usize) -> CorpusIndex {
        let mut puzzles = Vec::new();
        for bucket in 6..=25 {
            for i in 0..per_bucket {
                let theme = if bucket % 2 == 0 { "fork" } else { "pin" };
                puzzles.push(Puzzle::new(
                    format!("p{bucket}-{i}"),
                    "fen",
                    &["e2e4", "e7e5"],
                    bucket * 100 + (i as i32 * 7) % 100,
                    &[theme],
                ));
            }
        }
        CorpusIndex::build(puzzles)
    }

    pub fn attempt(puzzle: &Puzzle, solved: bool) -> Attempt {
        Attempt {
            puzzle_id: puzzle.id.clone(),
            puzzle_rating: puzzle.rating,
            solved,
        }
    }
}
