//! Themed drill: one theme (optionally one tier) for the whole run.

use std::sync::Arc;

use rand::RngCore;
use tracing::debug;

use super::{ModeController, ModeKind, RunHistory, RunStats};
use crate::puzzle::{Puzzle, Tier};
use crate::rating::RatingChange;
use crate::selector::{SelectionFilters, Selector};
use crate::session::Attempt;

#[derive(Debug, Clone)]
pub struct ThemedDrill {
    theme: String,
    tier: Option<Tier>,
    limit: Option<u32>,
    history: RunHistory,
    stats: RunStats,
}

impl ThemedDrill {
    pub fn new(theme: impl Into<String>, tier: Option<Tier>) -> Self {
        Self {
            theme: theme.into(),
            tier,
            limit: None,
            history: RunHistory::default(),
            stats: RunStats::default(),
        }
    }

    /// Stop after this many attempts.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    fn filters(&self) -> SelectionFilters {
        let filters = SelectionFilters::default().with_theme(self.theme.clone());
        match self.tier {
            Some(tier) => filters.with_tier(tier),
            None => filters,
        }
    }
}

impl ModeController for ThemedDrill {
    fn kind(&self) -> ModeKind {
        ModeKind::ThemedDrill
    }

    fn next_puzzle(&mut self, selector: &Selector<'_>, rng: &mut dyn RngCore) -> Option<Arc<Puzzle>> {
        if self.is_over() {
            return None;
        }

        let mut selection = self.history.draw(selector, self.filters(), rng)?;
        if !selection.is_exact() {
            if self.history.served() == 0 {
                debug!(theme = %self.theme, tier = ?self.tier, "No puzzle matches the drill");
                return None;
            }
            // Every matching puzzle was served once; cycle through them again
            self.history.forget();
            selection = self.history.draw(selector, self.filters(), rng)?;
            if !selection.is_exact() {
                return None;
            }
        }
        Some(self.history.serve(selection))
    }

    fn record(&mut self, attempt: &Attempt) -> Option<RatingChange> {
        self.stats.record(attempt.solved);
        None
    }

    fn is_over(&self) -> bool {
        self.limit.is_some_and(|limit| self.stats.attempted >= limit)
    }

    fn stats(&self) -> &RunStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::CorpusIndex;
    use crate::modes::test_support::{attempt, ladder_corpus};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_drill_stays_on_theme_and_tier() {
        let index = ladder_corpus(2);
        let selector = Selector::new(&index);
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut drill = ThemedDrill::new("Pin", Some(Tier::Advanced)).with_limit(4);

        while let Some(puzzle) = drill.next_puzzle(&selector, &mut rng) {
            assert!(puzzle.has_theme("pin"));
            assert_eq!(puzzle.tier(), Some(Tier::Advanced));
            drill.record(&attempt(&puzzle, true));
        }
        assert_eq!(drill.stats().attempted, 4);
        assert!(drill.is_over());
    }

    #[test]
    fn test_drill_cycles_when_theme_is_exhausted() {
        let index = CorpusIndex::build(vec![
            Puzzle::new("f1", "fen", &["e2e4", "e7e5"], 1000, &["fork"]),
            Puzzle::new("f2", "fen", &["e2e4", "e7e5"], 1100, &["fork"]),
            Puzzle::new("p1", "fen", &["e2e4", "e7e5"], 1000, &["pin"]),
        ]);
        let selector = Selector::new(&index);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut drill = ThemedDrill::new("fork", None);

        let mut previous = None;
        for _ in 0..8 {
            let puzzle = drill.next_puzzle(&selector, &mut rng).unwrap();
            assert!(puzzle.id.starts_with('f'), "served {}", puzzle.id);
            assert_ne!(Some(puzzle.id.clone()), previous);
            previous = Some(puzzle.id.clone());
            drill.record(&attempt(&puzzle, false));
        }
        assert!(!drill.is_over());
    }

    #[test]
    fn test_drill_with_no_matching_puzzle_serves_nothing() {
        let index = CorpusIndex::build(vec![
            Puzzle::new("f1", "fen", &["e2e4", "e7e5"], 800, &["fork"]),
            Puzzle::new("p1", "fen", &["e2e4", "e7e5"], 1700, &["pin"]),
        ]);
        let selector = Selector::new(&index);
        let mut rng = ChaCha8Rng::seed_from_u64(10);

        let mut drill = ThemedDrill::new("fork", Some(Tier::Expert));
        for _ in 0..3 {
            assert!(drill.next_puzzle(&selector, &mut rng).is_none());
        }

        let mut drill = ThemedDrill::new("skewer", None);
        assert!(drill.next_puzzle(&selector, &mut rng).is_none());
        assert_eq!(drill.stats().attempted, 0);
    }

    #[test]
    fn test_single_match_repeats_instead_of_relaxing() {
        let index = CorpusIndex::build(vec![
            Puzzle::new("f1", "fen", &["e2e4", "e7e5"], 800, &["fork"]),
            Puzzle::new("p1", "fen", &["e2e4", "e7e5"], 900, &["pin"]),
        ]);
        let selector = Selector::new(&index);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut drill = ThemedDrill::new("fork", None);

        for _ in 0..4 {
            let puzzle = drill.next_puzzle(&selector, &mut rng).unwrap();
            assert_eq!(puzzle.id, "f1");
            drill.record(&attempt(&puzzle, true));
        }
    }
}
