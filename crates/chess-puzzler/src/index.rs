//! Corpus index: read-only lookups over the puzzle collection by rating
//! bucket, theme, difficulty tier and solution length.
//!
//! References are positions in the corpus vector. Every lookup list is
//! sorted ascending, which the selector relies on for intersection.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::puzzle::{rating_bucket, LengthCategory, Puzzle, Tier};

/// Position of a puzzle inside the index.
pub type PuzzleRef = usize;

#[derive(Debug, Default)]
pub struct CorpusIndex {
    puzzles: Vec<Arc<Puzzle>>,
    by_id: HashMap<String, PuzzleRef>,
    by_rating: BTreeMap<i32, Vec<PuzzleRef>>,
    by_theme: HashMap<String, Vec<PuzzleRef>>,
    by_tier: HashMap<Tier, Vec<PuzzleRef>>,
    by_length: HashMap<LengthCategory, Vec<PuzzleRef>>,
}

impl CorpusIndex {
    /// Single pass over the corpus. Nothing is rejected; a puzzle is only left
    /// out of the mappings it does not cleanly belong to.
    pub fn build(puzzles: Vec<Puzzle>) -> Self {
        let mut index = CorpusIndex {
            puzzles: Vec::with_capacity(puzzles.len()),
            ..Default::default()
        };

        for (r, puzzle) in puzzles.into_iter().enumerate() {
            if index.by_id.contains_key(&puzzle.id) {
                warn!(puzzle_id = %puzzle.id, "Duplicate puzzle id; lookups by id resolve to the first");
            } else {
                index.by_id.insert(puzzle.id.clone(), r);
            }

            index
                .by_rating
                .entry(rating_bucket(puzzle.rating))
                .or_default()
                .push(r);

            for theme in puzzle.normalized_themes() {
                index.by_theme.entry(theme).or_default().push(r);
            }

            if let Some(tier) = puzzle.tier() {
                index.by_tier.entry(tier).or_default().push(r);
            }

            if let Some(category) = puzzle.length_category() {
                index.by_length.entry(category).or_default().push(r);
            }

            index.puzzles.push(Arc::new(puzzle));
        }

        debug!(
            puzzles = index.puzzles.len(),
            themes = index.by_theme.len(),
            buckets = index.by_rating.len(),
            "Corpus index built"
        );
        index
    }

    pub fn len(&self) -> usize {
        self.puzzles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.puzzles.is_empty()
    }

    pub fn all(&self) -> &[Arc<Puzzle>] {
        &self.puzzles
    }

    pub fn puzzle(&self, r: PuzzleRef) -> &Arc<Puzzle> {
        &self.puzzles[r]
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Puzzle>> {
        self.by_id.get(id).map(|&r| &self.puzzles[r])
    }

    /// Puzzles in the 100-point bucket starting at `bucket` (see `rating_bucket`).
    pub fn by_rating_bucket(&self, bucket: i32) -> &[PuzzleRef] {
        self.by_rating.get(&bucket).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Puzzles whose rating lies in `[low, high]`, in ascending reference order.
    pub fn by_rating_range(&self, low: i32, high: i32) -> Vec<PuzzleRef> {
        if low > high {
            return Vec::new();
        }
        let mut refs: Vec<PuzzleRef> = self
            .by_rating
            .range(rating_bucket(low)..=rating_bucket(high))
            .flat_map(|(_, refs)| refs.iter().copied())
            .filter(|&r| (low..=high).contains(&self.puzzles[r].rating))
            .collect();
        refs.sort_unstable();
        refs
    }

    /// Case-insensitive theme lookup.
    pub fn by_theme(&self, theme: &str) -> &[PuzzleRef] {
        self.by_theme
            .get(&theme.trim().to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn by_tier(&self, tier: Tier) -> &[PuzzleRef] {
        self.by_tier.get(&tier).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn by_length(&self, category: LengthCategory) -> &[PuzzleRef] {
        self.by_length.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Theme name and puzzle count, most common first.
    pub fn theme_counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = self
            .by_theme
            .iter()
            .map(|(theme, refs)| (theme.clone(), refs.len()))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<Puzzle> {
        vec![
            Puzzle::new("a", "fen", &["e2e4", "e7e5"], 1210, &["Fork", "middlegame"]),
            Puzzle::new("b", "fen", &["e2e4", "e7e5", "g1f3", "b8c6"], 1290, &["pin"]),
            Puzzle::new("c", "fen", &["e2e4"], 1700, &["fork"]),
            Puzzle::new("d", "fen", &["e2e4", "e7e5", "a", "b", "c", "d", "e", "f"], 350, &["mateIn1"]),
            Puzzle::new("e", "fen", &["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "f8c5"], 2150, &["fork", "pin"]),
        ]
    }

    #[test]
    fn test_every_puzzle_in_its_rating_bucket_and_themes() {
        let index = CorpusIndex::build(corpus());
        for (r, p) in index.all().iter().enumerate() {
            assert!(index.by_rating_bucket(rating_bucket(p.rating)).contains(&r));
            for theme in &p.themes {
                assert!(index.by_theme(theme).contains(&r), "{} missing from {}", p.id, theme);
            }
        }
    }

    #[test]
    fn test_theme_lookup_ignores_case_and_duplicates() {
        let index = CorpusIndex::build(corpus());
        assert_eq!(index.by_theme("FORK"), &[0, 2, 4]);
        assert_eq!(index.by_theme("fork"), index.by_theme("Fork"));
        assert!(index.by_theme("skewer").is_empty());
    }

    #[test]
    fn test_tier_and_length_exclusions() {
        let index = CorpusIndex::build(corpus());
        // 350 is below every tier band
        assert_eq!(index.by_tier(Tier::Intermediate), &[0, 1]);
        assert_eq!(index.by_tier(Tier::Advanced), &[2]);
        assert_eq!(index.by_tier(Tier::Expert), &[4]);
        assert!(index.by_tier(Tier::Beginner).is_empty());

        // "c" has no solver move, so it has no length category
        assert_eq!(index.by_length(LengthCategory::OneMove), &[0]);
        assert_eq!(index.by_length(LengthCategory::Short), &[1]);
        assert_eq!(index.by_length(LengthCategory::Long), &[4]);
        assert_eq!(index.by_length(LengthCategory::VeryLong), &[3]);

        // ...but it is still reachable by rating and theme
        assert_eq!(index.by_rating_bucket(1700), &[2]);
    }

    #[test]
    fn test_rating_range_is_inclusive_and_exact() {
        let index = CorpusIndex::build(corpus());
        assert_eq!(index.by_rating_range(1200, 1300), vec![0, 1]);
        assert_eq!(index.by_rating_range(1211, 1300), vec![1]);
        assert_eq!(index.by_rating_range(1000, 1209), Vec::<PuzzleRef>::new());
        assert_eq!(index.by_rating_range(1300, 1200), Vec::<PuzzleRef>::new());
    }

    #[test]
    fn test_get_by_id_and_theme_counts() {
        let index = CorpusIndex::build(corpus());
        assert_eq!(index.get("e").map(|p| p.rating), Some(2150));
        assert!(index.get("zzz").is_none());

        let counts = index.theme_counts();
        assert_eq!(counts[0], ("fork".to_string(), 3));
        assert_eq!(counts[1], ("pin".to_string(), 2));
    }

    #[test]
    fn test_empty_corpus() {
        let index = CorpusIndex::build(Vec::new());
        assert!(index.is_empty());
        assert!(index.by_rating_bucket(1200).is_empty());
    }
}
