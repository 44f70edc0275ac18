//! Puzzle selection over the corpus index.
//!
//! Each filter dimension yields a sorted candidate list; the lists are
//! intersected smallest-first. When nothing survives, selection relaxes
//! instead of failing. The only hard failure is an empty corpus.

use std::collections::HashSet;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SelectError;
use crate::index::{CorpusIndex, PuzzleRef};
use crate::puzzle::{LengthCategory, Puzzle, PuzzleId, Tier};

/// Default half-width of the rating window.
pub const DEFAULT_RATING_RANGE: i32 = 200;

/// How many nearest-rated puzzles the fallback picks from.
pub const NEAREST_FALLBACK_POOL: usize = 5;

/// How a theme set constrains candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMatch {
    /// Puzzle carries at least one of the themes
    #[default]
    Any,
    /// Puzzle carries every theme
    All,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionFilters {
    pub rating_center: Option<i32>,
    pub rating_range: i32,
    pub themes: Vec<String>,
    pub theme_match: ThemeMatch,
    pub difficulty_tier: Option<Tier>,
    pub length_category: Option<LengthCategory>,
    pub exclude: HashSet<PuzzleId>,
    /// Last puzzle served to this caller; not repeated when an alternative exists.
    pub previous: Option<PuzzleId>,
}

impl Default for SelectionFilters {
    fn default() -> Self {
        Self {
            rating_center: None,
            rating_range: DEFAULT_RATING_RANGE,
            themes: Vec::new(),
            theme_match: ThemeMatch::Any,
            difficulty_tier: None,
            length_category: None,
            exclude: HashSet::new(),
            previous: None,
        }
    }
}

impl SelectionFilters {
    pub fn around(rating: i32) -> Self {
        Self {
            rating_center: Some(rating),
            ..Default::default()
        }
    }

    pub fn with_range(mut self, range: i32) -> Self {
        self.rating_range = range;
        self
    }

    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.themes.push(theme.into());
        self
    }

    pub fn with_tier(mut self, tier: Tier) -> Self {
        self.difficulty_tier = Some(tier);
        self
    }

    pub fn with_length(mut self, category: LengthCategory) -> Self {
        self.length_category = Some(category);
        self
    }

    pub fn excluding<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn after(mut self, previous: impl Into<String>) -> Self {
        self.previous = Some(previous.into());
        self
    }

    /// Does a puzzle satisfy every specified predicate?
    pub fn matches(&self, puzzle: &Puzzle) -> bool {
        if let Some(center) = self.rating_center {
            let (low, high) = rating_window(center, self.rating_range);
            if puzzle.rating < low || puzzle.rating > high {
                return false;
            }
        }

        let themes: Vec<&String> = self.themes.iter().filter(|t| !t.trim().is_empty()).collect();
        if !themes.is_empty() {
            let ok = match self.theme_match {
                ThemeMatch::Any => themes.iter().any(|t| puzzle.has_theme(t)),
                ThemeMatch::All => themes.iter().all(|t| puzzle.has_theme(t)),
            };
            if !ok {
                return false;
            }
        }

        if self.difficulty_tier.is_some() && puzzle.tier() != self.difficulty_tier {
            return false;
        }
        if self.length_category.is_some() && puzzle.length_category() != self.length_category {
            return false;
        }

        !self.exclude.contains(&puzzle.id)
    }
}

/// Which stage of selection produced the puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchKind {
    /// Satisfies every filter
    Exact,
    /// Rating window was empty; one of the closest-rated puzzles instead
    NearestRating,
    /// Filters were dropped to find anything at all
    Relaxed,
}

#[derive(Debug, Clone)]
pub struct Selection {
    pub puzzle: Arc<Puzzle>,
    pub match_kind: MatchKind,
}

impl Selection {
    pub fn is_exact(&self) -> bool {
        self.match_kind == MatchKind::Exact
    }
}

/// Stateless selector borrowing a built index.
#[derive(Debug, Clone, Copy)]
pub struct Selector<'a> {
    index: &'a CorpusIndex,
}

impl<'a> Selector<'a> {
    pub fn new(index: &'a CorpusIndex) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &'a CorpusIndex {
        self.index
    }

    pub fn select(&self, filters: &SelectionFilters) -> Result<Selection, SelectError> {
        self.select_with(filters, &mut rand::thread_rng())
    }

    pub fn select_batch(&self, n: usize, filters: &SelectionFilters) -> Vec<Arc<Puzzle>> {
        self.select_batch_with(n, filters, &mut rand::thread_rng())
    }

    pub fn select_with<R: Rng + ?Sized>(
        &self,
        filters: &SelectionFilters,
        rng: &mut R,
    ) -> Result<Selection, SelectError> {
        if self.index.is_empty() {
            return Err(SelectError::NotFound);
        }

        let strict = self.without_excluded(self.candidates(filters, true), filters);
        if let Some(r) = self.pick_uniform(&strict, filters, rng) {
            return Ok(self.selection(r, MatchKind::Exact));
        }

        // Relax: drop the rating window, then every filter, then the exclusions.
        let mut pool = self.without_excluded(self.candidates(filters, false), filters);
        if pool.is_empty() {
            pool = self.without_excluded((0..self.index.len()).collect(), filters);
        }
        if pool.is_empty() {
            pool = (0..self.index.len()).collect();
        }

        let selection = match filters.rating_center {
            Some(center) => {
                let r = self.pick_nearest(pool, center, filters, rng);
                self.selection(r, MatchKind::NearestRating)
            }
            None => {
                let r = self
                    .pick_uniform(&pool, filters, rng)
                    .ok_or(SelectError::NotFound)?;
                self.selection(r, MatchKind::Relaxed)
            }
        };

        debug!(
            puzzle_id = %selection.puzzle.id,
            match_kind = ?selection.match_kind,
            "No exact match; fell back"
        );
        Ok(selection)
    }

    /// Up to `n` distinct puzzles, every one an exact match. Returns fewer
    /// once the exact matches run out.
    pub fn select_batch_with<R: Rng + ?Sized>(
        &self,
        n: usize,
        filters: &SelectionFilters,
        rng: &mut R,
    ) -> Vec<Arc<Puzzle>> {
        let mut filters = filters.clone();
        let mut chosen: Vec<Arc<Puzzle>> = Vec::with_capacity(n);

        while chosen.len() < n {
            let selection = match self.select_with(&filters, rng) {
                Ok(s) if s.is_exact() => s,
                _ => break,
            };
            let id = &selection.puzzle.id;
            if filters.exclude.contains(id) || chosen.iter().any(|p| &p.id == id) {
                break;
            }
            filters.exclude.insert(id.clone());
            filters.previous = Some(id.clone());
            chosen.push(selection.puzzle);
        }

        chosen
    }

    fn selection(&self, r: PuzzleRef, match_kind: MatchKind) -> Selection {
        Selection {
            puzzle: Arc::clone(self.index.puzzle(r)),
            match_kind,
        }
    }

    /// Intersect the candidate lists of every specified dimension.
    /// With no dimension specified the whole corpus is the candidate set.
    fn candidates(&self, filters: &SelectionFilters, with_rating: bool) -> Vec<PuzzleRef> {
        let mut dimensions: Vec<Vec<PuzzleRef>> = Vec::new();

        if with_rating {
            if let Some(center) = filters.rating_center {
                let (low, high) = rating_window(center, filters.rating_range);
                dimensions.push(self.index.by_rating_range(low, high));
            }
        }

        let themes: Vec<&str> = filters
            .themes
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();
        if !themes.is_empty() {
            match filters.theme_match {
                ThemeMatch::Any => {
                    let mut union: Vec<PuzzleRef> = themes
                        .iter()
                        .flat_map(|t| self.index.by_theme(t).iter().copied())
                        .collect();
                    union.sort_unstable();
                    union.dedup();
                    dimensions.push(union);
                }
                ThemeMatch::All => {
                    for theme in themes {
                        dimensions.push(self.index.by_theme(theme).to_vec());
                    }
                }
            }
        }

        if let Some(tier) = filters.difficulty_tier {
            dimensions.push(self.index.by_tier(tier).to_vec());
        }
        if let Some(category) = filters.length_category {
            dimensions.push(self.index.by_length(category).to_vec());
        }

        if dimensions.is_empty() {
            return (0..self.index.len()).collect();
        }
        intersect_sorted(dimensions)
    }

    fn without_excluded(&self, mut refs: Vec<PuzzleRef>, filters: &SelectionFilters) -> Vec<PuzzleRef> {
        if !filters.exclude.is_empty() {
            refs.retain(|&r| !filters.exclude.contains(&self.index.puzzle(r).id));
        }
        refs
    }

    fn pick_uniform<R: Rng + ?Sized>(
        &self,
        refs: &[PuzzleRef],
        filters: &SelectionFilters,
        rng: &mut R,
    ) -> Option<PuzzleRef> {
        if refs.len() > 1 {
            if let Some(previous) = &filters.previous {
                let fresh: Vec<PuzzleRef> = refs
                    .iter()
                    .copied()
                    .filter(|&r| &self.index.puzzle(r).id != previous)
                    .collect();
                if !fresh.is_empty() {
                    return fresh.choose(rng).copied();
                }
            }
        }
        refs.choose(rng).copied()
    }

    /// One of the `NEAREST_FALLBACK_POOL` puzzles closest to `center`.
    fn pick_nearest<R: Rng + ?Sized>(
        &self,
        mut pool: Vec<PuzzleRef>,
        center: i32,
        filters: &SelectionFilters,
        rng: &mut R,
    ) -> PuzzleRef {
        pool.sort_by_key(|&r| (self.index.puzzle(r).rating.abs_diff(center), r));
        pool.truncate(NEAREST_FALLBACK_POOL);
        self.pick_uniform(&pool, filters, rng).unwrap_or(pool[0])
    }
}

/// Inclusive `[center - range, center + range]`, clamped to the i32 range.
fn rating_window(center: i32, range: i32) -> (i32, i32) {
    let range = range.max(0);
    (center.saturating_sub(range), center.saturating_add(range))
}

/// Intersection of sorted reference lists, smallest list first.
fn intersect_sorted(mut lists: Vec<Vec<PuzzleRef>>) -> Vec<PuzzleRef> {
    lists.sort_by_key(|list| list.len());
    let mut iter = lists.into_iter();
    let mut result = iter.next().unwrap_or_default();
    for list in iter {
        if result.is_empty() {
            break;
        }
        result.retain(|r| list.binary_search(r).is_ok());
    }
    result
}
