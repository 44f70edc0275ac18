//! Elo-style rating update for puzzle attempts. Pure functions only;
//! storing the rating is the caller's business.

use serde::{Deserialize, Serialize};

pub const DEFAULT_K_FACTOR: f64 = 32.0;
pub const DEFAULT_RATING_FLOOR: i32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingPolicy {
    pub k_factor: f64,
    /// Lowest rating an update can produce; None disables the clamp.
    pub floor: Option<i32>,
}

impl Default for RatingPolicy {
    fn default() -> Self {
        Self {
            k_factor: DEFAULT_K_FACTOR,
            floor: Some(DEFAULT_RATING_FLOOR),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingChange {
    pub new_rating: i32,
    pub delta: i32,
}

/// Probability the solver beats a puzzle of the given rating.
pub fn expected_score(current: i32, puzzle_rating: i32) -> f64 {
    1.0 / (1.0 + 10f64.powf(f64::from(puzzle_rating - current) / 400.0))
}

/// Update with the default policy (K = 32, floor 100).
pub fn update(current: i32, puzzle_rating: i32, solved: bool) -> RatingChange {
    RatingPolicy::default().update(current, puzzle_rating, solved)
}

impl RatingPolicy {
    pub fn update(&self, current: i32, puzzle_rating: i32, solved: bool) -> RatingChange {
        let actual = if solved { 1.0 } else { 0.0 };
        let raw_delta = (self.k_factor * (actual - expected_score(current, puzzle_rating))).round() as i32;

        let mut new_rating = current + raw_delta;
        if let Some(floor) = self.floor {
            // Never push a rating below the floor, but don't lift one that already is
            new_rating = new_rating.max(floor.min(current));
        }

        RatingChange {
            new_rating,
            delta: new_rating - current,
        }
    }
}

/// A solver's rating plus the highest rating ever reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingRecord {
    pub rating: i32,
    pub peak_rating: i32,
}

impl RatingRecord {
    pub fn new(rating: i32) -> Self {
        Self {
            rating,
            peak_rating: rating,
        }
    }

    pub fn apply(&mut self, change: RatingChange) {
        self.rating = change.new_rating;
        self.peak_rating = self.peak_rating.max(change.new_rating);
    }

    /// Rate one attempt and record the result.
    pub fn record(&mut self, policy: &RatingPolicy, puzzle_rating: i32, solved: bool) -> RatingChange {
        let change = policy.update(self.rating, puzzle_rating, solved);
        self.apply(change);
        change
    }
}
