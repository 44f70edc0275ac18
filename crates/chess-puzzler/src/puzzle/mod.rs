/// Puzzle data model and rating/length classification

pub mod classify;

use serde::{Deserialize, Serialize};

pub use classify::{rating_bucket, LengthCategory, Tier};

/// Puzzle identifier as it appears in the corpus.
pub type PuzzleId = String;

/// A chess puzzle with a solution line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Puzzle {
    pub id: PuzzleId,
    /// FEN of the position before the setup move
    #[serde(alias = "fen")]
    pub starting_position: String,
    /// Coordinate moves: [opponent_setup, solver_move_1, opp_reply_1, solver_move_2, ...]
    #[serde(alias = "moves")]
    pub solution_moves: Vec<String>,
    pub rating: i32,
    #[serde(default)]
    pub themes: Vec<String>,
}

impl Puzzle {
    pub fn new(
        id: impl Into<String>,
        starting_position: impl Into<String>,
        solution_moves: &[&str],
        rating: i32,
        themes: &[&str],
    ) -> Self {
        Self {
            id: id.into(),
            starting_position: starting_position.into(),
            solution_moves: solution_moves.iter().map(|m| m.to_string()).collect(),
            rating,
            themes: themes.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Number of moves the solver has to find (odd indices: 1, 3, 5, ...)
    pub fn solver_move_count(&self) -> usize {
        self.solution_moves.len() / 2
    }

    /// The opponent's setup move, played before the solver's first turn
    pub fn setup_move(&self) -> Option<&str> {
        self.solution_moves.first().map(String::as_str)
    }

    /// Lowercased, de-duplicated themes in first-seen order
    pub fn normalized_themes(&self) -> Vec<String> {
        let mut seen = Vec::with_capacity(self.themes.len());
        for theme in &self.themes {
            let lower = theme.trim().to_lowercase();
            if !lower.is_empty() && !seen.contains(&lower) {
                seen.push(lower);
            }
        }
        seen
    }

    pub fn has_theme(&self, theme: &str) -> bool {
        let wanted = theme.trim();
        self.themes.iter().any(|t| t.trim().eq_ignore_ascii_case(wanted))
    }

    pub fn tier(&self) -> Option<Tier> {
        Tier::for_rating(self.rating)
    }

    pub fn length_category(&self) -> Option<LengthCategory> {
        LengthCategory::for_solver_moves(self.solver_move_count())
    }
}
