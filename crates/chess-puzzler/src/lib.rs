//! Tactical puzzle engine.
//!
//! Builds a read-only index over a puzzle corpus, selects puzzles under
//! rating/theme/tier/length filters, runs the per-attempt session state
//! machine, rates attempts, and drives the game modes on top of those.

pub mod corpus;
pub mod error;
pub mod index;
pub mod modes;
pub mod puzzle;
pub mod rating;
pub mod selector;
pub mod session;

pub use chess_core;

pub use error::{CorpusError, PuzzleError, SelectError, SessionError};
pub use index::{CorpusIndex, PuzzleRef};
pub use puzzle::{LengthCategory, Puzzle, PuzzleId, Tier};
pub use rating::{RatingChange, RatingPolicy, RatingRecord};
pub use selector::{MatchKind, Selection, SelectionFilters, Selector, ThemeMatch};
pub use session::{Attempt, MoveOutcome, PuzzleSession, SessionOptions, SessionState, Verdict};
