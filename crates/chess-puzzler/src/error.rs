//! Puzzle engine error types

use chess_core::RulesError;
use thiserror::Error;

/// A puzzle whose line cannot be replayed. Discard it and pick another.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PuzzleError {
    #[error("Puzzle {id} has no playable solution line")]
    EmptyLine { id: String },

    #[error("Puzzle {id} has an unusable starting position: {source}")]
    BadPosition { id: String, source: RulesError },

    #[error("Puzzle {id} move {index} cannot be applied: {source}")]
    BadMove {
        id: String,
        index: usize,
        source: RulesError,
    },
}

impl PuzzleError {
    pub fn puzzle_id(&self) -> &str {
        match self {
            PuzzleError::EmptyLine { id }
            | PuzzleError::BadPosition { id, .. }
            | PuzzleError::BadMove { id, .. } => id,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Puzzle unusable: {0}")]
    PuzzleUnusable(#[from] PuzzleError),

    /// The scripted solution move was rejected by the rules adapter.
    #[error("Internal consistency error in puzzle {id} at move {index}: {source}")]
    InternalConsistency {
        id: String,
        index: usize,
        source: RulesError,
    },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectError {
    #[error("No puzzle found: the corpus is empty")]
    NotFound,
}

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("Failed to read corpus: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse corpus JSON: {0}")]
    Json(#[from] serde_json::Error),
}
