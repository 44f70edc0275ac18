//! Puzzle session: one solver working through one puzzle.
//!
//! States are `Playing -> Solved | Failed`. The setup move is applied on
//! open, and every correct solver move is immediately followed by the
//! scripted opponent reply, so the solver never moves twice in a row.
//! `reveal_solution` and `restart` are the only ways out of a terminal state.

use std::sync::Arc;

use chess_core::coord::{parse_promotion, parse_square};
use chess_core::shakmaty::Role;
use chess_core::{CoordMove, RulesAdapter, Side, StandardRules};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{PuzzleError, SessionError};
use crate::puzzle::Puzzle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    Playing,
    Solved,
    Failed,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        self != SessionState::Playing
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Verdict {
    /// Matched the solution line
    Correct,
    /// A different move; the session is now failed
    Incorrect,
    /// Not evaluated: bad input or the session is not in play
    Rejected,
}

/// Result of one `submit_move` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveOutcome {
    pub verdict: Verdict,
    pub state: SessionState,
    /// Opponent move auto-played after a correct move
    pub opponent_reply: Option<String>,
    /// Expected move, played for display after a wrong move
    pub correction: Option<String>,
}

impl MoveOutcome {
    pub fn accepted(&self) -> bool {
        self.verdict == Verdict::Correct
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// After a wrong move, play the expected move on the board.
    pub show_correction: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self { show_correction: true }
    }
}

/// Terminal outcome handed to mode controllers and the rating updater.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    pub puzzle_id: String,
    pub puzzle_rating: i32,
    /// Solved without a wrong move and without revealing the line
    pub solved: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub solver_moves_played: usize,
    pub solver_moves_total: usize,
}

#[derive(Debug, Clone)]
pub struct PuzzleSession<R: RulesAdapter = StandardRules> {
    puzzle: Arc<Puzzle>,
    rules: R,
    options: SessionOptions,
    /// Position right after the setup move
    opening: R::Position,
    position: R::Position,
    cursor: usize,
    state: SessionState,
    last_move: Option<String>,
    failed: bool,
    revealed: bool,
}

impl<R: RulesAdapter> PuzzleSession<R> {
    pub fn open(puzzle: Arc<Puzzle>, rules: R) -> Result<Self, SessionError> {
        Self::open_with(puzzle, rules, SessionOptions::default())
    }

    /// Apply the setup move and hand the board to the solver.
    pub fn open_with(puzzle: Arc<Puzzle>, rules: R, options: SessionOptions) -> Result<Self, SessionError> {
        if puzzle.solution_moves.len() < 2 {
            return Err(PuzzleError::EmptyLine { id: puzzle.id.clone() }.into());
        }

        let start = rules
            .parse_position(&puzzle.starting_position)
            .map_err(|source| PuzzleError::BadPosition {
                id: puzzle.id.clone(),
                source,
            })?;

        let bad_setup = |source| PuzzleError::BadMove {
            id: puzzle.id.clone(),
            index: 0,
            source,
        };
        let setup: CoordMove = puzzle.solution_moves[0].parse().map_err(bad_setup)?;
        let opening = rules.apply_move(&start, &setup).map_err(bad_setup)?;

        debug!(puzzle_id = %puzzle.id, rating = puzzle.rating, "Puzzle session opened");

        Ok(Self {
            position: opening.clone(),
            opening,
            cursor: 1,
            state: SessionState::Playing,
            last_move: Some(setup.to_string()),
            failed: false,
            revealed: false,
            puzzle,
            rules,
            options,
        })
    }

    /// Check a solver move against the solution line.
    ///
    /// Squares are algebraic names ("e2"). For a pawn reaching its last rank
    /// the promotion piece is `promotion`, else the one the solution uses,
    /// else a queen.
    pub fn submit_move(
        &mut self,
        from: &str,
        to: &str,
        promotion: Option<char>,
    ) -> Result<MoveOutcome, SessionError> {
        if self.state != SessionState::Playing {
            debug!(puzzle_id = %self.puzzle.id, state = ?self.state, "Move rejected: session is over");
            return Ok(self.rejected());
        }

        let (from_sq, to_sq) = match (parse_square(from), parse_square(to)) {
            (Some(f), Some(t)) if f != t => (f, t),
            _ => {
                debug!(puzzle_id = %self.puzzle.id, from, to, "Move rejected: invalid squares");
                return Ok(self.rejected());
            }
        };

        let index = self.cursor;
        let expected = self.puzzle.solution_moves[index].trim().to_ascii_lowercase();
        let attempt = CoordMove::new(from_sq, to_sq, None);
        let bare = attempt.squares();

        let matched = if self.rules.is_promotion_move(&self.position, from_sq, to_sq) {
            let role = promotion
                .and_then(parse_promotion)
                .or_else(|| expected_promotion(&expected, &bare))
                .unwrap_or(Role::Queen);
            let qualified = attempt.with_promotion(role).to_string();
            expected == bare || expected == qualified
        } else {
            expected == bare
        };

        if matched {
            self.advance_correct(index)
        } else {
            self.fail(index, &bare)
        }
    }

    fn advance_correct(&mut self, index: usize) -> Result<MoveOutcome, SessionError> {
        let len = self.puzzle.solution_moves.len();

        let mut position = self.apply_scripted(&self.position, index)?;
        let mut cursor = index + 1;
        let mut reply = None;

        if cursor < len {
            position = self.apply_scripted(&position, cursor)?;
            reply = Some(self.puzzle.solution_moves[cursor].clone());
            cursor += 1;
        }

        self.position = position;
        self.cursor = cursor;
        self.last_move = Some(
            reply
                .clone()
                .unwrap_or_else(|| self.puzzle.solution_moves[index].clone()),
        );
        if cursor == len {
            self.state = SessionState::Solved;
        }

        debug!(puzzle_id = %self.puzzle.id, cursor, state = ?self.state, "Correct move");

        Ok(MoveOutcome {
            verdict: Verdict::Correct,
            state: self.state,
            opponent_reply: reply,
            correction: None,
        })
    }

    fn fail(&mut self, index: usize, attempted: &str) -> Result<MoveOutcome, SessionError> {
        let mut correction = None;
        if self.options.show_correction {
            let position = self.apply_scripted(&self.position, index)?;
            let expected = self.puzzle.solution_moves[index].clone();
            self.position = position;
            self.cursor = index + 1;
            self.last_move = Some(expected.clone());
            correction = Some(expected);
        }

        self.state = SessionState::Failed;
        self.failed = true;

        debug!(puzzle_id = %self.puzzle.id, attempted, "Wrong move");

        Ok(MoveOutcome {
            verdict: Verdict::Incorrect,
            state: self.state,
            opponent_reply: None,
            correction,
        })
    }

    /// Play out the rest of the line and mark the session solved.
    /// Returns the moves that were played.
    pub fn reveal_solution(&mut self) -> Result<Vec<String>, SessionError> {
        if self.state == SessionState::Solved {
            return Ok(Vec::new());
        }

        let len = self.puzzle.solution_moves.len();
        let mut position = self.position.clone();
        let mut played = Vec::with_capacity(len - self.cursor);
        for index in self.cursor..len {
            position = self.apply_scripted(&position, index)?;
            played.push(self.puzzle.solution_moves[index].clone());
        }

        self.position = position;
        self.cursor = len;
        self.state = SessionState::Solved;
        self.revealed = true;
        if let Some(last) = played.last() {
            self.last_move = Some(last.clone());
        }

        debug!(puzzle_id = %self.puzzle.id, moves = played.len(), "Solution revealed");
        Ok(played)
    }

    /// Back to the position right after the setup move.
    pub fn restart(&mut self) {
        self.position = self.opening.clone();
        self.cursor = 1;
        self.state = SessionState::Playing;
        self.last_move = self.puzzle.solution_moves.first().cloned();
        self.failed = false;
        self.revealed = false;
    }

    fn apply_scripted(&self, position: &R::Position, index: usize) -> Result<R::Position, SessionError> {
        let text = &self.puzzle.solution_moves[index];
        let result = text
            .parse::<CoordMove>()
            .and_then(|mv| self.rules.apply_move(position, &mv));

        result.map_err(|source| {
            error!(puzzle_id = %self.puzzle.id, index, mv = %text, "Solution move rejected: {source}");
            SessionError::InternalConsistency {
                id: self.puzzle.id.clone(),
                index,
                source,
            }
        })
    }

    fn rejected(&self) -> MoveOutcome {
        MoveOutcome {
            verdict: Verdict::Rejected,
            state: self.state,
            opponent_reply: None,
            correction: None,
        }
    }

    pub fn puzzle(&self) -> &Arc<Puzzle> {
        &self.puzzle
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Index of the next solution move.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn position(&self) -> &R::Position {
        &self.position
    }

    pub fn fen(&self) -> String {
        self.rules.to_fen(&self.position)
    }

    /// Board orientation: the side to move after the setup move.
    pub fn solver_side(&self) -> Side {
        self.rules.turn_of(&self.opening)
    }

    pub fn side_to_move(&self) -> Side {
        self.rules.turn_of(&self.position)
    }

    /// The move the solver should play next, if still in play.
    pub fn expected_move(&self) -> Option<&str> {
        match self.state {
            SessionState::Playing => self.puzzle.solution_moves.get(self.cursor).map(String::as_str),
            _ => None,
        }
    }

    pub fn last_move(&self) -> Option<&str> {
        self.last_move.as_deref()
    }

    pub fn progress(&self) -> Progress {
        let total = self.puzzle.solver_move_count();
        Progress {
            solver_moves_played: (self.cursor / 2).min(total),
            solver_moves_total: total,
        }
    }

    /// Terminal outcome, or None while still in play.
    pub fn attempt(&self) -> Option<Attempt> {
        if !self.state.is_terminal() {
            return None;
        }
        Some(Attempt {
            puzzle_id: self.puzzle.id.clone(),
            puzzle_rating: self.puzzle.rating,
            solved: self.state == SessionState::Solved && !self.failed && !self.revealed,
        })
    }
}

/// Promotion piece of the expected move when it shares the attempted squares.
fn expected_promotion(expected: &str, bare: &str) -> Option<Role> {
    if expected.len() == 5 && expected.starts_with(bare) {
        expected.chars().nth(4).and_then(parse_promotion)
    } else {
        None
    }
}
