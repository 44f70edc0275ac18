//! Rules adapter: the only place the puzzle engine touches move legality.
//!
//! The engine never generates moves itself. It hands a position and a
//! coordinate move to a `RulesAdapter` and gets back the next position or an
//! error. `StandardRules` is the shakmaty-backed implementation.

use std::fmt;

use serde::{Deserialize, Serialize};
use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, File, Move, Position, Rank, Role, Square};
use thiserror::Error;

use crate::coord::CoordMove;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    #[error("Invalid move notation: {0}")]
    InvalidMove(String),

    #[error("Illegal move {mv} in position {fen}")]
    IllegalMove { mv: String, fen: String },
}

/// Side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }
}

impl From<Color> for Side {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::White => f.write_str("white"),
            Side::Black => f.write_str("black"),
        }
    }
}

/// Capability the puzzle engine consumes: apply moves, report the turn.
pub trait RulesAdapter {
    type Position: Clone + fmt::Debug;

    /// Parse a position descriptor (FEN for the standard rules).
    fn parse_position(&self, descriptor: &str) -> Result<Self::Position, RulesError>;

    /// Apply a move, returning the resulting position or `IllegalMove`.
    fn apply_move(&self, position: &Self::Position, mv: &CoordMove) -> Result<Self::Position, RulesError>;

    fn turn_of(&self, position: &Self::Position) -> Side;

    /// Does moving the piece on `from` to `to` put a pawn on its last rank?
    fn is_promotion_move(&self, position: &Self::Position, from: Square, to: Square) -> bool;

    /// Render a position back into its descriptor form.
    fn to_fen(&self, position: &Self::Position) -> String;
}

/// Standard chess rules backed by shakmaty.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRules;

impl RulesAdapter for StandardRules {
    type Position = Chess;

    fn parse_position(&self, descriptor: &str) -> Result<Chess, RulesError> {
        let fen: Fen = descriptor
            .trim()
            .parse()
            .map_err(|e| RulesError::InvalidPosition(format!("{descriptor}: {e}")))?;

        fen.into_position(CastlingMode::Standard)
            .map_err(|e| RulesError::InvalidPosition(format!("{descriptor}: {e}")))
    }

    fn apply_move(&self, position: &Chess, mv: &CoordMove) -> Result<Chess, RulesError> {
        let legal = position
            .legal_moves()
            .into_iter()
            .find(|m| matches_coord(m, mv))
            .ok_or_else(|| RulesError::IllegalMove {
                mv: mv.to_string(),
                fen: self.to_fen(position),
            })?;

        let mut next = position.clone();
        next.play_unchecked(legal);
        Ok(next)
    }

    fn turn_of(&self, position: &Chess) -> Side {
        position.turn().into()
    }

    fn is_promotion_move(&self, position: &Chess, from: Square, to: Square) -> bool {
        match position.board().piece_at(from) {
            Some(piece) if piece.role == Role::Pawn => {
                let last_rank = match piece.color {
                    Color::White => Rank::Eighth,
                    Color::Black => Rank::First,
                };
                to.rank() == last_rank
            }
            _ => false,
        }
    }

    fn to_fen(&self, position: &Chess) -> String {
        Fen::from_position(position, EnPassantMode::Legal).to_string()
    }
}

/// Does a legal move correspond to the given coordinate move?
/// Castling is accepted both as king-to-destination ("e1g1") and
/// king-takes-rook ("e1h1").
fn matches_coord(legal: &Move, mv: &CoordMove) -> bool {
    match legal {
        Move::Castle { king, rook } => {
            if *king != mv.from || mv.promotion.is_some() {
                return false;
            }
            let king_file = if rook.file() > king.file() { File::G } else { File::C };
            let king_to = Square::from_coords(king_file, king.rank());
            mv.to == king_to || mv.to == *rook
        }
        _ => legal.from() == Some(mv.from) && legal.to() == mv.to && legal.promotion() == mv.promotion,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    fn mv(text: &str) -> CoordMove {
        text.parse().unwrap()
    }

    #[test]
    fn test_apply_legal_move_switches_turn() {
        let rules = StandardRules;
        let pos = rules.parse_position(START).unwrap();
        assert_eq!(rules.turn_of(&pos), Side::White);

        let next = rules.apply_move(&pos, &mv("e2e4")).unwrap();
        assert_eq!(rules.turn_of(&next), Side::Black);
        assert!(rules.to_fen(&next).starts_with("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b"));
    }

    #[test]
    fn test_illegal_move_is_rejected() {
        let rules = StandardRules;
        let pos = rules.parse_position(START).unwrap();
        let err = rules.apply_move(&pos, &mv("e2e5")).unwrap_err();
        assert!(matches!(err, RulesError::IllegalMove { .. }));

        // Wrong side to move
        assert!(rules.apply_move(&pos, &mv("e7e5")).is_err());
    }

    #[test]
    fn test_invalid_fen() {
        let rules = StandardRules;
        assert!(matches!(
            rules.parse_position("not a fen"),
            Err(RulesError::InvalidPosition(_))
        ));
    }

    #[test]
    fn test_castling_both_encodings() {
        let rules = StandardRules;
        let pos = rules
            .parse_position("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1")
            .unwrap();

        let short = rules.apply_move(&pos, &mv("e1g1")).unwrap();
        assert!(rules.to_fen(&short).contains("R4RK1"));

        let via_rook = rules.apply_move(&pos, &mv("e1h1")).unwrap();
        assert_eq!(rules.to_fen(&short), rules.to_fen(&via_rook));

        let long = rules.apply_move(&pos, &mv("e1c1")).unwrap();
        assert!(rules.to_fen(&long).contains("2KR3R"));
    }

    #[test]
    fn test_promotion_requires_piece() {
        let rules = StandardRules;
        let pos = rules.parse_position("8/4P3/8/8/8/8/k7/4K3 w - - 0 1").unwrap();

        assert!(rules.is_promotion_move(&pos, Square::E7, Square::E8));
        assert!(!rules.is_promotion_move(&pos, Square::E1, Square::E2));

        assert!(rules.apply_move(&pos, &mv("e7e8")).is_err());
        let queened = rules.apply_move(&pos, &mv("e7e8q")).unwrap();
        assert!(rules.to_fen(&queened).starts_with("4Q3/"));
        let knighted = rules.apply_move(&pos, &mv("e7e8n")).unwrap();
        assert!(rules.to_fen(&knighted).starts_with("4N3/"));
    }

    #[test]
    fn test_black_pawn_promotes_on_first_rank() {
        let rules = StandardRules;
        let pos = rules.parse_position("4k3/8/8/8/8/8/3p4/K7 b - - 0 1").unwrap();
        assert!(rules.is_promotion_move(&pos, Square::D2, Square::D1));
        assert!(!rules.is_promotion_move(&pos, Square::E8, Square::E7));
    }
}
