//! Coordinate move notation ("e2e4", "e7e8q"): a from/to square pair plus an
//! optional promotion piece. This is the encoding puzzle solution lines use.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use shakmaty::{File, Rank, Role, Square};

use crate::rules::RulesError;

/// A move given purely by coordinates, independent of any position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoordMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Role>,
}

impl CoordMove {
    pub fn new(from: Square, to: Square, promotion: Option<Role>) -> Self {
        Self { from, to, promotion }
    }

    /// Same move with a promotion piece attached.
    pub fn with_promotion(self, role: Role) -> Self {
        Self {
            promotion: Some(role),
            ..self
        }
    }

    /// The from+to part only, e.g. "e7e8" for "e7e8q".
    pub fn squares(&self) -> String {
        format!("{}{}", self.from, self.to)
    }
}

impl fmt::Display for CoordMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(role) = self.promotion {
            write!(f, "{}", role.char())?;
        }
        Ok(())
    }
}

impl FromStr for CoordMove {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let bytes = text.as_bytes();
        if !text.is_ascii() || (bytes.len() != 4 && bytes.len() != 5) {
            return Err(RulesError::InvalidMove(text.to_string()));
        }

        let from = parse_square(&text[0..2]).ok_or_else(|| RulesError::InvalidMove(text.to_string()))?;
        let to = parse_square(&text[2..4]).ok_or_else(|| RulesError::InvalidMove(text.to_string()))?;

        let promotion = match bytes.get(4) {
            Some(&b) => Some(
                parse_promotion(b as char).ok_or_else(|| RulesError::InvalidMove(text.to_string()))?,
            ),
            None => None,
        };

        Ok(Self { from, to, promotion })
    }
}

impl Serialize for CoordMove {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CoordMove {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Parse an algebraic square name like "e4" (case-insensitive).
pub fn parse_square(text: &str) -> Option<Square> {
    let bytes = text.trim().as_bytes();
    if bytes.len() != 2 {
        return None;
    }

    let file = bytes[0].to_ascii_lowercase();
    let rank = bytes[1];
    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return None;
    }

    Some(Square::from_coords(
        File::new(u32::from(file - b'a')),
        Rank::new(u32::from(rank - b'1')),
    ))
}

/// Map a promotion letter to a piece. Kings and pawns are not promotion targets.
pub fn parse_promotion(c: char) -> Option<Role> {
    match c.to_ascii_lowercase() {
        'q' => Some(Role::Queen),
        'r' => Some(Role::Rook),
        'b' => Some(Role::Bishop),
        'n' => Some(Role::Knight),
        _ => None,
    }
}
