/// Fixed classification bands used by the corpus index:
/// difficulty tiers by rating, length categories by solver move count.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Width of a rating bucket in the index.
pub const RATING_BUCKET_WIDTH: i32 = 100;

/// Lower edge of the 100-point bucket a rating falls in.
pub fn rating_bucket(rating: i32) -> i32 {
    rating.div_euclid(RATING_BUCKET_WIDTH) * RATING_BUCKET_WIDTH
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Beginner, Tier::Intermediate, Tier::Advanced, Tier::Expert];

    /// Half-open rating band `[low, high)` for this tier.
    pub fn band(self) -> (i32, i32) {
        match self {
            Tier::Beginner => (400, 1200),
            Tier::Intermediate => (1200, 1600),
            Tier::Advanced => (1600, 2000),
            Tier::Expert => (2000, 3200),
        }
    }

    /// None when the rating is outside every band.
    pub fn for_rating(rating: i32) -> Option<Tier> {
        Self::ALL.into_iter().find(|tier| {
            let (low, high) = tier.band();
            rating >= low && rating < high
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Beginner => "beginner",
            Tier::Intermediate => "intermediate",
            Tier::Advanced => "advanced",
            Tier::Expert => "expert",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|tier| tier.as_str() == lower)
            .ok_or_else(|| format!("unknown difficulty tier: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LengthCategory {
    OneMove,
    Short,
    Long,
    VeryLong,
}

impl LengthCategory {
    pub const ALL: [LengthCategory; 4] = [
        LengthCategory::OneMove,
        LengthCategory::Short,
        LengthCategory::Long,
        LengthCategory::VeryLong,
    ];

    /// None for lines without a single solver move.
    pub fn for_solver_moves(count: usize) -> Option<LengthCategory> {
        match count {
            0 => None,
            1 => Some(LengthCategory::OneMove),
            2 => Some(LengthCategory::Short),
            3 => Some(LengthCategory::Long),
            _ => Some(LengthCategory::VeryLong),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LengthCategory::OneMove => "oneMove",
            LengthCategory::Short => "short",
            LengthCategory::Long => "long",
            LengthCategory::VeryLong => "veryLong",
        }
    }
}

impl fmt::Display for LengthCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LengthCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|cat| cat.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown length category: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bucket() {
        assert_eq!(rating_bucket(1200), 1200);
        assert_eq!(rating_bucket(1299), 1200);
        assert_eq!(rating_bucket(1301), 1300);
        assert_eq!(rating_bucket(99), 0);
        assert_eq!(rating_bucket(-1), -100);
    }

    #[test]
    fn test_tier_bands() {
        assert_eq!(Tier::for_rating(399), None);
        assert_eq!(Tier::for_rating(400), Some(Tier::Beginner));
        assert_eq!(Tier::for_rating(1199), Some(Tier::Beginner));
        assert_eq!(Tier::for_rating(1200), Some(Tier::Intermediate));
        assert_eq!(Tier::for_rating(1650), Some(Tier::Advanced));
        assert_eq!(Tier::for_rating(2400), Some(Tier::Expert));
        assert_eq!(Tier::for_rating(3200), None);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("Advanced".parse::<Tier>(), Ok(Tier::Advanced));
        assert!("grandmaster".parse::<Tier>().is_err());
        assert_eq!("onemove".parse::<LengthCategory>(), Ok(LengthCategory::OneMove));
        assert_eq!("veryLong".parse::<LengthCategory>(), Ok(LengthCategory::VeryLong));
        assert!("medium".parse::<LengthCategory>().is_err());
    }

    #[test]
    fn test_length_bands() {
        assert_eq!(LengthCategory::for_solver_moves(0), None);
        assert_eq!(LengthCategory::for_solver_moves(1), Some(LengthCategory::OneMove));
        assert_eq!(LengthCategory::for_solver_moves(2), Some(LengthCategory::Short));
        assert_eq!(LengthCategory::for_solver_moves(3), Some(LengthCategory::Long));
        assert_eq!(LengthCategory::for_solver_moves(7), Some(LengthCategory::VeryLong));
    }
}
