//! Chess primitives shared by the puzzle engine: coordinate move notation
//! and the rules adapter the engine uses to apply moves.

pub mod coord;
pub mod rules;

pub use coord::CoordMove;
pub use rules::{RulesAdapter, RulesError, Side, StandardRules};
pub use shakmaty;
