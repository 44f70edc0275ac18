pub mod health;
pub mod puzzles;
pub mod rating;
pub mod sessions;
