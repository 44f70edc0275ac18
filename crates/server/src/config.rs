use std::env;
use std::time::Duration;

use chess_puzzler::rating::{RatingPolicy, DEFAULT_K_FACTOR, DEFAULT_RATING_FLOOR};
use chess_puzzler::selector::DEFAULT_RATING_RANGE;

#[derive(Clone, Debug)]
pub struct Config {
    pub corpus_path: String,
    pub host: String,
    pub port: u16,
    pub rating_policy: RatingPolicy,
    pub rating_range: i32,
    pub show_correction: bool,
    /// Sessions untouched for this long are dropped.
    pub session_ttl: Duration,
    pub max_sessions: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            corpus_path: "data/puzzles.json".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8000,
            rating_policy: RatingPolicy::default(),
            rating_range: DEFAULT_RATING_RANGE,
            show_correction: true,
            session_ttl: Duration::from_secs(30 * 60),
            max_sessions: 10_000,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            corpus_path: env::var("CORPUS_PATH").unwrap_or(defaults.corpus_path),
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT").unwrap_or(defaults.port),
            rating_policy: RatingPolicy {
                k_factor: parse_var("RATING_K_FACTOR").unwrap_or(DEFAULT_K_FACTOR),
                // RATING_FLOOR=0 disables the floor
                floor: match parse_var::<i32>("RATING_FLOOR") {
                    Some(0) => None,
                    Some(floor) => Some(floor),
                    None => Some(DEFAULT_RATING_FLOOR),
                },
            },
            rating_range: parse_var("RATING_RANGE").unwrap_or(defaults.rating_range),
            show_correction: parse_var("SHOW_CORRECTION").unwrap_or(defaults.show_correction),
            session_ttl: parse_var("SESSION_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.session_ttl),
            max_sessions: parse_var("MAX_SESSIONS")
                .filter(|&n: &usize| n > 0)
                .unwrap_or(defaults.max_sessions),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
