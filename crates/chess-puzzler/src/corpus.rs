//! Corpus loading and line validation.
//!
//! Every puzzle's full solution line is replayed once at load time, so the
//! session can treat a rejected scripted move as corrupt data rather than a
//! normal wrong answer.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chess_core::{CoordMove, RulesAdapter};
use tracing::{info, warn};

use crate::error::{CorpusError, PuzzleError};
use crate::puzzle::Puzzle;

/// Outcome of validating a corpus.
#[derive(Debug, Default, Clone)]
pub struct CorpusReport {
    pub loaded: usize,
    pub usable: usize,
    pub skipped: Vec<PuzzleError>,
}

/// Read a JSON array of puzzle records.
pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Vec<Puzzle>, CorpusError> {
    let file = File::open(path)?;
    let puzzles: Vec<Puzzle> = serde_json::from_reader(BufReader::new(file))?;
    Ok(puzzles)
}

pub fn parse_json(text: &str) -> Result<Vec<Puzzle>, CorpusError> {
    Ok(serde_json::from_str(text)?)
}

/// Replay a puzzle's whole line from its starting position.
pub fn check_line<R: RulesAdapter>(puzzle: &Puzzle, rules: &R) -> Result<(), PuzzleError> {
    if puzzle.solution_moves.len() < 2 {
        return Err(PuzzleError::EmptyLine {
            id: puzzle.id.clone(),
        });
    }

    let mut position = rules
        .parse_position(&puzzle.starting_position)
        .map_err(|source| PuzzleError::BadPosition {
            id: puzzle.id.clone(),
            source,
        })?;

    for (index, text) in puzzle.solution_moves.iter().enumerate() {
        let bad_move = |source| PuzzleError::BadMove {
            id: puzzle.id.clone(),
            index,
            source,
        };
        let mv: CoordMove = text.parse().map_err(bad_move)?;
        position = rules.apply_move(&position, &mv).map_err(bad_move)?;
    }

    Ok(())
}

/// Keep only puzzles whose lines replay cleanly.
pub fn validate<R: RulesAdapter>(puzzles: Vec<Puzzle>, rules: &R) -> (Vec<Puzzle>, CorpusReport) {
    let mut report = CorpusReport {
        loaded: puzzles.len(),
        ..Default::default()
    };

    let usable: Vec<Puzzle> = puzzles
        .into_iter()
        .filter(|puzzle| match check_line(puzzle, rules) {
            Ok(()) => true,
            Err(e) => {
                warn!(puzzle_id = %puzzle.id, "Skipping unusable puzzle: {e}");
                report.skipped.push(e);
                false
            }
        })
        .collect();

    report.usable = usable.len();
    info!(
        loaded = report.loaded,
        usable = report.usable,
        skipped = report.skipped.len(),
        "Corpus validated"
    );

    (usable, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::StandardRules;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn test_check_line_accepts_valid_line() {
        let p = Puzzle::new("ok", START, &["e2e4", "e7e5", "g1f3"], 1200, &["opening"]);
        assert_eq!(check_line(&p, &StandardRules), Ok(()));
    }

    #[test]
    fn test_check_line_reports_bad_move_index() {
        let p = Puzzle::new("bad", START, &["e2e4", "e7e5", "e1e3"], 1200, &["opening"]);
        let err = check_line(&p, &StandardRules).unwrap_err();
        assert!(matches!(err, PuzzleError::BadMove { index: 2, .. }));
        assert_eq!(err.puzzle_id(), "bad");
    }

    #[test]
    fn test_validate_skips_unusable_puzzles() {
        let puzzles = vec![
            Puzzle::new("ok", START, &["e2e4", "e7e5"], 1200, &["opening"]),
            Puzzle::new("setup-only", START, &["e2e4"], 1200, &["opening"]),
            Puzzle::new("bad-fen", "xyz", &["e2e4", "e7e5"], 1200, &["opening"]),
            Puzzle::new("garbled", START, &["e2e4", "zz99"], 1200, &["opening"]),
        ];

        let (usable, report) = validate(puzzles, &StandardRules);
        assert_eq!(usable.len(), 1);
        assert_eq!(usable[0].id, "ok");
        assert_eq!(report.loaded, 4);
        assert_eq!(report.usable, 1);
        let skipped: Vec<&str> = report.skipped.iter().map(|e| e.puzzle_id()).collect();
        assert_eq!(skipped, vec!["setup-only", "bad-fen", "garbled"]);
    }

    #[test]
    fn test_parse_json() {
        let text = format!(
            r#"[{{"id": "p1", "startingPosition": "{START}", "solutionMoves": ["e2e4", "e7e5"], "rating": 900, "themes": ["opening"]}}]"#
        );
        let puzzles = parse_json(&text).unwrap();
        assert_eq!(puzzles.len(), 1);
        assert_eq!(puzzles[0].rating, 900);
        assert!(parse_json("{not json").is_err());
    }
}
