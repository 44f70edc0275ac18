#![allow(dead_code)]

use chess_puzzler::{CorpusIndex, Puzzle};
use reqwest::Client;
use server::config::Config;
use server::state::AppState;

pub const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// After 1.e4 e5 2.Bc4 Nc6 3.Qh5, black to move.
pub const SCHOLAR: &str = "r1bqkbnr/pppp1ppp/2n5/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 3 3";

/// White pawn on e7, black to move.
pub const PROMOTION: &str = "8/4P3/8/8/8/k7/8/4K3 b - - 0 1";

/// A small corpus of legal lines spread over the difficulty tiers.
pub fn sample_puzzles() -> Vec<Puzzle> {
    vec![
        Puzzle::new("scholar", SCHOLAR, &["g8f6", "h5f7"], 650, &["mate", "mateIn1"]),
        Puzzle::new(
            "italian",
            START,
            &["e2e4", "e7e5", "g1f3", "b8c6", "f1c4"],
            1250,
            &["opening", "development"],
        ),
        Puzzle::new("promo", PROMOTION, &["a3a2", "e7e8q"], 1450, &["promotion"]),
        Puzzle::new("knight", PROMOTION, &["a3a2", "e7e8n"], 1750, &["promotion", "underPromotion"]),
        Puzzle::new(
            "ruy",
            START,
            &["e2e4", "e7e5", "g1f3", "b8c6", "f1b5", "a7a6", "b5a4"],
            2100,
            &["opening"],
        ),
    ]
}

/// A line whose third move is illegal; only caught once play reaches it.
pub fn corrupt_puzzle() -> Puzzle {
    Puzzle::new("corrupt", START, &["e2e4", "e7e5", "e1e3"], 1300, &["broken"])
}

/// Start a server on an ephemeral port and return its base URL.
pub async fn spawn_server(puzzles: Vec<Puzzle>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test listener");
    let addr = listener.local_addr().expect("no local addr");

    let state = AppState::new(CorpusIndex::build(puzzles), Config::default());
    tokio::spawn(server::serve(listener, state));

    format!("http://{addr}")
}

/// Build a reqwest client for tests.
pub fn client() -> Client {
    Client::new()
}
