pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Extension, Router,
};
use chess_puzzler::chess_core::StandardRules;
use chess_puzzler::{corpus, CorpusIndex};
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::state::AppState;

/// Load, validate and index the corpus named by the config.
pub fn load_state(config: Config) -> anyhow::Result<AppState> {
    let puzzles = corpus::load_json(&config.corpus_path)
        .with_context(|| format!("Failed to load puzzle corpus from {}", config.corpus_path))?;
    let (usable, report) = corpus::validate(puzzles, &StandardRules);
    tracing::info!(
        loaded = report.loaded,
        usable = report.usable,
        skipped = report.skipped.len(),
        "Puzzle corpus validated"
    );

    Ok(AppState::new(CorpusIndex::build(usable), config))
}

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health_check))
        // Puzzles: fixed paths before the parameterized one
        .route("/api/puzzles/select", get(routes::puzzles::select_puzzle))
        .route("/api/puzzles/batch", get(routes::puzzles::select_batch))
        .route("/api/puzzles/themes", get(routes::puzzles::list_themes))
        .route("/api/puzzles/{puzzle_id}", get(routes::puzzles::get_puzzle))
        // Sessions
        .route("/api/sessions", post(routes::sessions::open_session))
        .route(
            "/api/sessions/{session_id}",
            get(routes::sessions::get_session).delete(routes::sessions::close_session),
        )
        .route("/api/sessions/{session_id}/moves", post(routes::sessions::submit_move))
        .route("/api/sessions/{session_id}/reveal", post(routes::sessions::reveal_solution))
        .route("/api/sessions/{session_id}/restart", post(routes::sessions::restart_session))
        // Rating
        .route("/api/rating", post(routes::rating::update_rating))
        .layer(Extension(state))
        .layer(cors)
}

pub async fn serve(listener: tokio::net::TcpListener, state: AppState) -> std::io::Result<()> {
    axum::serve(listener, app(state)).await
}
