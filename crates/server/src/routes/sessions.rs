use std::sync::Arc;

use axum::{extract::Path, http::StatusCode, Extension, Json};
use chess_puzzler::chess_core::StandardRules;
use chess_puzzler::{
    LengthCategory, PuzzleSession, SelectionFilters, Selector, SessionError, SessionOptions, ThemeMatch, Tier,
};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

use crate::error::AppError;
use crate::state::{AppState, SessionId};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenSessionRequest {
    /// Play this puzzle. Otherwise one is selected from the filters below.
    pub puzzle_id: Option<String>,
    pub rating: Option<i32>,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub theme_match: ThemeMatch,
    pub tier: Option<String>,
    pub length: Option<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    pub previous: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub from: String,
    pub to: String,
    pub promotion: Option<char>,
}

fn session_view(id: SessionId, session: &PuzzleSession<StandardRules>) -> JsonValue {
    let puzzle = session.puzzle();
    json!({
        "id": id,
        "puzzleId": puzzle.id,
        "rating": puzzle.rating,
        "themes": puzzle.themes,
        "fen": session.fen(),
        "state": session.state(),
        "solverSide": session.solver_side(),
        "sideToMove": session.side_to_move(),
        "lastMove": session.last_move(),
        "progress": session.progress(),
        "attempt": session.attempt(),
    })
}

/// Drop a session whose puzzle data turned out to be corrupt.
fn discard_on_corruption(state: &AppState, id: SessionId, err: &SessionError) {
    if matches!(err, SessionError::InternalConsistency { .. }) {
        if let Ok(Some(_)) = state.sessions.remove(id) {
            tracing::warn!(session_id = id, "Session discarded after corrupt solution line");
        }
    }
}

/// POST /api/sessions
pub async fn open_session(
    Extension(state): Extension<AppState>,
    Json(body): Json<OpenSessionRequest>,
) -> Result<(StatusCode, Json<JsonValue>), AppError> {
    let (puzzle, match_kind) = match body.puzzle_id.as_deref() {
        Some(puzzle_id) => {
            let puzzle = state
                .index
                .get(puzzle_id)
                .ok_or_else(|| AppError::NotFound(format!("Puzzle {puzzle_id} not found")))?;
            (Arc::clone(puzzle), None)
        }
        None => {
            let mut filters = SelectionFilters {
                rating_center: body.rating,
                rating_range: super::puzzles::default_range(&state),
                themes: body.themes,
                theme_match: body.theme_match,
                exclude: body.exclude.into_iter().collect(),
                previous: body.previous,
                ..Default::default()
            };
            if let Some(tier) = body.tier.as_deref() {
                filters.difficulty_tier = Some(tier.parse::<Tier>().map_err(AppError::BadRequest)?);
            }
            if let Some(length) = body.length.as_deref() {
                filters.length_category = Some(length.parse::<LengthCategory>().map_err(AppError::BadRequest)?);
            }
            let selection = Selector::new(&state.index).select(&filters)?;
            (selection.puzzle, Some(selection.match_kind))
        }
    };

    let options = SessionOptions {
        show_correction: state.config.show_correction,
    };
    let session = PuzzleSession::open_with(puzzle, StandardRules, options)?;
    let puzzle_id = session.puzzle().id.clone();
    let id = state.sessions.insert(session)?;

    tracing::info!(session_id = id, puzzle_id = %puzzle_id, "Session opened");

    let mut view = state.sessions.with_session(id, |session| Ok(session_view(id, session)))?;
    view["matchKind"] = json!(match_kind);
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/sessions/{session_id}
pub async fn get_session(
    Extension(state): Extension<AppState>,
    Path(session_id): Path<SessionId>,
) -> Result<Json<JsonValue>, AppError> {
    let view = state
        .sessions
        .with_session(session_id, |session| Ok(session_view(session_id, session)))?;
    Ok(Json(view))
}

/// POST /api/sessions/{session_id}/moves
pub async fn submit_move(
    Extension(state): Extension<AppState>,
    Path(session_id): Path<SessionId>,
    Json(body): Json<MoveRequest>,
) -> Result<Json<JsonValue>, AppError> {
    let result = state.sessions.with_session(session_id, |session| {
        match session.submit_move(&body.from, &body.to, body.promotion) {
            Ok(outcome) => Ok(Ok(json!({
                "outcome": outcome,
                "session": session_view(session_id, session),
            }))),
            Err(e) => Ok(Err(e)),
        }
    })?;

    match result {
        Ok(view) => Ok(Json(view)),
        Err(e) => {
            discard_on_corruption(&state, session_id, &e);
            Err(e.into())
        }
    }
}

/// POST /api/sessions/{session_id}/reveal
pub async fn reveal_solution(
    Extension(state): Extension<AppState>,
    Path(session_id): Path<SessionId>,
) -> Result<Json<JsonValue>, AppError> {
    let result = state.sessions.with_session(session_id, |session| {
        Ok(session.reveal_solution().map(|moves| {
            json!({
                "moves": moves,
                "session": session_view(session_id, session),
            })
        }))
    })?;

    match result {
        Ok(view) => Ok(Json(view)),
        Err(e) => {
            discard_on_corruption(&state, session_id, &e);
            Err(e.into())
        }
    }
}

/// POST /api/sessions/{session_id}/restart
pub async fn restart_session(
    Extension(state): Extension<AppState>,
    Path(session_id): Path<SessionId>,
) -> Result<Json<JsonValue>, AppError> {
    let view = state.sessions.with_session(session_id, |session| {
        session.restart();
        Ok(session_view(session_id, session))
    })?;
    Ok(Json(view))
}

/// DELETE /api/sessions/{session_id}
///
/// Returns the terminal attempt so the caller can feed it to the rating update.
pub async fn close_session(
    Extension(state): Extension<AppState>,
    Path(session_id): Path<SessionId>,
) -> Result<Json<JsonValue>, AppError> {
    let session = state
        .sessions
        .remove(session_id)?
        .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))?;

    tracing::info!(session_id, state = ?session.state(), "Session closed");
    Ok(Json(json!({ "attempt": session.attempt() })))
}
