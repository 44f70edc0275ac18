use axum::{Extension, Json};
use serde_json::{json, Value as JsonValue};

use crate::state::AppState;

/// GET /health
pub async fn health_check(Extension(state): Extension<AppState>) -> Json<JsonValue> {
    Json(json!({
        "status": "ok",
        "puzzles": state.index.len(),
        "sessions": state.sessions.len(),
    }))
}
