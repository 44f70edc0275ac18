use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingRequest {
    pub current_rating: i32,
    pub puzzle_rating: i32,
    pub solved: bool,
}

/// POST /api/rating
pub async fn update_rating(
    Extension(state): Extension<AppState>,
    Json(body): Json<RatingRequest>,
) -> Result<Json<JsonValue>, AppError> {
    if body.current_rating < 0 || body.puzzle_rating < 0 {
        return Err(AppError::BadRequest("Ratings must not be negative".to_string()));
    }

    let change = state
        .config
        .rating_policy
        .update(body.current_rating, body.puzzle_rating, body.solved);

    Ok(Json(json!(change)))
}
