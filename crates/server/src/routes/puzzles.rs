use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use chess_puzzler::selector::DEFAULT_RATING_RANGE;
use chess_puzzler::{LengthCategory, SelectionFilters, Selector, ThemeMatch, Tier};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

use crate::error::AppError;
use crate::state::AppState;

/// Largest batch one request may ask for.
pub const MAX_BATCH: usize = 50;

/// Selection filters as query parameters. List values are comma-separated.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterQuery {
    pub rating: Option<i32>,
    pub range: Option<i32>,
    pub themes: Option<String>,
    #[serde(rename = "match")]
    pub theme_match: Option<ThemeMatch>,
    pub tier: Option<String>,
    pub length: Option<String>,
    pub exclude: Option<String>,
    pub previous: Option<String>,
}

impl FilterQuery {
    pub fn to_filters(&self, default_range: i32) -> Result<SelectionFilters, AppError> {
        let mut filters = SelectionFilters {
            rating_center: self.rating,
            rating_range: self.range.unwrap_or(default_range),
            theme_match: self.theme_match.unwrap_or_default(),
            previous: self.previous.clone().filter(|p| !p.is_empty()),
            ..Default::default()
        };
        if filters.rating_range < 0 {
            return Err(AppError::BadRequest("range must not be negative".to_string()));
        }

        filters.themes = split_list(self.themes.as_deref());
        filters.exclude = split_list(self.exclude.as_deref()).into_iter().collect();

        if let Some(tier) = self.tier.as_deref().filter(|t| !t.is_empty()) {
            filters.difficulty_tier = Some(tier.parse::<Tier>().map_err(AppError::BadRequest)?);
        }
        if let Some(length) = self.length.as_deref().filter(|l| !l.is_empty()) {
            filters.length_category = Some(length.parse::<LengthCategory>().map_err(AppError::BadRequest)?);
        }

        Ok(filters)
    }
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub(crate) fn default_range(state: &AppState) -> i32 {
    if state.config.rating_range >= 0 {
        state.config.rating_range
    } else {
        DEFAULT_RATING_RANGE
    }
}

/// GET /api/puzzles/select?rating=1500&themes=fork,pin&match=any
pub async fn select_puzzle(
    Extension(state): Extension<AppState>,
    Query(params): Query<FilterQuery>,
) -> Result<Json<JsonValue>, AppError> {
    let filters = params.to_filters(default_range(&state))?;
    let selection = Selector::new(&state.index).select(&filters)?;

    Ok(Json(json!({
        "puzzle": selection.puzzle.as_ref(),
        "matchKind": selection.match_kind,
    })))
}

#[derive(Debug, Deserialize)]
pub struct BatchSize {
    pub n: Option<usize>,
}

/// GET /api/puzzles/batch?n=10&tier=advanced
pub async fn select_batch(
    Extension(state): Extension<AppState>,
    Query(size): Query<BatchSize>,
    Query(params): Query<FilterQuery>,
) -> Result<Json<JsonValue>, AppError> {
    let n = size.n.unwrap_or(10);
    if n == 0 || n > MAX_BATCH {
        return Err(AppError::BadRequest(format!("n must be between 1 and {MAX_BATCH}")));
    }

    let filters = params.to_filters(default_range(&state))?;
    let puzzles = Selector::new(&state.index).select_batch(n, &filters);
    let total = puzzles.len();
    let puzzles: Vec<_> = puzzles.iter().map(|p| p.as_ref()).collect();

    Ok(Json(json!({
        "puzzles": puzzles,
        "total": total,
    })))
}

/// GET /api/puzzles/themes
pub async fn list_themes(Extension(state): Extension<AppState>) -> Json<JsonValue> {
    let themes: Vec<JsonValue> = state
        .index
        .theme_counts()
        .into_iter()
        .map(|(theme, count)| json!({ "theme": theme, "count": count }))
        .collect();

    Json(json!({ "themes": themes }))
}

/// GET /api/puzzles/{puzzle_id}
pub async fn get_puzzle(
    Extension(state): Extension<AppState>,
    Path(puzzle_id): Path<String>,
) -> Result<Json<JsonValue>, AppError> {
    let puzzle = state
        .index
        .get(&puzzle_id)
        .ok_or_else(|| AppError::NotFound(format!("Puzzle {puzzle_id} not found")))?;

    Ok(Json(json!({
        "puzzle": puzzle.as_ref(),
        "tier": puzzle.tier(),
        "length": puzzle.length_category(),
    })))
}
