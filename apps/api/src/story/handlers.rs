//! Axum route handlers for the Story API.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::errors::AppError;
use crate::models::story::{Story, StoryRequest};
use crate::state::AppState;

/// POST /generate
///
/// Generates a complete story with text and illustrations. Always returns
/// every page with an `image_url`, even if some are placeholders.
pub async fn handle_generate(
    State(state): State<AppState>,
    request: Result<Json<StoryRequest>, JsonRejection>,
) -> Result<Json<Story>, AppError> {
    let Json(request) =
        request.map_err(|rejection| AppError::Validation(rejection.body_text()))?;

    let story = state.pipeline.generate(request).await?;

    Ok(Json(story))
}
