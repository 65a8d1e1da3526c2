//! Blog handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};
use tracing::instrument;

use crate::db::BlogRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Published posts, newest first.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Value>> {
    let posts = BlogRepository::new(state.pool()).list_published().await?;
    Ok(Json(json!({ "posts": posts })))
}

/// A published post by slug.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(slug): Path<String>) -> Result<Json<Value>> {
    let not_found = || AppError::NotFound("Post not found".to_string());
    if !forall_herbals_core::content::is_valid_slug(&slug) {
        return Err(not_found());
    }

    let post = BlogRepository::new(state.pool())
        .get_by_slug(&slug)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(json!({ "post": post })))
}
