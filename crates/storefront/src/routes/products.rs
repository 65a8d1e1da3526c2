//! Product catalog handlers.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use serde_json::{Value, json};
use tracing::instrument;

use forall_herbals_core::{ProductId, ProductPage, ProductQuery};

use crate::error::{AppError, Result};
use crate::sanitize;
use crate::state::AppState;

/// Filtered, sorted, paginated listing.
///
/// Query parameters: `category`, `search`, `page`, `limit`.
#[instrument(skip(state, query))]
pub async fn index(
    State(state): State<AppState>,
    query: std::result::Result<Query<ProductQuery>, QueryRejection>,
) -> Result<Json<ProductPage>> {
    let Query(query) = query?;
    let page = state.catalog().list(&query).await?;
    Ok(Json(page))
}

/// One product plus up to four related products.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>> {
    let not_found = || AppError::NotFound("Product not found".to_string());
    let id = ProductId::parse(&sanitize::text(&id)).map_err(|_| not_found())?;

    let detail = state.catalog().detail(&id).await?.ok_or_else(not_found)?;

    Ok(Json(json!({
        "product": detail.product,
        "relatedProducts": detail.related,
    })))
}
