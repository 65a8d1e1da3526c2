//! Sample data initialization.

use axum::{Json, extract::State};
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::Result;
use crate::seed::{self, SampleData};
use crate::state::AppState;

/// Load the bundled sample data if the catalog is empty. Safe to repeat.
#[instrument(skip(state))]
pub async fn init_data(State(state): State<AppState>) -> Result<Json<Value>> {
    let data = SampleData::bundled()?;
    let report = seed::initialize(state.pool(), &data).await?;

    if report.products_created > 0 {
        state.catalog().invalidate().await;
    }

    let message = if report.is_empty() {
        "Data already initialized"
    } else {
        "Sample data initialized successfully"
    };

    Ok(Json(json!({
        "message": message,
        "products_created": report.products_created,
        "testimonials_created": report.testimonials_created,
        "blog_posts_created": report.blog_posts_created,
    })))
}
