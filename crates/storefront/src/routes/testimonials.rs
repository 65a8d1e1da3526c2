//! Testimonial handlers.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::{Value, json};
use tracing::instrument;

use forall_herbals_core::NewTestimonial;

use crate::db::TestimonialRepository;
use crate::error::Result;
use crate::middleware::RequireUser;
use crate::sanitize;
use crate::state::AppState;

/// All testimonials, newest first.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Value>> {
    let testimonials = TestimonialRepository::new(state.pool()).list().await?;
    Ok(Json(json!({ "testimonials": testimonials })))
}

/// Submit a testimonial. Requires a signed-in user.
#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    payload: std::result::Result<Json<NewTestimonial>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>)> {
    let Json(mut new) = payload?;
    new.name = sanitize::text(&new.name);
    new.location = sanitize::optional_text(new.location.as_deref());
    new.product = sanitize::optional_text(new.product.as_deref());
    new.validate()?;

    let testimonial = TestimonialRepository::new(state.pool())
        .create(&new)
        .await?;

    tracing::info!(testimonial_id = %testimonial.id, "Testimonial created");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "testimonial": testimonial })),
    ))
}
