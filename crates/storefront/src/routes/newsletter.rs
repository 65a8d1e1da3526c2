//! Newsletter signup handler.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use forall_herbals_core::Email;

use crate::error::{AppError, Result};
use crate::sanitize;
use crate::services::NewsletterService;
use crate::state::AppState;

/// Newsletter signup body.
#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    #[serde(default)]
    pub email: String,
}

/// Subscribe an email and hand back its welcome discount code.
#[instrument(skip(state, payload))]
pub async fn subscribe(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SubscribeRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(body) = payload?;

    let raw = sanitize::text(&body.email);
    if raw.is_empty() {
        return Err(AppError::BadRequest("Email is required".to_string()));
    }
    let email =
        Email::parse(&raw).map_err(|_| AppError::BadRequest("Invalid email address".to_string()))?;

    let outcome = NewsletterService::new(state.kv()).subscribe(email).await?;

    let message = if outcome.already_subscribed {
        "Email already subscribed"
    } else {
        "Successfully subscribed to newsletter"
    };

    Ok(Json(json!({
        "message": message,
        "discount_code": outcome.discount_code,
        "already_subscribed": outcome.already_subscribed,
    })))
}
