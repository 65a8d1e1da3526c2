//! Signup and profile handlers.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;

use forall_herbals_core::{Email, ProfileUpdate, UserId, UserProfile};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequireUser;
use crate::sanitize;
use crate::services::ProfileService;
use crate::services::auth::Signup;
use crate::state::AppState;

/// Signup request body.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
}

/// The created user as returned to the site.
#[derive(Debug, Serialize)]
pub struct SignupUser {
    pub id: UserId,
    pub email: Email,
    pub name: String,
}

/// Create an account with the auth provider and an empty profile.
#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SignupRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(body) = payload?;

    let email = sanitize::text(&body.email);
    let name = sanitize::text(&body.name);
    if email.is_empty() || body.password.is_empty() || name.is_empty() {
        return Err(AppError::BadRequest("Missing required fields".to_string()));
    }

    let signup = Signup::parse(&email, &body.password, &name)?;
    let user = state.auth().create_user(&signup).await?;

    let profile = ProfileService::new(state.kv())
        .create(user.id, user.email.clone(), signup.name)
        .await?;

    tracing::info!(user_id = %user.id, "User signed up");

    Ok(Json(json!({
        "message": "User created successfully",
        "user": SignupUser {
            id: profile.id,
            email: profile.email,
            name: profile.name,
        },
    })))
}

/// The signed-in user's profile.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn profile(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Value>> {
    let profile: UserProfile = ProfileService::new(state.kv())
        .get(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    Ok(Json(json!({ "profile": profile })))
}

/// Apply a partial profile update.
#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    payload: std::result::Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(mut update) = payload?;
    update.name = update.name.as_deref().map(sanitize::text);

    let profile = ProfileService::new(state.kv())
        .update(user.id, update)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound("Profile not found".to_string())
            }
            other => other.into(),
        })?;

    add_breadcrumb("profile", "Updated profile", None);

    Ok(Json(json!({
        "message": "Profile updated successfully",
        "profile": profile,
    })))
}
