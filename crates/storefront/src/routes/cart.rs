//! Cart handlers. Every route requires a bearer token.
//!
//! Each mutation answers `{message, cart}` with the cart as stored.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use forall_herbals_core::{Cart, ProductId};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequireUser;
use crate::sanitize;
use crate::services::{CartService, GuestCartItem};
use crate::state::AppState;

/// Body of add/update/remove requests.
///
/// Fields are loosely typed so that missing or out-of-range values produce
/// the same 400 messages the site already shows.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineRequest {
    pub product_id: Option<String>,
    pub quantity: Option<i64>,
}

impl CartLineRequest {
    fn product_id(&self) -> Result<ProductId> {
        let raw = self
            .product_id
            .as_deref()
            .map(sanitize::text)
            .unwrap_or_default();
        ProductId::parse(&raw).map_err(|_| AppError::BadRequest("Product ID is required".to_string()))
    }

    /// Quantity for an add: defaults to 1, must be positive.
    fn add_quantity(&self) -> Result<u32> {
        match self.quantity {
            None => Ok(1),
            Some(q) => u32::try_from(q)
                .ok()
                .filter(|q| *q > 0)
                .ok_or_else(invalid_quantity),
        }
    }

    /// Quantity for an update: required, zero allowed.
    fn update_quantity(&self) -> Result<u32> {
        self.quantity
            .and_then(|q| u32::try_from(q).ok())
            .ok_or_else(invalid_quantity)
    }
}

fn invalid_quantity() -> AppError {
    AppError::BadRequest("Quantity must be a positive integer".to_string())
}

/// Body of a merge request: the browser's guest cart.
#[derive(Debug, Deserialize)]
pub struct MergeRequest {
    #[serde(default)]
    pub items: Vec<GuestCartItem>,
}

fn cart_response(message: &str, cart: &Cart) -> Json<Value> {
    Json(json!({ "message": message, "cart": cart }))
}

fn service(state: &AppState) -> CartService<'_> {
    CartService::new(state.kv(), state.catalog())
}

/// The signed-in user's cart; empty when none is stored.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Value>> {
    let cart = service(&state).get(user.id).await?;
    Ok(Json(json!({ "cart": cart })))
}

/// Add a product.
#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    payload: std::result::Result<Json<CartLineRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(body) = payload?;
    let product_id = body.product_id()?;
    let quantity = body.add_quantity()?;

    let cart = service(&state).add(user.id, &product_id, quantity).await?;

    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("product_id", product_id.as_str())]),
    );

    Ok(cart_response("Product added to cart", &cart))
}

/// Set a line's quantity; zero removes it.
#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    payload: std::result::Result<Json<CartLineRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(body) = payload?;
    let product_id = body.product_id()?;
    let quantity = body.update_quantity()?;

    let cart = service(&state)
        .update(user.id, &product_id, quantity)
        .await?;

    Ok(cart_response("Cart updated", &cart))
}

/// Remove a line.
#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    payload: std::result::Result<Json<CartLineRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(body) = payload?;
    let product_id = body.product_id()?;

    let cart = service(&state).remove(user.id, &product_id).await?;

    Ok(cart_response("Product removed from cart", &cart))
}

/// Fold the browser's guest cart into the user's cart after sign-in.
#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn merge(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    payload: std::result::Result<Json<MergeRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(body) = payload?;

    let cart = service(&state).merge(user.id, body.items).await?;

    Ok(cart_response("Cart merged", &cart))
}

/// Empty the cart.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn clear(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Value>> {
    let cart = service(&state).clear(user.id).await?;
    Ok(cart_response("Cart cleared", &cart))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn body(value: Value) -> CartLineRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_product_id_required() {
        assert!(body(json!({})).product_id().is_err());
        assert!(body(json!({ "productId": "  <>  " })).product_id().is_err());
        assert_eq!(
            body(json!({ "productId": " eye-cream " }))
                .product_id()
                .unwrap()
                .as_str(),
            "eye-cream"
        );
    }

    #[test]
    fn test_add_quantity() {
        assert_eq!(body(json!({})).add_quantity().unwrap(), 1);
        assert_eq!(body(json!({ "quantity": 3 })).add_quantity().unwrap(), 3);
        assert!(body(json!({ "quantity": 0 })).add_quantity().is_err());
        assert!(body(json!({ "quantity": -2 })).add_quantity().is_err());
    }

    #[test]
    fn test_update_quantity() {
        assert_eq!(body(json!({ "quantity": 0 })).update_quantity().unwrap(), 0);
        assert!(body(json!({})).update_quantity().is_err());
        assert!(body(json!({ "quantity": -1 })).update_quantity().is_err());
    }
}
