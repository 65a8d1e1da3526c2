//! Server-side carts.
//!
//! Each signed-in user has one cart document at `cart:{user_id}`. Every
//! operation is a read-modify-write of that document with no locking; two
//! concurrent writes for the same user resolve as last writer wins.

use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use forall_herbals_core::{Cart, CartError, CartItem, ProductId, UserId};

use crate::db::{KvStore, RepositoryError, keys};
use crate::services::CatalogService;

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartServiceError {
    /// The product is not in the catalog.
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// The cart mutation was rejected.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Storage failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// One line of a browser-held guest cart.
///
/// Only the product and quantity are trusted; name, price and image are
/// re-read from the catalog.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestCartItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Cart operations for one request.
pub struct CartService<'a> {
    kv: KvStore<'a>,
    catalog: &'a CatalogService,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub const fn new(kv: KvStore<'a>, catalog: &'a CatalogService) -> Self {
        Self { kv, catalog }
    }

    /// The user's cart; an empty cart if none is stored.
    ///
    /// The total is recomputed from the stored lines.
    ///
    /// # Errors
    ///
    /// Returns `CartServiceError::Repository` if the read fails and
    /// `CartServiceError::Cart` if the stored lines overflow.
    pub async fn get(&self, user: UserId) -> Result<Cart, CartServiceError> {
        let mut cart = self
            .kv
            .get_json::<Cart>(&keys::cart(user))
            .await?
            .unwrap_or_default();
        cart.recalculate()?;
        Ok(cart)
    }

    /// Add `quantity` units of a catalog product.
    ///
    /// # Errors
    ///
    /// Returns `CartServiceError::ProductNotFound` for unknown products and
    /// `CartServiceError::Cart` for a zero quantity or overflow.
    #[instrument(skip(self), fields(user = %user, product = %product_id))]
    pub async fn add(
        &self,
        user: UserId,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Cart, CartServiceError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity.into());
        }

        let product = self
            .catalog
            .get_fresh(product_id)
            .await?
            .ok_or_else(|| CartServiceError::ProductNotFound(product_id.clone()))?;

        let mut cart = self.get(user).await?;
        cart.add(CartItem::from_product(&product, quantity))?;
        self.save(user, cart).await
    }

    /// Set a line's quantity; zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns `CartServiceError::Cart` on overflow.
    #[instrument(skip(self), fields(user = %user, product = %product_id))]
    pub async fn update(
        &self,
        user: UserId,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Cart, CartServiceError> {
        let mut cart = self.get(user).await?;
        cart.set_quantity(product_id, quantity)?;
        self.save(user, cart).await
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns `CartServiceError::Repository` if storage fails.
    #[instrument(skip(self), fields(user = %user, product = %product_id))]
    pub async fn remove(
        &self,
        user: UserId,
        product_id: &ProductId,
    ) -> Result<Cart, CartServiceError> {
        let mut cart = self.get(user).await?;
        cart.remove(product_id);
        self.save(user, cart).await
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartServiceError::Repository` if storage fails.
    #[instrument(skip(self), fields(user = %user))]
    pub async fn clear(&self, user: UserId) -> Result<Cart, CartServiceError> {
        let mut cart = self.get(user).await?;
        cart.clear();
        self.save(user, cart).await
    }

    /// Fold a guest cart into the user's cart.
    ///
    /// Guest lines are re-priced from the catalog; lines for unknown products
    /// or with a zero quantity are dropped.
    ///
    /// # Errors
    ///
    /// Returns `CartServiceError::Cart` on overflow; nothing is saved then.
    #[instrument(skip(self, guest), fields(user = %user, guest_lines = guest.len()))]
    pub async fn merge(
        &self,
        user: UserId,
        guest: Vec<GuestCartItem>,
    ) -> Result<Cart, CartServiceError> {
        let catalog = self.catalog.all().await?;

        let mut guest_cart = Cart::empty();
        for line in guest {
            if line.quantity == 0 {
                continue;
            }
            match catalog.iter().find(|p| p.id == line.product_id) {
                Some(product) => guest_cart.add(CartItem::from_product(product, line.quantity))?,
                None => tracing::debug!(product = %line.product_id, "Dropping unknown guest cart line"),
            }
        }

        let mut cart = self.get(user).await?;
        cart.merge(guest_cart)?;
        self.save(user, cart).await
    }

    async fn save(&self, user: UserId, mut cart: Cart) -> Result<Cart, CartServiceError> {
        cart.touch(Utc::now());
        self.kv.set_json(&keys::cart(user), &cart).await?;
        Ok(cart)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_guest_item_ignores_client_price() {
        let item: GuestCartItem = serde_json::from_value(serde_json::json!({
            "productId": "radiance-serum",
            "name": "Radiance Renewal Serum",
            "price": 0.01,
            "image": "https://example.com/a.jpg",
            "quantity": 2
        }))
        .unwrap();
        assert_eq!(item.product_id.as_str(), "radiance-serum");
        assert_eq!(item.quantity, 2);
    }

    #[test]
    fn test_guest_item_rejects_negative_quantity() {
        let result = serde_json::from_value::<GuestCartItem>(serde_json::json!({
            "productId": "radiance-serum",
            "quantity": -1
        }));
        assert!(result.is_err());
    }
}
