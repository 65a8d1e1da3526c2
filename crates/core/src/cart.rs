//! Shopping cart.
//!
//! A cart is a flat list of lines, at most one per product, plus a cached
//! total. Every mutation recomputes the total so the stored document never
//! disagrees with its lines. Guest carts (held by the browser) and server
//! carts (held per user) share this type; [`Cart::merge`] folds a guest cart
//! into the server cart when the shopper signs in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Product;
use crate::types::{Price, ProductId};

/// Errors from cart mutations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    /// Quantities added to a cart must be at least one.
    #[error("quantity must be a positive integer")]
    InvalidQuantity,

    /// A line quantity or the cart total no longer fits.
    #[error("cart quantity overflow for product {0}")]
    Overflow(ProductId),
}

/// One line of a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub image: String,
    pub quantity: u32,
}

impl CartItem {
    /// Build a line for `quantity` units of a catalog product.
    #[must_use]
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            image: product.primary_image().to_owned(),
            quantity,
        }
    }

    /// Price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Option<Price> {
        self.price.checked_times(self.quantity)
    }
}

/// A shopping cart.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub total: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Find the line for a product.
    #[must_use]
    pub fn item(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.product_id == product_id)
    }

    /// Add a line, summing into an existing line for the same product.
    ///
    /// An existing line keeps its name, price and image; only the quantity
    /// grows.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` for a zero quantity and
    /// `CartError::Overflow` if the line or total overflows. The cart is left
    /// unchanged on error.
    pub fn add(&mut self, item: CartItem) -> Result<(), CartError> {
        if item.quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        let mut next = self.items.clone();
        match next.iter_mut().find(|line| line.product_id == item.product_id) {
            Some(line) => {
                line.quantity = line
                    .quantity
                    .checked_add(item.quantity)
                    .ok_or_else(|| CartError::Overflow(item.product_id.clone()))?;
            }
            None => next.push(item),
        }

        self.commit(next)
    }

    /// Set the quantity of an existing line. Zero removes the line.
    ///
    /// Unknown products are ignored.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Overflow` if the new total overflows.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            self.remove(product_id);
            return Ok(());
        }

        let mut next = self.items.clone();
        if let Some(line) = next.iter_mut().find(|line| &line.product_id == product_id) {
            line.quantity = quantity;
        }
        self.commit(next)
    }

    /// Remove the line for a product, if present.
    pub fn remove(&mut self, product_id: &ProductId) {
        self.items.retain(|line| &line.product_id != product_id);
        // Removing lines can only shrink a total that already fit.
        self.total = Self::sum(&self.items).unwrap_or(Price::ZERO);
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
        self.total = Price::ZERO;
    }

    /// Fold a guest cart into this cart.
    ///
    /// Quantities are summed by product id; guest lines for products not yet
    /// in this cart are appended in guest order.
    ///
    /// # Errors
    ///
    /// Returns the first `CartError` hit; the cart is left unchanged on error.
    pub fn merge(&mut self, guest: Self) -> Result<(), CartError> {
        let mut merged = self.clone();
        for item in guest.items {
            merged.add(item)?;
        }
        *self = merged;
        Ok(())
    }

    /// Recompute the cached total from the lines.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Overflow` if the total does not fit.
    pub fn recalculate(&mut self) -> Result<(), CartError> {
        self.total = Self::sum(&self.items)?;
        Ok(())
    }

    /// Stamp the cart as modified.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(now);
    }

    fn commit(&mut self, items: Vec<CartItem>) -> Result<(), CartError> {
        let total = Self::sum(&items)?;
        self.items = items;
        self.total = total;
        Ok(())
    }

    fn sum(items: &[CartItem]) -> Result<Price, CartError> {
        items.iter().try_fold(Price::ZERO, |acc, item| {
            item.line_total()
                .and_then(|line| acc.checked_add(line))
                .ok_or_else(|| CartError::Overflow(item.product_id.clone()))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn item(id: &str, dollars: u32, quantity: u32) -> CartItem {
        CartItem {
            product_id: ProductId::parse(id).unwrap(),
            name: format!("{id} name"),
            price: Price::from_dollars(dollars),
            image: String::new(),
            quantity,
        }
    }

    fn pid(id: &str) -> ProductId {
        ProductId::parse(id).unwrap()
    }

    #[test]
    fn test_adding_same_product_n_times_totals_price_times_n() {
        let mut cart = Cart::empty();
        for _ in 0..7 {
            cart.add(item("night-cream", 65, 1)).unwrap();
        }
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 7);
        assert_eq!(cart.total, Price::from_dollars(65 * 7));
        assert_eq!(cart.item_count(), 7);
    }

    #[test]
    fn test_existing_line_keeps_its_price() {
        let mut cart = Cart::empty();
        cart.add(item("eye-cream", 45, 1)).unwrap();
        cart.add(item("eye-cream", 99, 2)).unwrap();
        assert_eq!(cart.items[0].price, Price::from_dollars(45));
        assert_eq!(cart.total, Price::from_dollars(135));
    }

    #[test]
    fn test_add_rejects_zero_quantity() {
        let mut cart = Cart::empty();
        assert_eq!(
            cart.add(item("eye-cream", 45, 0)),
            Err(CartError::InvalidQuantity)
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_overflow_leaves_cart_unchanged() {
        let mut cart = Cart::empty();
        cart.add(item("oil", 1, u32::MAX)).unwrap();
        let before = cart.clone();
        assert!(matches!(
            cart.add(item("oil", 1, 1)),
            Err(CartError::Overflow(_))
        ));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_set_quantity_and_remove() {
        let mut cart = Cart::empty();
        cart.add(item("serum", 89, 1)).unwrap();
        cart.add(item("oil", 75, 1)).unwrap();

        cart.set_quantity(&pid("serum"), 3).unwrap();
        assert_eq!(cart.total, Price::from_dollars(89 * 3 + 75));

        cart.set_quantity(&pid("unknown"), 5).unwrap();
        assert_eq!(cart.items.len(), 2);

        cart.set_quantity(&pid("oil"), 0).unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.total, Price::from_dollars(89 * 3));

        cart.remove(&pid("serum"));
        assert!(cart.is_empty());
        assert_eq!(cart.total, Price::ZERO);
    }

    #[test]
    fn test_merge_sums_by_product_id() {
        let mut server = Cart::empty();
        server.add(item("serum", 89, 1)).unwrap();
        server.add(item("oil", 75, 2)).unwrap();

        let mut guest = Cart::empty();
        guest.add(item("oil", 75, 1)).unwrap();
        guest.add(item("eye-cream", 45, 2)).unwrap();

        server.merge(guest).unwrap();

        let lines: Vec<(&str, u32)> = server
            .items
            .iter()
            .map(|i| (i.product_id.as_str(), i.quantity))
            .collect();
        assert_eq!(lines, [("serum", 1), ("oil", 3), ("eye-cream", 2)]);
        assert_eq!(server.total, Price::from_dollars(89 + 75 * 3 + 45 * 2));
    }

    #[test]
    fn test_merge_into_empty_cart() {
        let mut guest = Cart::empty();
        guest.add(item("serum", 89, 2)).unwrap();

        let mut server = Cart::empty();
        server.merge(guest.clone()).unwrap();
        assert_eq!(server.items, guest.items);
        assert_eq!(server.total, guest.total);
    }

    #[test]
    fn test_recalculate_repairs_stale_total() {
        let mut cart: Cart = serde_json::from_value(serde_json::json!({
            "items": [
                {"productId": "serum", "name": "Serum", "price": 89, "image": "", "quantity": 2}
            ],
            "total": 1
        }))
        .unwrap();
        cart.recalculate().unwrap();
        assert_eq!(cart.total, Price::from_dollars(178));
    }

    #[test]
    fn test_wire_format_matches_ui() {
        let mut cart = Cart::empty();
        cart.add(item("serum", 89, 1)).unwrap();
        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(json["items"][0]["productId"], "serum");
        assert_eq!(json["total"], 89);
        assert!(json.get("updated_at").is_none());
    }

    #[test]
    fn test_fractional_prices_round_trip() {
        let cart: Cart = serde_json::from_value(serde_json::json!({
            "items": [
                {"productId": "eye-cream", "name": "Eye Cream", "price": 45.99, "quantity": 2},
                {"productId": "serum", "name": "Serum", "price": "89.50", "quantity": 1}
            ]
        }))
        .unwrap();
        let mut cart = cart;
        cart.recalculate().unwrap();
        assert_eq!(cart.total.to_string(), "$181.48");

        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(json["items"][0]["price"], 45.99);
        assert_eq!(json["items"][1]["price"], 89.5);
        assert_eq!(json["total"], 181.48);

        let back: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(back, cart);
    }
}
