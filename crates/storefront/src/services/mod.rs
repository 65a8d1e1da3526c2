//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Hosted auth provider client (signup, bearer token lookup)
//! - `catalog` - Cached product catalog
//! - `cart` - Per-user carts and the guest cart merge
//! - `profile` - User profiles
//! - `newsletter` - Newsletter signups and welcome codes
//!
//! Request-scoped services borrow a [`KvStore`](crate::db::KvStore) the same
//! way repositories borrow the pool.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod newsletter;
pub mod profile;

pub use auth::{AuthClient, AuthError, AuthUser};
pub use cart::{CartService, CartServiceError, GuestCartItem};
pub use catalog::{CatalogService, ProductDetail};
pub use newsletter::{NewsletterService, SubscribeOutcome};
pub use profile::ProfileService;
