//! Key layout of the KV store.
//!
//! ```text
//! product:{product_id}     Product
//! cart:{user_id}           Cart
//! user_profile:{user_id}   UserProfile
//! newsletter:{email}       NewsletterSubscription
//! newsletter_stats         NewsletterStats
//! ```

use forall_herbals_core::{Email, ProductId, UserId};

/// Prefix shared by every product document.
pub const PRODUCT_PREFIX: &str = "product:";

/// Key of the newsletter counters document.
pub const NEWSLETTER_STATS: &str = "newsletter_stats";

#[must_use]
pub fn product(id: &ProductId) -> String {
    format!("{PRODUCT_PREFIX}{id}")
}

#[must_use]
pub fn cart(user_id: UserId) -> String {
    format!("cart:{user_id}")
}

#[must_use]
pub fn profile(user_id: UserId) -> String {
    format!("user_profile:{user_id}")
}

#[must_use]
pub fn newsletter(email: &Email) -> String {
    format!("newsletter:{email}")
}
