//! Integration tests for the ForAll Herbals storefront API.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and apply migrations
//! cargo run -p forall-herbals-cli -- migrate
//!
//! # Start the storefront
//! cargo run -p forall-herbals-storefront
//!
//! # Run the ignored HTTP tests against it
//! cargo test -p forall-herbals-integration-tests -- --ignored
//! ```
//!
//! `STOREFRONT_BASE_URL` overrides the default `http://localhost:3000`.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

/// Base URL for the storefront API (configurable via environment).
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL")
        .unwrap_or_else(|_| "http://localhost:3000".to_string())
        .trim_end_matches('/')
        .to_string()
}

/// Absolute URL for an API path such as `/products`.
#[must_use]
pub fn url(path: &str) -> String {
    format!("{}{path}", storefront_base_url())
}

/// HTTP client with a short timeout.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .expect("Failed to create HTTP client")
}

/// A unique address so repeated runs do not collide.
#[must_use]
pub fn unique_email(tag: &str) -> String {
    format!("it-{tag}-{}@example.com", uuid::Uuid::new_v4().simple())
}

/// The `error` message of an error body, if any.
#[must_use]
pub fn error_message(body: &Value) -> Option<&str> {
    body.get("error").and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_unique_email_is_valid() {
        let email = unique_email("newsletter");
        assert!(forall_herbals_core::Email::parse(&email).is_ok(), "{email}");
        assert_ne!(email, unique_email("newsletter"));
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            error_message(&json!({ "error": "Product not found" })),
            Some("Product not found")
        );
        assert_eq!(error_message(&json!({ "products": [] })), None);
    }
}
