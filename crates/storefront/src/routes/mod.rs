//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health               - Liveness check
//! GET    /health/ready         - Readiness check (database)
//!
//! # Auth
//! POST   /auth/signup          - Create account and profile
//! GET    /auth/profile         - Current profile (bearer)
//! POST   /auth/profile         - Same as GET
//! PUT    /auth/profile         - Partial profile update (bearer)
//!
//! # Catalog
//! GET    /products             - Listing (category, search, page, limit)
//! GET    /products/{id}        - Product with related products
//!
//! # Cart (bearer)
//! GET    /cart                 - Current cart
//! DELETE /cart                 - Clear
//! POST   /cart/add             - Add product
//! POST   /cart/update          - Set quantity (0 removes)
//! POST   /cart/remove          - Remove product
//! POST   /cart/merge           - Fold guest cart in after sign-in
//!
//! # Content
//! POST   /newsletter/subscribe - Subscribe, returns discount code
//! GET    /testimonials         - Testimonials
//! POST   /testimonials         - Submit testimonial (bearer)
//! GET    /blog                 - Published posts
//! GET    /blog/{slug}          - One post
//!
//! # Setup
//! POST   /init-data            - Load sample data (idempotent)
//! ```

pub mod auth;
pub mod blog;
pub mod cart;
pub mod health;
pub mod newsletter;
pub mod products;
pub mod setup;
pub mod testimonials;

use axum::{
    Router,
    routing::{get, post},
};

use crate::config::StorefrontConfig;
use crate::middleware::{api_rate_limiter, strict_rate_limiter};
use crate::state::AppState;

/// Routes that create accounts or write shared data.
fn strict_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/newsletter/subscribe", post(newsletter::subscribe))
        .route("/init-data", post(setup::init_data))
}

/// Everything else behind the general API limiter.
fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/auth/profile",
            get(auth::profile)
                .post(auth::profile)
                .put(auth::update_profile),
        )
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/cart", get(cart::show).delete(cart::clear))
        .route("/cart/add", post(cart::add))
        .route("/cart/update", post(cart::update))
        .route("/cart/remove", post(cart::remove))
        .route("/cart/merge", post(cart::merge))
        .route(
            "/testimonials",
            get(testimonials::index).post(testimonials::create),
        )
        .route("/blog", get(blog::index))
        .route("/blog/{slug}", get(blog::show))
}

/// Create all routes for the storefront.
///
/// Rate limiters are attached per group when enabled in `config`.
pub fn routes(config: &StorefrontConfig) -> Router<AppState> {
    let (strict, api) = if config.rate_limit_enabled {
        (
            strict_routes().layer(strict_rate_limiter()),
            api_routes().layer(api_rate_limiter()),
        )
    } else {
        (strict_routes(), api_routes())
    };

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(strict)
        .merge(api)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
        response::Response,
    };
    use serde_json::{Value, json};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::config::test_config;

    /// Router over a pool that never connects; only paths that fail before
    /// touching the database may be exercised.
    fn app() -> Router {
        let config = test_config();
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://storefront@localhost:1/unused")
            .unwrap();
        let state = AppState::new(config.clone(), pool).unwrap();
        routes(&config).with_state(state)
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response: Response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_cart_requires_bearer_token() {
        for (method, uri) in [
            ("GET", "/cart"),
            ("DELETE", "/cart"),
            ("POST", "/cart/add"),
            ("POST", "/cart/merge"),
        ] {
            let (status, body) = send(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
            assert_eq!(body, json!({ "error": "Unauthorized" }));
        }
    }

    #[tokio::test]
    async fn test_profile_rejects_non_bearer_scheme() {
        let (status, _) = send(
            Request::builder()
                .uri("/auth/profile")
                .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_signup_missing_fields() {
        let (status, body) = send(post_json(
            "/auth/signup",
            &json!({ "email": "jess@example.com", "password": "secret1" }),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields");
    }

    #[tokio::test]
    async fn test_signup_weak_password() {
        let (status, body) = send(post_json(
            "/auth/signup",
            &json!({ "email": "jess@example.com", "password": "123", "name": "Jess" }),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("at least 6"));
    }

    #[tokio::test]
    async fn test_signup_invalid_email() {
        let (status, body) = send(post_json(
            "/auth/signup",
            &json!({ "email": "not-an-email", "password": "secret1", "name": "Jess" }),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid email address");
    }

    #[tokio::test]
    async fn test_newsletter_requires_email() {
        let (status, body) = send(post_json("/newsletter/subscribe", &json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Email is required");

        let (status, body) =
            send(post_json("/newsletter/subscribe", &json!({ "email": "nope" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid email address");
    }

    #[tokio::test]
    async fn test_malformed_json_is_json_error() {
        let (status, body) = send(
            Request::builder()
                .method("POST")
                .uri("/newsletter/subscribe")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_invalid_listing_query() {
        let (status, body) = send(
            Request::builder()
                .uri("/products?page=-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_malformed_slug_is_not_found() {
        let (status, body) = send(
            Request::builder()
                .uri("/blog/Not_A_Slug")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Post not found");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (status, _) = send(
            Request::builder()
                .uri("/checkout")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
