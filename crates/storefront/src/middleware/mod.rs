//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span with status and latency)
//! 3. Request ID (recorded in the span and Sentry scope)
//! 4. CORS
//! 5. Security headers
//! 6. Rate limiting (per route group, optional)
//!
//! Authentication is an extractor ([`RequireUser`]), not a layer.

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;

pub use auth::{RequireUser, bearer_token};
pub use rate_limit::{api_rate_limiter, strict_rate_limiter};
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
pub use security_headers::security_headers_middleware;
