//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Two limiters per client IP:
//! - `strict_rate_limiter`: signup, newsletter and data initialization (~10/min)
//! - `api_rate_limiter`: everything else (~60/min with a burst of 50)

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

// =============================================================================
// Client IP Key Extractor
// =============================================================================

/// Proxy headers consulted for the client IP, most trusted first.
const CLIENT_IP_HEADERS: [&str; 4] = [
    "cf-connecting-ip",
    "fly-client-ip",
    "x-real-ip",
    "x-forwarded-for",
];

/// Key extractor that reads the client IP from Cloudflare and Fly.io proxy
/// headers, falling back to the socket peer address.
#[derive(Debug, Clone, Copy)]
pub struct ClientIpKeyExtractor;

/// First parseable client IP from the proxy headers.
fn ip_from_headers(headers: &HeaderMap) -> Option<IpAddr> {
    CLIENT_IP_HEADERS.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|v| v.to_str().ok())
            // X-Forwarded-For is a chain; the first entry is the client
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
    })
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        ip_from_headers(req.headers())
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

// =============================================================================
// Rate Limiter Configuration
// =============================================================================

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

fn limiter(replenish_every: Duration, burst: u32) -> RateLimiterLayer {
    let mut builder = GovernorConfigBuilder::default().key_extractor(ClientIpKeyExtractor);
    builder.period(replenish_every).burst_size(burst);
    let config = builder
        .finish()
        .expect("rate limiter config with a non-zero period and burst is valid");
    GovernorLayer::new(Arc::new(config))
}

/// Strict limiter: 1 request every 6 seconds, burst of 5.
///
/// # Panics
///
/// Never; the period and burst are non-zero constants.
#[must_use]
pub fn strict_rate_limiter() -> RateLimiterLayer {
    limiter(Duration::from_secs(6), 5)
}

/// General API limiter: 1 request per second, burst of 50.
///
/// # Panics
///
/// Never; the period and burst are non-zero constants.
#[must_use]
pub fn api_rate_limiter() -> RateLimiterLayer {
    limiter(Duration::from_secs(1), 50)
}
