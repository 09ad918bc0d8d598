//! Security-related response headers for browser clients.
//!
//! Applied at the Router level (not inside individual handlers).
//!
//! Responsibility:
//! - MIME sniffing protection (raw bytes must be taken at their content-type)
//! - Referrer leakage control (`odpt` tokens live in raw URLs)
//! - Browser feature restrictions
//!
//! No frame restrictions: raw content is embedded by previews (PDF, office viewers).

use axum::Router;
use axum::http::header::{HeaderName, HeaderValue};
use tower_http::set_header::SetResponseHeaderLayer;

/// Apply common security headers to all responses (only where not already set).
pub fn apply(router: Router) -> Router {
    router
        // Prevent MIME sniffing
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        // Do not leak request URLs (and their protection tokens) to redirect targets
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("no-referrer"),
        ))
        // Disable powerful browser features by default
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("permissions-policy"),
            HeaderValue::from_static("camera=(), microphone=(), geolocation=()"),
        ))
}
