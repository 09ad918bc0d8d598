//! CORS policy for cross-origin raw access.
//!
//! Note:
//! - CORS is enforced by browsers. Server-to-server calls are not restricted by it.
//! - Only the raw route gets this layer; everything else stays same-origin.
//!
//! Policy:
//! - Methods: GET and HEAD only.
//! - Origins: the configured allowlist (exact match) when non-empty, otherwise any.
//! - Never with credentials.

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::state::AppState;

pub fn raw_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = if allowed_origins.is_empty() {
        CorsLayer::new().allow_origin(Any)
    } else {
        let allowed: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        CorsLayer::new().allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _req| allowed.iter().any(|v| v == origin),
        ))
    };

    cors.allow_methods([Method::GET, Method::HEAD])
        .allow_headers([
            header::RANGE,
            HeaderName::from_static("od-protected-token"),
        ])
        .max_age(std::time::Duration::from_secs(60 * 10))
}

/// Apply the raw-content CORS policy to the given Router.
///
/// IMPORTANT:
/// - Do not combine wildcard origin (`Any`) with `allow_credentials(true)`.
pub fn apply(router: Router<AppState>, allowed_origins: &[String]) -> Router<AppState> {
    router.layer(raw_layer(allowed_origins))
}
