/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /health, /config, /tokens, /raw
 * - CORS は /raw にだけ掛ける (他は同一 origin 前提)
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::config::Config;
use crate::middleware::cors;
use crate::state::AppState;

use crate::api::v1::handlers::{
    health::health,
    raw::raw,
    site_config::site_config,
    tokens::{store_tokens, token_status},
};

pub fn routes(config: &Config) -> Router<AppState> {
    let raw_routes = cors::apply(
        Router::new().route("/raw", get(raw)),
        &config.cors_allowed_origins,
    );

    Router::new()
        .route("/health", get(health))
        .route("/config", get(site_config))
        .route("/tokens", post(store_tokens))
        .route("/tokens/status", get(token_status))
        .merge(raw_routes)
}
