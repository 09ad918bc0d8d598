/*
 * Responsibility
 * - GET /health (疎通用)
 * - /api/v1 配下の疎通確認 (root の /health は plain text)
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}
