/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body `{"error": ...}`)
 * - credential / upstream / path error を統一的に変換
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::services::credentials::CredentialError;
use crate::services::drive::{UpstreamError, path::PathError};
use crate::services::protected::AuthDecision;

pub const INTERNAL_MESSAGE: &str = "Internal server error.";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("No access token.")]
    NoAccessToken,
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    // Upstream status and body, passed through as-is.
    #[error("upstream request failed ({status})")]
    Upstream {
        status: StatusCode,
        body: serde_json::Value,
    },
    #[error("Internal server error.")]
    Internal,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Map a refused protected-route decision onto the error taxonomy.
    pub fn from_denied(decision: AuthDecision) -> Self {
        match decision.status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized(decision.message),
            StatusCode::FORBIDDEN => Self::Forbidden(decision.message),
            StatusCode::NOT_FOUND => Self::NotFound(decision.message),
            status => Self::Upstream {
                status,
                body: json!(decision.message),
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NoAccessToken => StatusCode::FORBIDDEN,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Upstream { status, .. } => *status,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            AppError::Upstream { body, .. } => body,
            other => json!(other.to_string()),
        };

        (status, Json(json!({ "error": error }))).into_response()
    }
}

impl From<PathError> for AppError {
    fn from(e: PathError) -> Self {
        AppError::bad_request(e.to_string())
    }
}

impl From<CredentialError> for AppError {
    fn from(e: CredentialError) -> Self {
        // Store outage is a hard failure, never "no credential".
        tracing::error!(error = %e, "credential store failure");
        AppError::Internal
    }
}

impl From<UpstreamError> for AppError {
    fn from(e: UpstreamError) -> Self {
        let status = e
            .status
            .and_then(|s| StatusCode::from_u16(s).ok())
            .filter(|s| s.is_client_error() || s.is_server_error())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = e.body.unwrap_or_else(|| json!(INTERNAL_MESSAGE));

        AppError::Upstream { status, body }
    }
}
