/*
 * Responsibility
 * - GET /raw (HEAD も axum が処理)
 * - RawParams extractor → RawGateway → HTTP response 変換
 * - proxy: upstream body を chunk 単位でそのまま流す (全体を buffer しない)
 * - redirect: Location + Cache-Control
 */
use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, StatusCode, header},
    response::Response,
};
use futures::StreamExt;

use crate::api::v1::extractors::RawParams;
use crate::error::AppError;
use crate::services::raw_gateway::RawOutcome;
use crate::state::AppState;

/// Upstream headers worth keeping on a proxied body.
const FORWARDED_HEADERS: [HeaderName; 6] = [
    header::CONTENT_TYPE,
    header::CONTENT_LENGTH,
    header::CONTENT_DISPOSITION,
    header::ETAG,
    header::LAST_MODIFIED,
    header::ACCEPT_RANGES,
];

pub async fn raw(
    State(state): State<AppState>,
    RawParams(req): RawParams,
) -> Result<Response, AppError> {
    let outcome = state.gateway.handle(req).await?;
    outcome_response(outcome)
}

fn outcome_response(outcome: RawOutcome) -> Result<Response, AppError> {
    let response = match outcome {
        RawOutcome::Proxy {
            upstream,
            cache_control,
        } => {
            let mut builder = Response::builder().status(StatusCode::OK);
            for name in FORWARDED_HEADERS {
                if let Some(value) = upstream.headers().get(&name) {
                    builder = builder.header(name, value.clone());
                }
            }

            // Once bytes flow, a failure can only cut the stream; no error body follows.
            let stream = upstream
                .bytes_stream()
                .map(|chunk| chunk.map_err(std::io::Error::other));

            builder
                .header(header::CACHE_CONTROL, cache_control)
                .body(Body::from_stream(stream))
        }
        RawOutcome::Redirect {
            status,
            location,
            cache_control,
        } => Response::builder()
            .status(status)
            .header(header::LOCATION, location)
            .header(header::CACHE_CONTROL, cache_control)
            .body(Body::empty()),
    };

    response.map_err(|e| {
        tracing::error!(error = %e, "failed to build raw response");
        AppError::Internal
    })
}
