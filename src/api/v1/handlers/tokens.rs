/*
 * Responsibility
 * - POST /tokens: OAuth 同意フローで得た token を保存 (未登録の identity のみ)
 * - GET /tokens/status: token の有無だけ返す (値は返さない)
 */
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};

use crate::{
    api::v1::dto::tokens::{
        StoreTokensRequest, StoreTokensResponse, TokenStatusQuery, TokenStatusResponse,
    },
    error::AppError,
    services::credentials::CredentialWrite,
    state::AppState,
};

pub async fn store_tokens(
    State(state): State<AppState>,
    Json(req): Json<StoreTokensRequest>,
) -> Result<(StatusCode, Json<StoreTokensResponse>), AppError> {
    req.validate().map_err(AppError::bad_request)?;
    state.gateway.ensure_known_user(&req.user)?;

    // Replacing live tokens goes through a fresh consent, not this endpoint.
    if state.credentials.exists(&req.user).await? {
        return Err(AppError::conflict("Tokens already stored."));
    }

    state
        .credentials
        .put(
            &req.user,
            CredentialWrite {
                access_token: req.access_token,
                access_token_ttl_seconds: req.access_token_expiry,
                refresh_token: Some(req.refresh_token),
            },
        )
        .await?;

    tracing::info!(user = %req.user, "stored tokens");

    Ok((
        StatusCode::CREATED,
        Json(StoreTokensResponse { user: req.user }),
    ))
}

pub async fn token_status(
    State(state): State<AppState>,
    Query(query): Query<TokenStatusQuery>,
) -> Result<Json<TokenStatusResponse>, AppError> {
    state.gateway.ensure_known_user(&query.user)?;
    let has_tokens = state.credentials.exists(&query.user).await?;

    Ok(Json(TokenStatusResponse {
        user: query.user,
        has_tokens,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{Router, body::Body, http::Request, response::Response};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::app::build_router;
    use crate::config::Config;
    use crate::services::cache::MemoryCacheClient;
    use crate::services::credentials::{CredentialStore, KvCredentialStore};

    use super::*;

    fn setup(user_list: &[&str]) -> (Router, Arc<KvCredentialStore<MemoryCacheClient>>) {
        let mut config = Config::for_tests("http://127.0.0.1:9");
        config.user_list = user_list.iter().map(|u| u.to_string()).collect();

        let store = Arc::new(KvCredentialStore::new_with_cache(
            Arc::new(MemoryCacheClient::new()),
            "",
        ));
        let state = AppState::build(&config, store.clone()).unwrap();
        (build_router(state, &config), store)
    }

    async fn post_tokens(router: &Router, body: Value) -> Response {
        router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/tokens")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn get(router: &Router, uri: &str) -> Response {
        router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn json_body(resp: Response) -> Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn first_store_is_created_then_conflicts() {
        let (router, store) = setup(&[]);

        let created = post_tokens(
            &router,
            json!({"accessToken": "at", "accessTokenExpiry": 3600, "refreshToken": "rt"}),
        )
        .await;
        assert_eq!(created.status(), StatusCode::CREATED);
        assert_eq!(json_body(created).await, json!({"user": ""}));

        let stored = store.get("").await.unwrap();
        assert_eq!(stored.access_token.as_deref(), Some("at"));
        assert_eq!(stored.refresh_token.as_deref(), Some("rt"));

        let again = post_tokens(&router, json!({"refreshToken": "other"})).await;
        assert_eq!(again.status(), StatusCode::CONFLICT);
        assert_eq!(
            store.get("").await.unwrap().refresh_token.as_deref(),
            Some("rt")
        );
    }

    #[tokio::test]
    async fn blank_refresh_token_is_bad_request() {
        let (router, store) = setup(&[]);

        let resp = post_tokens(&router, json!({"refreshToken": ""})).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(!store.exists("").await.unwrap());
    }

    #[tokio::test]
    async fn unknown_user_cannot_store_tokens() {
        let (router, _store) = setup(&["alice"]);

        let resp = post_tokens(&router, json!({"refreshToken": "rt", "user": "bob"})).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let ok = post_tokens(&router, json!({"refreshToken": "rt", "user": "alice"})).await;
        assert_eq!(ok.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn status_reports_presence_only() {
        let (router, _store) = setup(&["alice"]);

        let before = get(&router, "/api/v1/tokens/status?user=alice").await;
        assert_eq!(
            json_body(before).await,
            json!({"user": "alice", "hasTokens": false})
        );

        post_tokens(&router, json!({"refreshToken": "rt", "user": "alice"})).await;

        let after = get(&router, "/api/v1/tokens/status?user=alice").await;
        assert_eq!(after.status(), StatusCode::OK);
        assert_eq!(
            json_body(after).await,
            json!({"user": "alice", "hasTokens": true})
        );
    }

    #[tokio::test]
    async fn config_exposes_public_fields_only() {
        let (router, _store) = setup(&["alice", "bob"]);

        let resp = get(&router, "/api/v1/config").await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(
            body,
            json!({
                "clientId": "client-id",
                "userPrincipalName": "owner@example.com",
                "baseDirectory": "/",
                "userList": ["alice", "bob"]
            })
        );
        assert!(!body.to_string().contains("client-secret"));
    }

    #[tokio::test]
    async fn health_endpoints_respond() {
        let (router, _store) = setup(&[]);

        assert_eq!(get(&router, "/health").await.status(), StatusCode::OK);
        let v1 = get(&router, "/api/v1/health").await;
        assert_eq!(v1.status(), StatusCode::OK);
        assert_eq!(json_body(v1).await, json!({"status": "ok"}));
    }
}
