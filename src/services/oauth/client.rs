use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("token endpoint unreachable: {0}")]
    Network(String),

    #[error("token endpoint rejected refresh ({status})")]
    Rejected { status: u16, body: String },

    #[error("invalid token response: {0}")]
    InvalidResponse(String),
}

/// Token pair returned by a successful refresh.
#[derive(Clone)]
pub struct RefreshedTokens {
    pub access_token: String,
    pub expires_in: u64,
    // Some providers omit it when the refresh token is not rotated.
    pub refresh_token: Option<String>,
}

impl std::fmt::Debug for RefreshedTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshedTokens")
            .field("expires_in", &self.expires_in)
            .field("rotated", &self.refresh_token.is_some())
            .finish()
    }
}

/// Exchanges a refresh token for a new access token.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshedTokens, OAuthError>;
}

#[derive(Deserialize)]
struct TokenEndpointResponse {
    access_token: String,
    expires_in: u64,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// OAuth 2.0 token endpoint client (Microsoft identity platform by default).
///
/// - Sends `grant_type=refresh_token` as a form post with the app credentials.
/// - Never retries. One call per refresh.
#[derive(Clone)]
pub struct OAuthClient {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl std::fmt::Debug for OAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print the client secret
        f.debug_struct("OAuthClient")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .finish()
    }
}

impl OAuthClient {
    pub fn new(
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, OAuthError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OAuthError::Network(e.to_string()))?;

        Ok(Self {
            http,
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
        })
    }
}

#[async_trait]
impl TokenRefresher for OAuthClient {
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshedTokens, OAuthError> {
        let form = [
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .http
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| OAuthError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "token refresh rejected");
            return Err(OAuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TokenEndpointResponse = response
            .json()
            .await
            .map_err(|e| OAuthError::InvalidResponse(e.to_string()))?;

        if parsed.access_token.is_empty() {
            return Err(OAuthError::InvalidResponse("empty access_token".into()));
        }

        Ok(RefreshedTokens {
            access_token: parsed.access_token,
            expires_in: parsed.expires_in,
            refresh_token: parsed.refresh_token.filter(|t| !t.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> OAuthClient {
        OAuthClient::new(
            format!("{}/oauth2/v2.0/token", server.uri()),
            "client-id",
            "client-secret",
            "http://localhost",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn refresh_posts_form_and_parses_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth2/v2.0/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=old-rt"))
            .and(body_string_contains("client_id=client-id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token_type": "Bearer",
                "access_token": "new-at",
                "expires_in": 3599,
                "refresh_token": "new-rt"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tokens = client(&server).refresh("old-rt").await.unwrap();

        assert_eq!(tokens.access_token, "new-at");
        assert_eq!(tokens.expires_in, 3599);
        assert_eq!(tokens.refresh_token.as_deref(), Some("new-rt"));
    }

    #[tokio::test]
    async fn rejected_refresh_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400).set_body_string(r#"{"error":"invalid_grant"}"#),
            )
            .mount(&server)
            .await;

        let err = client(&server).refresh("revoked").await.unwrap_err();

        match err {
            OAuthError::Rejected { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("invalid_grant"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_refresh_token_in_response_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "at",
                "expires_in": 60
            })))
            .mount(&server)
            .await;

        let tokens = client(&server).refresh("rt").await.unwrap();

        assert!(tokens.refresh_token.is_none());
    }
}
