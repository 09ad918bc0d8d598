/*
 * Responsibility
 * - /tokens の request/response DTO
 * - validate() で形式チェック (token 値そのものは検証しない)
 */
use serde::{Deserialize, Serialize};

/// Body of `POST /tokens`: hand-off from the OAuth consent flow.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreTokensRequest {
    #[serde(default)]
    pub access_token: Option<String>,
    // seconds until the access token expires
    #[serde(default)]
    pub access_token_expiry: Option<u64>,
    pub refresh_token: String,
    #[serde(default)]
    pub user: String,
}

impl StoreTokensRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.refresh_token.trim().is_empty() {
            return Err("refreshToken is required");
        }
        if let Some(token) = &self.access_token
            && token.trim().is_empty()
        {
            return Err("accessToken cannot be empty");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct StoreTokensResponse {
    pub user: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenStatusQuery {
    #[serde(default)]
    pub user: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenStatusResponse {
    pub user: String,
    pub has_tokens: bool,
}
