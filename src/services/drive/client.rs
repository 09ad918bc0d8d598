use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::services::drive::path::encode_item_path;

/// Fields requested for raw lookups.
///
/// Selecting only the download URL fails on some Graph regions, so `id` and
/// `size` ride along.
const RAW_ITEM_FIELDS: &str = "id,size,@microsoft.graph.downloadUrl";

/// Failure of an upstream call, carrying whatever the provider reported.
#[derive(Debug, Clone, thiserror::Error)]
#[error("upstream request failed (status: {status:?})")]
pub struct UpstreamError {
    pub status: Option<u16>,
    pub body: Option<serde_json::Value>,
}

impl UpstreamError {
    fn transport(e: reqwest::Error) -> Self {
        Self {
            status: e.status().map(|s| s.as_u16()),
            body: None,
        }
    }

    async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(text) if text.is_empty() => None,
            Ok(text) => Some(
                serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text)),
            ),
            Err(_) => None,
        };
        Self {
            status: Some(status),
            body,
        }
    }
}

/// Per-request view of an upstream file. Never cached here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpstreamObjectRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default, rename = "@microsoft.graph.downloadUrl")]
    pub download_url: Option<String>,
}

/// Microsoft Graph drive client for the raw path.
///
/// - Metadata lookups carry the caller's bearer token.
/// - Content fetches go to the pre-signed download URL without credentials.
/// - No retries; the browser re-requests.
#[derive(Clone, Debug)]
pub struct DriveClient {
    http: reqwest::Client,
    api_root: String,
    base_directory: String,
    // total bound for metadata calls only
    timeout: Duration,
}

impl DriveClient {
    pub fn new(
        api_root: impl Into<String>,
        base_directory: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        // No client-wide total timeout: a proxied body may take longer than that to
        // drain to a slow client. Only connect and per-read stalls are bounded.
        let http = reqwest::Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()
            .map_err(UpstreamError::transport)?;

        Ok(Self {
            http,
            api_root: api_root.into().trim_end_matches('/').to_string(),
            base_directory: base_directory.into(),
            timeout,
        })
    }

    pub fn item_url(&self, path: &str) -> String {
        format!(
            "{}/root{}",
            self.api_root,
            encode_item_path(&self.base_directory, path)
        )
    }

    #[instrument(skip(self, access_token))]
    pub async fn item_ref(
        &self,
        access_token: &str,
        path: &str,
    ) -> Result<UpstreamObjectRef, UpstreamError> {
        let response = self
            .http
            .get(self.item_url(path))
            .bearer_auth(access_token)
            .query(&[("select", RAW_ITEM_FIELDS)])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(UpstreamError::transport)?;

        if !response.status().is_success() {
            let err = UpstreamError::from_response(response).await;
            warn!(status = ?err.status, "drive item lookup failed");
            return Err(err);
        }

        let item: UpstreamObjectRef = response.json().await.map_err(UpstreamError::transport)?;
        debug!(size = ?item.size, has_url = item.download_url.is_some(), "drive item resolved");
        Ok(item)
    }

    /// Open a streaming GET on a pre-signed download URL.
    ///
    /// The body is not read here; the caller forwards it chunk by chunk.
    pub async fn open_content(&self, download_url: &str) -> Result<reqwest::Response, UpstreamError> {
        let response = self
            .http
            .get(download_url)
            .send()
            .await
            .map_err(UpstreamError::transport)?;

        if !response.status().is_success() {
            let err = UpstreamError::from_response(response).await;
            warn!(status = ?err.status, "content fetch failed");
            return Err(err);
        }

        Ok(response)
    }
}
