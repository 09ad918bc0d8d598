//! Raw content gateway.
//!
//! Responsibility:
//! - Turn a `RawRequest` into either a proxied stream or a redirect to the
//!   provider's pre-signed download URL.
//! - Order: identity, path validation, access token, protected-route check, then upstream.
//! - Pick the `Cache-Control` policy for each outcome.
use axum::http::{HeaderValue, StatusCode};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::AppError;
use crate::services::drive::{DriveClient, path::validate_path};
use crate::services::oauth::TokenService;
use crate::services::protected::RouteAuthorizer;

/// Files strictly below this size may be proxied (4 MiB).
pub const PROXY_SIZE_LIMIT: u64 = 4 * 1024 * 1024;

pub const DEFAULT_REDIRECT_STATUS: StatusCode = StatusCode::PERMANENT_REDIRECT;

/// One inbound raw request, already pulled out of the query string/headers.
#[derive(Clone, Default)]
pub struct RawRequest {
    // as received, not yet normalized
    pub path: String,
    pub protection_token: Option<String>,
    pub proxy: bool,
    pub redirect: Option<u16>,
    pub user: String,
}

impl std::fmt::Debug for RawRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawRequest")
            .field("path", &self.path)
            .field("has_protection_token", &self.protection_token.is_some())
            .field("proxy", &self.proxy)
            .field("redirect", &self.redirect)
            .field("user", &self.user)
            .finish()
    }
}

/// `Cache-Control` values the gateway chooses from.
#[derive(Clone, Debug)]
pub struct CachePolicy {
    // proxied bytes
    pub content: HeaderValue,
    // redirects (the signed URL itself expires)
    pub redirect: HeaderValue,
}

impl CachePolicy {
    pub fn no_cache() -> HeaderValue {
        HeaderValue::from_static("no-cache")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Proxy,
    Redirect,
}

/// Proxy only when asked to and the size is known and below the limit.
pub fn choose_delivery(proxy_requested: bool, size: Option<u64>) -> Delivery {
    match size {
        Some(size) if proxy_requested && size < PROXY_SIZE_LIMIT => Delivery::Proxy,
        _ => Delivery::Redirect,
    }
}

/// Requested redirect code if it is within 300..=308, else 308.
pub fn redirect_status(requested: Option<u16>) -> StatusCode {
    requested
        .filter(|code| (300..=308).contains(code))
        .and_then(|code| StatusCode::from_u16(code).ok())
        .unwrap_or(DEFAULT_REDIRECT_STATUS)
}

#[derive(Debug)]
pub enum RawOutcome {
    Proxy {
        upstream: reqwest::Response,
        cache_control: HeaderValue,
    },
    Redirect {
        status: StatusCode,
        location: String,
        cache_control: HeaderValue,
    },
}

#[derive(Clone)]
pub struct RawGateway {
    tokens: Arc<TokenService>,
    authorizer: Arc<RouteAuthorizer>,
    drive: DriveClient,
    cache: CachePolicy,
    user_list: Vec<String>,
}

impl std::fmt::Debug for RawGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawGateway")
            .field("drive", &self.drive)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl RawGateway {
    pub fn new(
        tokens: Arc<TokenService>,
        authorizer: Arc<RouteAuthorizer>,
        drive: DriveClient,
        cache: CachePolicy,
        user_list: Vec<String>,
    ) -> Self {
        Self {
            tokens,
            authorizer,
            drive,
            cache,
            user_list,
        }
    }

    /// Known identity check. An empty list accepts every identity.
    pub fn ensure_known_user(&self, user: &str) -> Result<(), AppError> {
        if user.is_empty() || self.user_list.is_empty() || self.user_list.iter().any(|u| u == user)
        {
            return Ok(());
        }
        Err(AppError::bad_request("Unknown user."))
    }

    pub async fn handle(&self, req: RawRequest) -> Result<RawOutcome, AppError> {
        self.ensure_known_user(&req.user)?;

        // Malformed input never reaches the store or the network.
        let path = validate_path(&req.path)?;

        let access_token = self
            .tokens
            .get_access_token(&req.user)
            .await?
            .ok_or(AppError::NoAccessToken)?;

        let mut no_cache = false;
        if self.authorizer.has_rules() {
            let decision = self.authorizer.check_auth_route(
                &req.user,
                &path,
                req.protection_token.as_deref(),
            );
            if !decision.is_allowed() {
                return Err(AppError::from_denied(decision));
            }
            no_cache = decision.requires_no_cache();
        }

        let item = self.drive.item_ref(&access_token, &path).await?;
        let download_url = item
            .download_url
            .ok_or_else(|| AppError::not_found("No download url found."))?;

        match choose_delivery(req.proxy, item.size) {
            Delivery::Proxy => {
                let upstream = self.drive.open_content(&download_url).await?;
                info!(path = %path, item_id = ?item.id, size = ?item.size, user = %req.user, "proxying raw content");
                Ok(RawOutcome::Proxy {
                    upstream,
                    cache_control: if no_cache {
                        CachePolicy::no_cache()
                    } else {
                        self.cache.content.clone()
                    },
                })
            }
            Delivery::Redirect => {
                let status = redirect_status(req.redirect);
                debug!(path = %path, status = status.as_u16(), "redirecting to download url");
                Ok(RawOutcome::Redirect {
                    status,
                    location: download_url,
                    cache_control: if no_cache {
                        CachePolicy::no_cache()
                    } else {
                        self.cache.redirect.clone()
                    },
                })
            }
        }
    }
}
