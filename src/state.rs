/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - ex: credentials: CredentialStore, gateway: RawGateway (TokenService は gateway が保持)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 * - プロセス内の可変状態は持たない (credential は外部 store 側)
 */
use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::services::{
    credentials::CredentialStore,
    drive::DriveClient,
    oauth::{OAuthClient, TokenService},
    protected::RouteAuthorizer,
    raw_gateway::RawGateway,
};

/// Values the browser client may read (`GET /config`).
#[derive(Clone, Debug)]
pub struct SiteInfo {
    pub client_id: String,
    pub user_principal_name: String,
    pub base_directory: String,
    pub user_list: Vec<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub site: Arc<SiteInfo>,
    pub credentials: Arc<dyn CredentialStore>,
    pub gateway: Arc<RawGateway>,
}

impl AppState {
    /// Wire services from config around an already-connected credential store.
    pub fn build(config: &Config, credentials: Arc<dyn CredentialStore>) -> Result<Self, AppError> {
        let oauth = OAuthClient::new(
            config.token_url.clone(),
            config.client_id.clone(),
            config.client_secret.clone(),
            config.redirect_uri.clone(),
            config.upstream_timeout,
        )
        .map_err(|e| {
            tracing::error!(error = %e, "failed to build OAuth client");
            AppError::Internal
        })?;

        let drive = DriveClient::new(
            config.drive_api.clone(),
            config.base_directory.clone(),
            config.upstream_timeout,
        )
        .map_err(|e| {
            tracing::error!(error = %e, "failed to build drive client");
            AppError::Internal
        })?;

        let tokens = Arc::new(TokenService::new(credentials.clone(), Arc::new(oauth)));
        let authorizer = Arc::new(RouteAuthorizer::new(config.protected_routes.clone()));

        let gateway = Arc::new(RawGateway::new(
            tokens,
            authorizer,
            drive,
            config.cache_policy.clone(),
            config.user_list.clone(),
        ));

        let site = Arc::new(SiteInfo {
            client_id: config.client_id.clone(),
            user_principal_name: config.user_principal_name.clone(),
            base_directory: config.base_directory.clone(),
            user_list: config.user_list.clone(),
        });

        Ok(Self {
            site,
            credentials,
            gateway,
        })
    }
}
