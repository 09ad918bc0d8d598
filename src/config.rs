/*
 * Responsibility
 * - 環境変数や設定の読み込み (REDIS_URL, OAuth client, drive root, protected routes など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderValue;

use crate::services::protected::{ProtectedRouteSpec, ProtectedRoutes};
use crate::services::raw_gateway::CachePolicy;

pub const DEFAULT_TOKEN_URL: &str = "https://login.microsoftonline.com/common/oauth2/v2.0/token";
pub const DEFAULT_DRIVE_API: &str = "https://graph.microsoft.com/v1.0/me/drive";
pub const DEFAULT_CACHE_CONTROL: &str =
    "public, max-age=3600, s-maxage=86400, stale-while-revalidate=3600";
pub const DEFAULT_REDIRECT_CACHE_CONTROL: &str = "public, max-age=600, s-maxage=600";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
    ProtectedRoutes(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
            ConfigError::ProtectedRoutes(msg) => {
                write!(f, "invalid configuration: PROTECTED_ROUTES: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,
    pub request_timeout: Duration,

    // Credential store
    pub redis_url: String,
    pub kv_prefix: String,

    // OAuth app registration
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub token_url: String,

    // Upstream drive
    pub drive_api: String,
    pub base_directory: String,
    pub user_principal_name: String,
    pub user_list: Vec<String>,
    pub upstream_timeout: Duration,

    pub protected_routes: ProtectedRoutes,
    pub cache_policy: CachePolicy,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print secrets (client secret, redis credentials, route passwords)
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("client_id", &self.client_id)
            .field("drive_api", &self.drive_api)
            .field("base_directory", &self.base_directory)
            .field("user_list", &self.user_list)
            .field("protected_routes", &self.protected_routes.len())
            .finish_non_exhaustive()
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_list(key: &str) -> Vec<String> {
    std::env::var(key)
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn env_secs(key: &str, default: u64) -> Duration {
    let secs = std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default);
    Duration::from_secs(secs)
}

pub fn parse_protected_routes(raw: &str) -> Result<ProtectedRoutes, ConfigError> {
    if raw.trim().is_empty() {
        return Ok(ProtectedRoutes::default());
    }
    let specs: Vec<ProtectedRouteSpec> =
        serde_json::from_str(raw).map_err(|e| ConfigError::ProtectedRoutes(e.to_string()))?;
    ProtectedRoutes::from_specs(specs).map_err(|e| ConfigError::ProtectedRoutes(e.to_string()))
}

pub fn parse_cache_policy(content: &str, redirect: &str) -> Result<CachePolicy, ConfigError> {
    Ok(CachePolicy {
        content: HeaderValue::from_str(content)
            .map_err(|_| ConfigError::Invalid("CACHE_CONTROL_HEADER"))?,
        redirect: HeaderValue::from_str(redirect)
            .map_err(|_| ConfigError::Invalid("REDIRECT_CACHE_CONTROL_HEADER"))?,
    })
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let redis_url =
            std::env::var("REDIS_URL").map_err(|_| ConfigError::Missing("REDIS_URL"))?;

        let client_id =
            std::env::var("CLIENT_ID").map_err(|_| ConfigError::Missing("CLIENT_ID"))?;
        let client_secret =
            std::env::var("CLIENT_SECRET").map_err(|_| ConfigError::Missing("CLIENT_SECRET"))?;

        let token_url = env_or("OAUTH_TOKEN_URL", DEFAULT_TOKEN_URL);
        url::Url::parse(&token_url).map_err(|_| ConfigError::Invalid("OAUTH_TOKEN_URL"))?;

        let drive_api = env_or("DRIVE_API", DEFAULT_DRIVE_API);
        url::Url::parse(&drive_api).map_err(|_| ConfigError::Invalid("DRIVE_API"))?;

        let protected_routes =
            parse_protected_routes(&std::env::var("PROTECTED_ROUTES").unwrap_or_default())?;

        let cache_policy = parse_cache_policy(
            &env_or("CACHE_CONTROL_HEADER", DEFAULT_CACHE_CONTROL),
            &env_or("REDIRECT_CACHE_CONTROL_HEADER", DEFAULT_REDIRECT_CACHE_CONTROL),
        )?;

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins: env_list("CORS_ALLOWED_ORIGINS"),
            request_timeout: env_secs("REQUEST_TIMEOUT_SECONDS", 30),
            redis_url,
            kv_prefix: env_or("KV_PREFIX", ""),
            client_id,
            client_secret,
            redirect_uri: env_or("REDIRECT_URI", "http://localhost"),
            token_url,
            drive_api,
            base_directory: env_or("BASE_DIRECTORY", "/"),
            user_principal_name: env_or("USER_PRINCIPAL_NAME", ""),
            user_list: env_list("USER_LIST"),
            upstream_timeout: env_secs("UPSTREAM_TIMEOUT_SECONDS", 20),
            protected_routes,
            cache_policy,
        })
    }
}

#[cfg(test)]
impl Config {
    /// Config pointing both upstreams at a test server.
    pub fn for_tests(upstream_base: &str) -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            app_env: AppEnv::Development,
            cors_allowed_origins: Vec::new(),
            request_timeout: Duration::from_secs(10),
            redis_url: "redis://unused".into(),
            kv_prefix: String::new(),
            client_id: "client-id".into(),
            client_secret: "client-secret".into(),
            redirect_uri: "http://localhost".into(),
            token_url: format!("{upstream_base}/common/oauth2/v2.0/token"),
            drive_api: format!("{upstream_base}/v1.0/me/drive"),
            base_directory: "/".into(),
            user_principal_name: "owner@example.com".into(),
            user_list: Vec::new(),
            upstream_timeout: Duration::from_secs(5),
            protected_routes: ProtectedRoutes::default(),
            cache_policy: parse_cache_policy(DEFAULT_CACHE_CONTROL, DEFAULT_REDIRECT_CACHE_CONTROL)
                .unwrap(),
        }
    }
}
