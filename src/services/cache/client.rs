//! Cache client interface used by higher-level services (credential store).
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache-layer errors (transport/command/serialization).
///
/// Note:
/// - We keep this independent from `AppError` so callers can decide how to fail.
///   The credential store treats every variant as a hard failure.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache connection error: {0}")]
    BackendConnection(String),
    #[error("cache command error: {0}")]
    BackendCommand(String),
    #[error("cache value error: {0}")]
    InvalidValue(String),
}

/// A minimal keyed-store interface.
///
/// String-based on purpose:
/// - Credentials only need `GET`, `SET` (with or without `EX`), `EXISTS` and `TTL`.
/// - Keep the surface area small; add methods when a caller needs them.
///
/// Implementations must be cheap to clone (typically `Arc<...>` inside)
#[async_trait]
pub trait CacheClient: Clone + Send + Sync + 'static {
    // Returns the cache backend name (for logging/metrics).
    fn backend_name(&self) -> &'static str;

    // Get UTF-8 string value.
    async fn get_string(&self, key: &str) -> CacheResult<Option<String>>;

    // Set value without expiry (overwrites).
    async fn set(&self, key: &str, value: &str) -> CacheResult<()>;

    // Set value with TTL (overwrites).
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    // Whether the key currently exists (expired keys do not).
    async fn exists(&self, key: &str) -> CacheResult<bool>;

    // Remaining TTL.
    //
    // Returns:
    // - `Ok(None)` if the key is missing or has no expiry
    // - `Ok(Some(d))` otherwise
    async fn ttl(&self, key: &str) -> CacheResult<Option<Duration>>;
}

/// Convenience helper to build a TTL from seconds.
pub fn ttl_seconds(seconds: u64) -> Duration {
    Duration::from_secs(seconds)
}
