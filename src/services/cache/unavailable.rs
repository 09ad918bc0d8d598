//! `CacheClient` whose every command fails, standing in for a Valkey outage.
use async_trait::async_trait;
use std::time::Duration;

use crate::services::cache::client::{CacheClient, CacheError, CacheResult};

#[derive(Clone, Debug, Default)]
pub struct UnavailableCacheClient;

fn down<T>() -> CacheResult<T> {
    Err(CacheError::BackendCommand("connection refused".into()))
}

#[async_trait]
impl CacheClient for UnavailableCacheClient {
    fn backend_name(&self) -> &'static str {
        "unavailable"
    }

    async fn get_string(&self, _key: &str) -> CacheResult<Option<String>> {
        down()
    }

    async fn set(&self, _key: &str, _value: &str) -> CacheResult<()> {
        down()
    }

    async fn set_with_ttl(&self, _key: &str, _value: &str, _ttl: Duration) -> CacheResult<()> {
        down()
    }

    async fn exists(&self, _key: &str) -> CacheResult<bool> {
        down()
    }

    async fn ttl(&self, _key: &str) -> CacheResult<Option<Duration>> {
        down()
    }
}
