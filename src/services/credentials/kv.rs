use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::services::{
    cache::{CacheClient, CacheError, ValkeyClient, client::ttl_seconds},
    credentials::store::{Credential, CredentialResult, CredentialStore, CredentialWrite},
};

/// Credential store on top of a `CacheClient` (Valkey in production).
///
/// Key layout per identity:
/// - default identity (`""`): `{prefix}access_token`, `{prefix}refresh_token`
/// - otherwise: `{prefix}{user}_access_token`, `{prefix}{user}_refresh_token`
///
/// Access tokens carry a store-side TTL; refresh tokens never expire here.
#[derive(Clone)]
pub struct KvCredentialStore<C: CacheClient> {
    cache: Arc<C>,
    prefix: String,
}

impl KvCredentialStore<ValkeyClient> {
    pub async fn connect(redis_url: &str, prefix: impl Into<String>) -> Result<Self, CacheError> {
        let client = ValkeyClient::new(redis_url).await?;

        Ok(Self::new_with_cache(Arc::new(client), prefix))
    }
}

impl<C: CacheClient> KvCredentialStore<C> {
    pub fn new_with_cache(cache: Arc<C>, prefix: impl Into<String>) -> Self {
        Self {
            cache,
            prefix: prefix.into(),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.cache.backend_name()
    }

    fn key_prefix(&self, user: &str) -> String {
        if user.is_empty() {
            self.prefix.clone()
        } else {
            format!("{}{}_", self.prefix, user)
        }
    }

    pub fn access_token_key(&self, user: &str) -> String {
        format!("{}access_token", self.key_prefix(user))
    }

    pub fn refresh_token_key(&self, user: &str) -> String {
        format!("{}refresh_token", self.key_prefix(user))
    }
}

#[async_trait]
impl<C: CacheClient> CredentialStore for KvCredentialStore<C> {
    async fn get(&self, user: &str) -> CredentialResult<Credential> {
        let access_key = self.access_token_key(user);

        let access_token = self.cache.get_string(&access_key).await?;
        let access_token_expiry_seconds = match access_token {
            Some(_) => self.cache.ttl(&access_key).await?.map(|d| d.as_secs()),
            None => None,
        };
        let refresh_token = self
            .cache
            .get_string(&self.refresh_token_key(user))
            .await?;

        Ok(Credential {
            access_token,
            access_token_expiry_seconds,
            refresh_token,
        })
    }

    async fn put(&self, user: &str, write: CredentialWrite) -> CredentialResult<()> {
        if let (Some(token), Some(ttl)) = (&write.access_token, write.access_token_ttl_seconds)
            && ttl > 0
        {
            self.cache
                .set_with_ttl(&self.access_token_key(user), token, ttl_seconds(ttl))
                .await?;
            debug!(user = %user, ttl_seconds = ttl, "stored access token");
        }

        if let Some(refresh) = &write.refresh_token {
            self.cache
                .set(&self.refresh_token_key(user), refresh)
                .await?;
            debug!(user = %user, "stored refresh token");
        }

        Ok(())
    }

    async fn exists(&self, user: &str) -> CredentialResult<bool> {
        if self.cache.exists(&self.access_token_key(user)).await? {
            return Ok(true);
        }

        Ok(self.cache.exists(&self.refresh_token_key(user)).await?)
    }
}
