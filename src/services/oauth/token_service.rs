use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::services::credentials::{CredentialError, CredentialStore, CredentialWrite};
use crate::services::oauth::client::TokenRefresher;

/// Supplies a usable upstream access token per identity.
///
/// - An access token present in the store is trusted as-is (the store's TTL is
///   the only freshness check; no upstream revalidation).
/// - Otherwise the refresh token is exchanged once and the new pair persisted.
/// - Concurrent refreshes for the same identity are not serialized; the last
///   write wins in the store.
/// Upper bound for the TTL written for a refreshed access token (1 day).
/// Graph issues ~1h tokens; anything beyond this is a misbehaving endpoint.
pub const MAX_ACCESS_TOKEN_TTL_SECONDS: u64 = 24 * 60 * 60;

#[derive(Clone)]
pub struct TokenService {
    store: Arc<dyn CredentialStore>,
    refresher: Arc<dyn TokenRefresher>,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService").finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(store: Arc<dyn CredentialStore>, refresher: Arc<dyn TokenRefresher>) -> Self {
        Self { store, refresher }
    }

    /// Returns:
    /// - `Ok(Some(token))` when a token is stored or a refresh succeeded
    /// - `Ok(None)` when the identity has no credential or the refresh failed
    /// - `Err(_)` when the credential store itself is unavailable
    pub async fn get_access_token(&self, user: &str) -> Result<Option<String>, CredentialError> {
        let credential = self.store.get(user).await?;

        if let Some(access_token) = credential.access_token {
            return Ok(Some(access_token));
        }

        let Some(refresh_token) = credential.refresh_token else {
            debug!(user = %user, "no credential stored");
            return Ok(None);
        };

        let refreshed = match self.refresher.refresh(&refresh_token).await {
            Ok(t) => t,
            Err(e) => {
                // Caller sees "no access token"; retrying is per request.
                warn!(user = %user, error = %e, "access token refresh failed");
                return Ok(None);
            }
        };

        let ttl = refreshed.expires_in.min(MAX_ACCESS_TOKEN_TTL_SECONDS);
        let expires_at = i64::try_from(ttl)
            .ok()
            .and_then(ChronoDuration::try_seconds)
            .and_then(|d| Utc::now().checked_add_signed(d));
        self.store
            .put(
                user,
                CredentialWrite {
                    access_token: Some(refreshed.access_token.clone()),
                    access_token_ttl_seconds: Some(ttl),
                    refresh_token: Some(refreshed.refresh_token.unwrap_or(refresh_token)),
                },
            )
            .await?;

        info!(user = %user, ttl_seconds = ttl, expires_at = ?expires_at, "access token refreshed");
        Ok(Some(refreshed.access_token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    use crate::services::cache::{MemoryCacheClient, UnavailableCacheClient};
    use crate::services::credentials::KvCredentialStore;
    use crate::services::oauth::client::{OAuthError, RefreshedTokens};

    #[derive(Default)]
    struct CountingRefresher {
        calls: AtomicU32,
        fail: bool,
        rotate: bool,
        expires_in: Option<u64>,
    }

    #[async_trait]
    impl TokenRefresher for CountingRefresher {
        async fn refresh(&self, refresh_token: &str) -> Result<RefreshedTokens, OAuthError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail {
                return Err(OAuthError::Rejected {
                    status: 400,
                    body: "invalid_grant".into(),
                });
            }
            Ok(RefreshedTokens {
                access_token: format!("at-{n}-from-{refresh_token}"),
                expires_in: self.expires_in.unwrap_or(3600),
                refresh_token: self.rotate.then(|| format!("rt-{n}")),
            })
        }
    }

    fn setup(
        refresher: CountingRefresher,
    ) -> (
        Arc<MemoryCacheClient>,
        Arc<KvCredentialStore<MemoryCacheClient>>,
        Arc<CountingRefresher>,
        TokenService,
    ) {
        let cache = Arc::new(MemoryCacheClient::new());
        let store = Arc::new(KvCredentialStore::new_with_cache(cache.clone(), ""));
        let refresher = Arc::new(refresher);
        let service = TokenService::new(store.clone(), refresher.clone());
        (cache, store, refresher, service)
    }

    async fn seed_refresh_only(store: &KvCredentialStore<MemoryCacheClient>, user: &str) {
        store
            .put(
                user,
                CredentialWrite {
                    refresh_token: Some("rt-0".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn stored_access_token_is_returned_without_refresh() {
        let (_, store, refresher, service) = setup(CountingRefresher::default());
        store
            .put(
                "",
                CredentialWrite {
                    access_token: Some("cached".into()),
                    access_token_ttl_seconds: Some(600),
                    refresh_token: Some("rt-0".into()),
                },
            )
            .await
            .unwrap();

        let token = service.get_access_token("").await.unwrap();

        assert_eq!(token.as_deref(), Some("cached"));
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn refresh_happens_once_then_token_is_served_from_store() {
        let (_, store, refresher, service) = setup(CountingRefresher::default());
        seed_refresh_only(&store, "alice").await;

        let first = service.get_access_token("alice").await.unwrap();
        let second = service.get_access_token("alice").await.unwrap();

        assert_eq!(first.as_deref(), Some("at-1-from-rt-0"));
        assert_eq!(second, first);
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn refreshed_pair_is_persisted() {
        let (cache, store, _, service) = setup(CountingRefresher {
            rotate: true,
            ..Default::default()
        });
        seed_refresh_only(&store, "").await;

        service.get_access_token("").await.unwrap();

        assert_eq!(cache.raw("access_token").as_deref(), Some("at-1-from-rt-0"));
        assert_eq!(cache.raw("refresh_token").as_deref(), Some("rt-1"));
        let ttl = store.get("").await.unwrap().access_token_expiry_seconds;
        assert!(ttl.is_some_and(|s| s > 0));
    }

    #[tokio::test]
    async fn unrotated_refresh_token_is_kept() {
        let (cache, store, _, service) = setup(CountingRefresher::default());
        seed_refresh_only(&store, "").await;

        service.get_access_token("").await.unwrap();

        assert_eq!(cache.raw("refresh_token").as_deref(), Some("rt-0"));
    }

    #[tokio::test]
    async fn expired_token_triggers_a_new_refresh() {
        let (cache, store, refresher, service) = setup(CountingRefresher::default());
        seed_refresh_only(&store, "").await;

        service.get_access_token("").await.unwrap();
        cache.expire("access_token");
        let token = service.get_access_token("").await.unwrap();

        assert_eq!(token.as_deref(), Some("at-2-from-rt-0"));
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn no_credential_means_no_token_and_no_refresh() {
        let (_, _, refresher, service) = setup(CountingRefresher::default());

        let token = service.get_access_token("ghost").await.unwrap();

        assert!(token.is_none());
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_refresh_reads_as_no_token() {
        let (cache, store, refresher, service) = setup(CountingRefresher {
            fail: true,
            ..Default::default()
        });
        seed_refresh_only(&store, "").await;

        let token = service.get_access_token("").await.unwrap();

        assert!(token.is_none());
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
        assert!(cache.raw("access_token").is_none());
    }

    #[tokio::test]
    async fn oversized_expires_in_is_capped_instead_of_overflowing() {
        let (cache, store, _, service) = setup(CountingRefresher {
            expires_in: Some(10_000_000_000_000_000),
            ..Default::default()
        });
        seed_refresh_only(&store, "").await;

        let token = service.get_access_token("").await.unwrap();

        assert_eq!(token.as_deref(), Some("at-1-from-rt-0"));
        assert!(cache.raw("access_token").is_some());
        let ttl = store.get("").await.unwrap().access_token_expiry_seconds;
        assert!(ttl.is_some_and(|s| s > 0 && s <= MAX_ACCESS_TOKEN_TTL_SECONDS));
    }

    #[tokio::test]
    async fn store_outage_surfaces_as_error() {
        let refresher = Arc::new(CountingRefresher::default());
        let service = TokenService::new(
            Arc::new(KvCredentialStore::new_with_cache(
                Arc::new(UnavailableCacheClient),
                "",
            )),
            refresher.clone(),
        );

        assert!(service.get_access_token("").await.is_err());
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 0);
    }
}
