use async_trait::async_trait;

use crate::services::cache::CacheError;

/// Stored OAuth credential for one identity.
///
/// Missing fields are `None`, never errors. An access token that has aged out of
/// the store reads exactly like one that was never obtained.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential {
    pub access_token: Option<String>,
    // Remaining lifetime reported by the store (None when no access token).
    pub access_token_expiry_seconds: Option<u64>,
    pub refresh_token: Option<String>,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print token material
        f.debug_struct("Credential")
            .field("has_access_token", &self.access_token.is_some())
            .field(
                "access_token_expiry_seconds",
                &self.access_token_expiry_seconds,
            )
            .field("has_refresh_token", &self.refresh_token.is_some())
            .finish()
    }
}

/// Write request for `CredentialStore::put`.
///
/// The access token is only written when both the token and a positive TTL are
/// present; the refresh token is written without expiry.
#[derive(Clone, Default)]
pub struct CredentialWrite {
    pub access_token: Option<String>,
    pub access_token_ttl_seconds: Option<u64>,
    pub refresh_token: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("credential store unavailable: {0}")]
    Store(#[from] CacheError),
}

pub type CredentialResult<T> = Result<T, CredentialError>;

/// Per-identity credential custody.
///
/// Backed by an external keyed store so any process can read what another wrote.
/// Store failures surface as `Err`; callers must not read them as "no credential".
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, user: &str) -> CredentialResult<Credential>;

    async fn put(&self, user: &str, write: CredentialWrite) -> CredentialResult<()>;

    // true iff either token key is present
    async fn exists(&self, user: &str) -> CredentialResult<bool>;
}
