//! Protected-route rule table.
//!
//! Rules are an explicit list ordered longest prefix first. The first rule whose
//! prefix covers a path (honouring `propagate`) decides; there is no implicit
//! parent scanning.
use serde::Deserialize;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::services::drive::path::normalize_path;

/// One entry of `PROTECTED_ROUTES` as configured.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProtectedRouteSpec {
    #[serde(default)]
    pub user: String,
    pub prefix: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub password_sha256: Option<String>,
    #[serde(default = "default_propagate")]
    pub propagate: bool,
}

fn default_propagate() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("protected route {0:?}: exactly one of password / passwordSha256 is required")]
    SecretChoice(String),
    #[error("protected route {0:?}: passwordSha256 must be 64 hex chars")]
    BadHash(String),
    #[error("protected route {0:?}: empty password")]
    EmptyPassword(String),
}

/// Lowercase hex SHA-256 of `input`.
pub fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

// Length mismatch is not hidden; only the content comparison is constant time.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

#[derive(Clone, PartialEq, Eq)]
pub enum RouteSecret {
    Plain(String),
    // lowercase hex
    Sha256(String),
}

impl std::fmt::Debug for RouteSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain(_) => f.write_str("Plain(..)"),
            Self::Sha256(_) => f.write_str("Sha256(..)"),
        }
    }
}

impl RouteSecret {
    /// Clients may present either the password or its SHA-256 hex (browsers keep
    /// the hashed form).
    pub fn matches(&self, presented: &str) -> bool {
        let presented_hash = sha256_hex(presented);
        match self {
            Self::Plain(password) => {
                constant_time_eq(presented.as_bytes(), password.as_bytes())
                    || constant_time_eq(
                        presented.to_ascii_lowercase().as_bytes(),
                        sha256_hex(password).as_bytes(),
                    )
            }
            Self::Sha256(hash) => {
                constant_time_eq(presented_hash.as_bytes(), hash.as_bytes())
                    || constant_time_eq(presented.to_ascii_lowercase().as_bytes(), hash.as_bytes())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedRoute {
    pub user: String,
    // normalized absolute posix path
    pub prefix: String,
    pub secret: RouteSecret,
    pub propagate: bool,
}

impl ProtectedRoute {
    /// Exact, case-sensitive prefix match on whole path segments.
    pub fn covers(&self, path: &str) -> bool {
        if path == self.prefix {
            return true;
        }
        if !self.propagate {
            return false;
        }
        if self.prefix == "/" {
            return true;
        }
        path.strip_prefix(self.prefix.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl TryFrom<ProtectedRouteSpec> for ProtectedRoute {
    type Error = RuleError;

    fn try_from(spec: ProtectedRouteSpec) -> Result<Self, Self::Error> {
        let prefix = normalize_path(&spec.prefix);
        let secret = match (spec.password, spec.password_sha256) {
            (Some(p), None) if p.is_empty() => return Err(RuleError::EmptyPassword(prefix)),
            (Some(p), None) => RouteSecret::Plain(p),
            (None, Some(h)) => {
                let h = h.trim().to_ascii_lowercase();
                if h.len() != 64 || !h.bytes().all(|b| b.is_ascii_hexdigit()) {
                    return Err(RuleError::BadHash(prefix));
                }
                RouteSecret::Sha256(h)
            }
            _ => return Err(RuleError::SecretChoice(prefix)),
        };

        Ok(Self {
            user: spec.user,
            prefix,
            secret,
            propagate: spec.propagate,
        })
    }
}

/// Validated rule list, sorted longest prefix first.
#[derive(Debug, Clone, Default)]
pub struct ProtectedRoutes {
    rules: Vec<ProtectedRoute>,
}

impl ProtectedRoutes {
    pub fn new(mut rules: Vec<ProtectedRoute>) -> Self {
        // stable: equal-length prefixes keep configuration order
        rules.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        Self { rules }
    }

    pub fn from_specs(specs: Vec<ProtectedRouteSpec>) -> Result<Self, RuleError> {
        let rules = specs
            .into_iter()
            .map(ProtectedRoute::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(rules))
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Most specific rule of `user` covering `path`.
    pub fn find(&self, user: &str, path: &str) -> Option<&ProtectedRoute> {
        self.rules
            .iter()
            .filter(|r| r.user == user)
            .find(|r| r.covers(path))
    }
}
