use axum::http::StatusCode;
use tracing::debug;

use crate::services::protected::rules::ProtectedRoutes;

pub const PASSWORD_REQUIRED: &str = "Password required.";
pub const WRONG_PASSWORD: &str = "Wrong password.";
pub const AUTHENTICATED: &str = "Authenticated.";

/// Outcome of a protected-route check.
///
/// - `200` + empty message: not protected
/// - `200` + message: protected and verified (response must not be cached)
/// - anything else: stop with this status and message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthDecision {
    pub status: StatusCode,
    pub message: String,
}

impl AuthDecision {
    fn new(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            message: message.to_string(),
        }
    }

    pub fn unprotected() -> Self {
        Self::new(StatusCode::OK, "")
    }

    pub fn is_allowed(&self) -> bool {
        self.status == StatusCode::OK
    }

    pub fn requires_no_cache(&self) -> bool {
        self.is_allowed() && !self.message.is_empty()
    }
}

/// Checks a (normalized) path against the protected-route table.
///
/// Pure and local: runs before any upstream call so protected items leak
/// nothing to unauthenticated callers.
#[derive(Debug, Clone, Default)]
pub struct RouteAuthorizer {
    routes: ProtectedRoutes,
}

impl RouteAuthorizer {
    pub fn new(routes: ProtectedRoutes) -> Self {
        Self { routes }
    }

    pub fn has_rules(&self) -> bool {
        !self.routes.is_empty()
    }

    pub fn check_auth_route(&self, user: &str, path: &str, presented: Option<&str>) -> AuthDecision {
        let Some(rule) = self.routes.find(user, path) else {
            return AuthDecision::unprotected();
        };

        let decision = match presented.filter(|t| !t.is_empty()) {
            None => AuthDecision::new(StatusCode::UNAUTHORIZED, PASSWORD_REQUIRED),
            Some(token) if rule.secret.matches(token) => {
                AuthDecision::new(StatusCode::OK, AUTHENTICATED)
            }
            Some(_) => AuthDecision::new(StatusCode::FORBIDDEN, WRONG_PASSWORD),
        };

        debug!(
            user = %user,
            path = %path,
            prefix = %rule.prefix,
            status = decision.status.as_u16(),
            "protected route checked"
        );
        decision
    }
}
