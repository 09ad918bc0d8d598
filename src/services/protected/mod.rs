pub mod authorizer;
pub mod rules;

pub use authorizer::{AuthDecision, RouteAuthorizer};
pub use rules::{ProtectedRouteSpec, ProtectedRoutes};
