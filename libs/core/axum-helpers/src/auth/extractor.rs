use super::principal::{AuthError, Principal};
use axum::{extract::FromRequestParts, http::request::Parts};

/// The [`Principal`] inserted by [`require_bearer_auth`](super::require_bearer_auth).
///
/// Rejects with `401` when the route is not behind the middleware.
pub struct AuthPrincipal(pub Principal);

impl<S> FromRequestParts<S> for AuthPrincipal
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(AuthPrincipal)
            .ok_or(AuthError::MissingPrincipal)
    }
}
