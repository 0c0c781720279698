use async_trait::async_trait;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::errors::{AppError, ErrorCode};

/// Identity established from a verified bearer token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub uid: String,
    pub email: String,
}

/// Reasons a request could not be authenticated.
///
/// All variants render as `401 Unauthorized`; the detail is only logged.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authorization header missing")]
    MissingToken,

    #[error("authorization header is not a bearer credential")]
    MalformedHeader,

    #[error("token rejected: {0}")]
    InvalidToken(String),

    #[error("token has no email claim")]
    MissingEmail,

    #[error("no signing key with id '{0}'")]
    UnknownKey(String),

    #[error("failed to fetch signing keys: {0}")]
    KeyFetch(String),

    #[error("request reached a protected handler without a principal")]
    MissingPrincipal,
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::InvalidToken(err.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            AuthError::KeyFetch(_) | AuthError::MissingPrincipal => {
                tracing::error!("Authentication failed: {}", self)
            }
            _ => tracing::debug!("Authentication failed: {}", self),
        }
        AppError::Unauthorized(ErrorCode::Unauthorized.default_message().to_string())
            .into_response()
    }
}

/// Turns a raw bearer token into a [`Principal`].
#[async_trait]
pub trait PrincipalVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Principal, AuthError>;
}

/// Verifier handle shared through router state.
pub type SharedVerifier = Arc<dyn PrincipalVerifier>;

/// Build a principal from decoded claims, requiring a non-empty subject and email.
pub(crate) fn principal_from_claims(
    sub: String,
    email: Option<String>,
) -> Result<Principal, AuthError> {
    if sub.is_empty() {
        return Err(AuthError::InvalidToken("empty subject".to_string()));
    }
    match email {
        Some(email) if !email.is_empty() => Ok(Principal { uid: sub, email }),
        _ => Err(AuthError::MissingEmail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_principal_requires_email() {
        let err = principal_from_claims("uid-1".into(), None).unwrap_err();
        assert!(matches!(err, AuthError::MissingEmail));

        let err = principal_from_claims("uid-1".into(), Some(String::new())).unwrap_err();
        assert!(matches!(err, AuthError::MissingEmail));
    }

    #[test]
    fn test_principal_requires_subject() {
        let err = principal_from_claims(String::new(), Some("a@x.com".into())).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }

    #[test]
    fn test_principal_from_claims() {
        let principal = principal_from_claims("uid-1".into(), Some("a@x.com".into())).unwrap();
        assert_eq!(principal.uid, "uid-1");
        assert_eq!(principal.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_every_auth_error_is_unauthorized() {
        for err in [
            AuthError::MissingToken,
            AuthError::MalformedHeader,
            AuthError::MissingEmail,
            AuthError::KeyFetch("timeout".into()),
        ] {
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(body["message"], "Unauthorized access");
        }
    }
}
