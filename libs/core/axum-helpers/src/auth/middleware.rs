use super::principal::{AuthError, SharedVerifier};
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// The scheme is matched exactly and the token must be a single non-empty word.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::MalformedHeader)?;

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.is_empty() && !token.contains(char::is_whitespace) => Ok(token),
        _ => Err(AuthError::MalformedHeader),
    }
}

/// Bearer authentication middleware.
///
/// Verifies the token with the configured [`PrincipalVerifier`](super::PrincipalVerifier)
/// and inserts the resulting [`Principal`](super::Principal) into request extensions.
/// Any failure ends the request with `401`.
///
/// ```ignore
/// use axum::{Router, routing::post, middleware::from_fn_with_state};
/// use axum_helpers::auth::require_bearer_auth;
///
/// let protected = Router::new()
///     .route("/events", post(create_event))
///     .route_layer(from_fn_with_state(verifier.clone(), require_bearer_auth));
/// ```
pub async fn require_bearer_auth(
    State(verifier): State<SharedVerifier>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(request.headers())?.to_owned();
    let principal = verifier.verify(&token).await?;

    tracing::debug!(uid = %principal.uid, "Request authenticated");
    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}
