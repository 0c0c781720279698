//! Bearer-token authentication.
//!
//! This module provides:
//! - The [`PrincipalVerifier`] seam with Firebase and HS256 implementations
//! - `require_bearer_auth` middleware and the [`AuthPrincipal`] extractor
//! - [`AuthConfig`] selected by `AUTH_PROVIDER`
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::auth::{AuthConfig, require_bearer_auth, verifier_from_config};
//! use core_config::FromEnv;
//!
//! let verifier = verifier_from_config(&AuthConfig::from_env()?);
//!
//! let protected = Router::new()
//!     .route("/api/my-events", get(handler))
//!     .route_layer(axum::middleware::from_fn_with_state(verifier, require_bearer_auth));
//! ```

pub mod config;
pub mod extractor;
pub mod firebase;
pub mod jwt;
pub mod middleware;
pub mod principal;

use std::sync::Arc;

pub use config::{AuthConfig, AuthProvider, FirebaseConfig, JwtConfig};
pub use extractor::AuthPrincipal;
pub use firebase::{FirebaseVerifier, GOOGLE_JWKS_URL};
pub use jwt::{ACCESS_TOKEN_TTL, JwtClaims, JwtVerifier};
pub use middleware::{bearer_token, require_bearer_auth};
pub use principal::{AuthError, Principal, PrincipalVerifier, SharedVerifier};

/// Build the verifier named by the configuration.
pub fn verifier_from_config(config: &AuthConfig) -> SharedVerifier {
    match config {
        AuthConfig::Firebase(firebase) => Arc::new(FirebaseVerifier::new(firebase)),
        AuthConfig::Jwt(jwt) => Arc::new(JwtVerifier::new(jwt)),
    }
}
