//! Authentication configuration loaded through `core_config::FromEnv`.

use core_config::{ConfigError, FromEnv, env_first, env_or_default, env_required};
use serde::Deserialize;
use std::str::FromStr;
use strum::{Display, EnumString};

/// Which token verifier guards the protected routes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AuthProvider {
    /// Firebase ID tokens checked against Google's public keys
    Firebase,
    /// HS256 tokens signed with `JWT_SECRET`
    Jwt,
}

/// Resolved authentication settings.
#[derive(Clone, Debug)]
pub enum AuthConfig {
    Firebase(FirebaseConfig),
    Jwt(JwtConfig),
}

impl AuthConfig {
    pub fn provider(&self) -> AuthProvider {
        match self {
            Self::Firebase(_) => AuthProvider::Firebase,
            Self::Jwt(_) => AuthProvider::Jwt,
        }
    }
}

/// Loaded from:
/// - `AUTH_PROVIDER` (default `firebase`) - `firebase` or `jwt`
/// - the provider's own variables, see [`FirebaseConfig`] and [`JwtConfig`]
impl FromEnv for AuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = env_or_default("AUTH_PROVIDER", "firebase");
        let provider = AuthProvider::from_str(raw.trim()).map_err(|_| ConfigError::ParseError {
            key: "AUTH_PROVIDER".to_string(),
            details: format!("expected 'firebase' or 'jwt', got '{}'", raw),
        })?;

        match provider {
            AuthProvider::Firebase => Ok(Self::Firebase(FirebaseConfig::from_env()?)),
            AuthProvider::Jwt => Ok(Self::Jwt(JwtConfig::from_env()?)),
        }
    }
}

/// Firebase project whose ID tokens are accepted.
///
/// Loaded from:
/// - `FIREBASE_PROJECT_ID`, if set
/// - otherwise `project_id` inside the service-account JSON named by
///   `FIREBASE_SERVICE_ACCOUNT_PATH` or `GOOGLE_APPLICATION_CREDENTIALS`
#[derive(Clone, Debug)]
pub struct FirebaseConfig {
    pub project_id: String,
}

#[derive(Deserialize)]
struct ServiceAccount {
    project_id: String,
}

impl FirebaseConfig {
    /// Read `project_id` from a service-account credential file.
    pub fn from_service_account_file(path: &str) -> Result<Self, ConfigError> {
        let parse_error = |details: String| ConfigError::ParseError {
            key: "FIREBASE_SERVICE_ACCOUNT_PATH".to_string(),
            details,
        };

        let raw = std::fs::read_to_string(path)
            .map_err(|e| parse_error(format!("cannot read {}: {}", path, e)))?;
        let account: ServiceAccount = serde_json::from_str(&raw)
            .map_err(|e| parse_error(format!("invalid service account JSON in {}: {}", path, e)))?;

        if account.project_id.trim().is_empty() {
            return Err(parse_error(format!("{} has an empty project_id", path)));
        }

        Ok(Self {
            project_id: account.project_id,
        })
    }
}

impl FromEnv for FirebaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        if let Some(project_id) = env_first(&["FIREBASE_PROJECT_ID"]).filter(|p| !p.is_empty()) {
            return Ok(Self { project_id });
        }

        let path = env_first(&[
            "FIREBASE_SERVICE_ACCOUNT_PATH",
            "GOOGLE_APPLICATION_CREDENTIALS",
        ])
        .ok_or_else(|| {
            ConfigError::MissingEnvVar(
                "FIREBASE_PROJECT_ID or FIREBASE_SERVICE_ACCOUNT_PATH".to_string(),
            )
        })?;

        Self::from_service_account_file(&path)
    }
}

/// JWT authentication configuration.
///
/// Loaded from environment variables:
/// - `JWT_SECRET` (required) - Must be at least 32 characters for security
#[derive(Clone, Debug)]
pub struct JwtConfig {
    /// JWT signing secret (minimum 32 characters)
    pub secret: String,
}

impl JwtConfig {
    /// # Panics
    /// Panics if the secret is less than 32 characters.
    pub fn new(secret: impl Into<String>) -> Self {
        let secret = secret.into();
        assert!(
            secret.len() >= 32,
            "JWT secret must be at least 32 characters"
        );
        Self { secret }
    }
}

impl FromEnv for JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env_required("JWT_SECRET")?;

        if secret.len() < 32 {
            return Err(ConfigError::ParseError {
                key: "JWT_SECRET".to_string(),
                details: format!(
                    "must be at least 32 characters for security (got {}). Generate one with: openssl rand -base64 32",
                    secret.len()
                ),
            });
        }

        Ok(Self { secret })
    }
}
