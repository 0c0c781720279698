use super::config::JwtConfig;
use super::principal::{AuthError, Principal, PrincipalVerifier, principal_from_claims};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Default lifetime of tokens issued by [`JwtVerifier::create_token`]
pub const ACCESS_TOKEN_TTL: i64 = 3600; // 1 hour

/// Claims carried by shared-secret tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String, // Subject (user ID)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

/// HS256 verifier for tokens signed with a shared secret.
///
/// Useful for local development and tests where Firebase is not available.
#[derive(Clone)]
pub struct JwtVerifier {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret.as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        tracing::info!("HS256 token verifier initialized");
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Sign a token for `uid`/`email` valid for `ttl_seconds`.
    pub fn create_token(
        &self,
        uid: &str,
        email: Option<&str>,
        ttl_seconds: i64,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: uid.to_string(),
            email: email.map(str::to_string),
            exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
            iat: now.timestamp(),
        };

        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding,
        )?)
    }

    /// Verify signature and expiry and decode claims
    pub fn decode_claims(&self, token: &str) -> Result<JwtClaims, AuthError> {
        Ok(decode::<JwtClaims>(token, &self.decoding, &self.validation)?.claims)
    }
}

#[async_trait]
impl PrincipalVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        let claims = self.decode_claims(token)?;
        principal_from_claims(claims.sub, claims.email)
    }
}
