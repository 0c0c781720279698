use super::config::FirebaseConfig;
use super::principal::{AuthError, Principal, PrincipalVerifier, principal_from_claims};
use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header, jwk::JwkSet};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

/// Public keys used to sign Firebase ID tokens
pub const GOOGLE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

/// How long fetched keys are trusted before refetching
const KEY_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Minimum gap between two key fetches
pub const MIN_REFETCH_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct FirebaseClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
}

struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
}

/// Verifies Firebase ID tokens against Google's published signing keys.
///
/// Tokens must be RS256, carry a `kid` present in the key set, name the
/// project as audience and `https://securetoken.google.com/<project>` as issuer.
pub struct FirebaseVerifier {
    project_id: String,
    issuer: String,
    jwks_url: String,
    client: reqwest::Client,
    cache: RwLock<Option<CachedKeys>>,
    last_fetch: Mutex<Option<Instant>>,
}

impl FirebaseVerifier {
    pub fn new(config: &FirebaseConfig) -> Self {
        Self::with_jwks_url(config, GOOGLE_JWKS_URL)
    }

    /// Fetch keys from a different endpoint, e.g. an emulator.
    pub fn with_jwks_url(config: &FirebaseConfig, jwks_url: impl Into<String>) -> Self {
        tracing::info!(
            "Firebase token verifier initialized for project '{}'",
            config.project_id
        );
        Self {
            issuer: format!("https://securetoken.google.com/{}", config.project_id),
            project_id: config.project_id.clone(),
            jwks_url: jwks_url.into(),
            client: reqwest::Client::new(),
            cache: RwLock::new(None),
            last_fetch: Mutex::new(None),
        }
    }

    /// Seed the key cache so no fetch happens until it expires.
    pub async fn preload_keys(&self, keys: JwkSet) {
        *self.cache.write().await = Some(CachedKeys {
            keys,
            fetched_at: Instant::now(),
        });
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    async fn fetch_keys(&self) -> Result<JwkSet, AuthError> {
        tracing::debug!("Fetching Firebase signing keys from {}", self.jwks_url);
        self.client
            .get(&self.jwks_url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| AuthError::KeyFetch(e.to_string()))?
            .json::<JwkSet>()
            .await
            .map_err(|e| AuthError::KeyFetch(e.to_string()))
    }

    fn cached_key(cache: &Option<CachedKeys>, kid: &str) -> Option<Result<DecodingKey, AuthError>> {
        let cached = cache.as_ref()?;
        if cached.fetched_at.elapsed() > KEY_CACHE_TTL {
            return None;
        }
        cached
            .keys
            .find(kid)
            .map(|jwk| DecodingKey::from_jwk(jwk).map_err(AuthError::from))
    }

    /// Resolve `kid`, refetching when it is unknown or the cache is stale.
    ///
    /// Refetches are serialized and happen at most once per
    /// [`MIN_REFETCH_INTERVAL`]; the key cache is only locked to swap in the result.
    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        if let Some(key) = Self::cached_key(&*self.cache.read().await, kid) {
            return key;
        }

        let mut last_attempt = self.last_fetch.lock().await;
        // Another request may have refreshed while we waited.
        if let Some(key) = Self::cached_key(&*self.cache.read().await, kid) {
            return key;
        }

        if last_attempt.is_some_and(|at| at.elapsed() < MIN_REFETCH_INTERVAL) {
            let cache = self.cache.read().await;
            return cache
                .as_ref()
                .and_then(|cached| cached.keys.find(kid))
                .map(|jwk| DecodingKey::from_jwk(jwk).map_err(AuthError::from))
                .unwrap_or_else(|| Err(AuthError::UnknownKey(kid.to_string())));
        }

        *last_attempt = Some(Instant::now());
        let keys = self.fetch_keys().await?;

        let mut cache = self.cache.write().await;
        *cache = Some(CachedKeys {
            keys,
            fetched_at: Instant::now(),
        });
        Self::cached_key(&cache, kid).unwrap_or_else(|| Err(AuthError::UnknownKey(kid.to_string())))
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.project_id]);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iat", "aud", "iss", "sub"]);
        validation
    }
}

#[async_trait]
impl PrincipalVerifier for FirebaseVerifier {
    async fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        let header = decode_header(token)?;
        if header.alg != Algorithm::RS256 {
            return Err(AuthError::InvalidToken(format!(
                "unexpected algorithm {:?}",
                header.alg
            )));
        }
        let kid = header
            .kid
            .ok_or_else(|| AuthError::InvalidToken("missing key id".to_string()))?;

        let key = self.decoding_key(&kid).await?;
        let claims = decode::<FirebaseClaims>(token, &key, &self.validation())?.claims;

        principal_from_claims(claims.sub, claims.email)
    }
}
