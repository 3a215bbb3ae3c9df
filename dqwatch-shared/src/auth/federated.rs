/// Federated (Google via Firebase) identity verification
///
/// The client signs in with the provider and sends us the provider-issued ID
/// token. We verify it against the provider's published signing keys (JWKS)
/// and extract the asserted identity; the caller then upserts a local user
/// and issues a local access token.
///
/// [`IdentityVerifier`] is the seam between the HTTP layer and the provider,
/// so tests can substitute a stub verifier.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, jwk::JwkSet, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::RwLock;

/// Default key set for Firebase ID tokens
pub const FIREBASE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

/// How long a fetched key set is trusted before refetching
const JWKS_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Error type for federated verification
#[derive(Debug, thiserror::Error)]
pub enum FederatedError {
    /// No provider project configured
    #[error("Federated sign-in is not configured")]
    NotConfigured,

    /// Token is malformed, forged, expired or for another audience
    #[error("Invalid provider token: {0}")]
    InvalidToken(String),

    /// Provider key set could not be fetched
    #[error("Failed to fetch provider keys: {0}")]
    KeyFetch(String),
}

/// Identity asserted by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedIdentity {
    /// Provider user id (`sub`)
    pub uid: String,
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// Verifies provider ID tokens
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, id_token: &str) -> Result<FederatedIdentity, FederatedError>;
}

#[derive(Debug, Deserialize)]
struct FirebaseClaims {
    sub: String,
    email: Option<String>,
    email_verified: Option<bool>,
    name: Option<String>,
    picture: Option<String>,
}

/// Extracts the identity from verified claims
///
/// Local identities are keyed by email, so the provider must assert that the
/// email is verified.
fn identity_from_claims(claims: FirebaseClaims) -> Result<FederatedIdentity, FederatedError> {
    let email = claims
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| FederatedError::InvalidToken("token carries no email".to_string()))?;

    if claims.email_verified != Some(true) {
        return Err(FederatedError::InvalidToken("email not verified".to_string()));
    }

    Ok(FederatedIdentity {
        uid: claims.sub,
        email,
        name: claims.name,
        picture: claims.picture,
    })
}

struct CachedKeys {
    keys: Arc<JwkSet>,
    fetched_at: Instant,
}

/// Firebase ID token verifier
///
/// Checks the RS256 signature against Google's key set, `aud` equal to the
/// project id and `iss` equal to `https://securetoken.google.com/<project>`.
pub struct FirebaseVerifier {
    project_id: Option<String>,
    jwks_url: String,
    http_client: reqwest::Client,
    cache: RwLock<Option<CachedKeys>>,
}

impl FirebaseVerifier {
    /// Creates a verifier; `None` project id disables federated sign-in
    pub fn new(project_id: Option<String>, jwks_url: impl Into<String>) -> Self {
        Self {
            project_id,
            jwks_url: jwks_url.into(),
            http_client: reqwest::Client::new(),
            cache: RwLock::new(None),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.project_id.is_some()
    }

    /// Returns the cached key set, fetching it when stale or when forced
    async fn keys(&self, force: bool) -> Result<Arc<JwkSet>, FederatedError> {
        if !force {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.fetched_at.elapsed() < JWKS_CACHE_TTL {
                    return Ok(cached.keys.clone());
                }
            }
        }

        let keys = Arc::new(self.fetch_keys().await?);
        *self.cache.write().await = Some(CachedKeys {
            keys: keys.clone(),
            fetched_at: Instant::now(),
        });

        Ok(keys)
    }

    async fn fetch_keys(&self) -> Result<JwkSet, FederatedError> {
        tracing::debug!(url = %self.jwks_url, "Fetching provider key set");

        let resp = self
            .http_client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| FederatedError::KeyFetch(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(FederatedError::KeyFetch(format!(
                "key endpoint returned {}",
                resp.status()
            )));
        }

        resp.json::<JwkSet>()
            .await
            .map_err(|e| FederatedError::KeyFetch(e.to_string()))
    }
}

#[async_trait]
impl IdentityVerifier for FirebaseVerifier {
    async fn verify(&self, id_token: &str) -> Result<FederatedIdentity, FederatedError> {
        let project_id = self.project_id.as_deref().ok_or(FederatedError::NotConfigured)?;

        let header =
            decode_header(id_token).map_err(|e| FederatedError::InvalidToken(e.to_string()))?;
        let kid = header
            .kid
            .ok_or_else(|| FederatedError::InvalidToken("missing key id".to_string()))?;

        // Keys rotate; an unknown kid triggers one refetch
        let mut keys = self.keys(false).await?;
        if keys.find(&kid).is_none() {
            keys = self.keys(true).await?;
        }
        let jwk = keys
            .find(&kid)
            .ok_or_else(|| FederatedError::InvalidToken("unknown key id".to_string()))?;

        let decoding_key =
            DecodingKey::from_jwk(jwk).map_err(|e| FederatedError::InvalidToken(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[project_id]);
        validation.set_issuer(&[format!("https://securetoken.google.com/{}", project_id)]);

        let claims = decode::<FirebaseClaims>(id_token, &decoding_key, &validation)
            .map_err(|e| FederatedError::InvalidToken(e.to_string()))?
            .claims;

        identity_from_claims(claims)
    }
}
