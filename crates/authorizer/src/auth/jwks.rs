//! JWKS client for fetching and caching the trusted issuer's public keys.
//!
//! Keys are fetched lazily from the issuer's `/.well-known/jwks.json`
//! endpoint and cached for the life of the process. A token presenting an
//! unknown `kid` triggers exactly one re-fetch (covers key rotation at the
//! provider) before the lookup fails.
//!
//! # Concurrency
//!
//! The cache holds a complete key map behind an async `RwLock` and is
//! swapped whole on refresh, so concurrent readers never observe a
//! partially populated key set. Two requests racing into a refresh may
//! both fetch; the duplicate fetch is harmless.

use crate::errors::AuthError;
use crate::observability::metrics;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::instrument;

/// Timeout for a single JWKS fetch. Bounds worst-case request latency
/// when the identity provider is slow or unreachable.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// JSON Web Key from the issuer's JWKS endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    /// Key type (always "OKP" for Ed25519).
    pub kty: String,

    /// Key ID - selects the key for signature verification.
    pub kid: String,

    /// Curve name.
    #[serde(default)]
    pub crv: Option<String>,

    /// Public key value (base64url encoded).
    #[serde(default)]
    pub x: Option<String>,

    /// Algorithm (should be "EdDSA").
    #[serde(default)]
    pub alg: Option<String>,

    /// Key use (should be "sig").
    #[serde(default, rename = "use")]
    pub key_use: Option<String>,
}

/// JWKS document shape.
#[derive(Debug, Clone, Deserialize)]
pub struct JwksResponse {
    /// List of JSON Web Keys.
    pub keys: Vec<Jwk>,
}

/// Fetches and caches the issuer's public signing keys.
///
/// Shared process-wide; many concurrent requests read the cache, and only
/// the request(s) that first discover a missing key refresh it.
pub struct JwksClient {
    /// URL to the JWKS endpoint.
    jwks_url: String,

    /// HTTP client for fetching JWKS.
    http_client: reqwest::Client,

    /// Cached key map, keyed by `kid`. `None` until the first fetch.
    cache: RwLock<Option<HashMap<String, Jwk>>>,
}

impl JwksClient {
    /// Create a new JWKS client for the given endpoint URL.
    pub fn new(jwks_url: String) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(target: "authz.jwks", error = %e, "Failed to build HTTP client with custom config, using defaults");
                reqwest::Client::new()
            });

        Self {
            jwks_url,
            http_client,
            cache: RwLock::new(None),
        }
    }

    /// Get a key by key ID, fetching the key set if needed.
    ///
    /// An unknown `kid` against a populated cache refreshes the key set
    /// once; if the key is still absent the token is treated as invalid.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::KeyRetrieval` if the JWKS endpoint is
    /// unreachable or returns malformed data, and `AuthError::InvalidToken`
    /// if the key ID is unknown after a refresh.
    #[instrument(skip(self), fields(kid = %kid))]
    pub async fn get_key(&self, kid: &str) -> Result<Jwk, AuthError> {
        {
            let cache = self.cache.read().await;
            if let Some(key) = cache.as_ref().and_then(|keys| keys.get(kid)) {
                tracing::debug!(target: "authz.jwks", kid = %kid, "key set cache hit");
                return Ok(key.clone());
            }
        }

        // Cold cache or unknown kid: refresh once, then the lookup is final.
        self.refresh().await?;

        let cache = self.cache.read().await;
        if let Some(key) = cache.as_ref().and_then(|keys| keys.get(kid)) {
            return Ok(key.clone());
        }

        tracing::warn!(target: "authz.jwks", kid = %kid, "key not found in key set after refresh");
        Err(AuthError::InvalidToken(
            "unknown signing key identifier".to_string(),
        ))
    }

    /// Refresh the cached key set from the issuer.
    #[instrument(skip(self))]
    async fn refresh(&self) -> Result<(), AuthError> {
        tracing::debug!(target: "authz.jwks", url = %self.jwks_url, "fetching key set from issuer");

        let response = self
            .http_client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| {
                metrics::record_jwks_fetch("error");
                AuthError::KeyRetrieval(format!("JWKS endpoint unreachable: {e}"))
            })?;

        if !response.status().is_success() {
            metrics::record_jwks_fetch("error");
            return Err(AuthError::KeyRetrieval(format!(
                "JWKS endpoint returned status {}",
                response.status()
            )));
        }

        let jwks: JwksResponse = response.json().await.map_err(|e| {
            metrics::record_jwks_fetch("error");
            AuthError::KeyRetrieval(format!("malformed JWKS document: {e}"))
        })?;

        let keys: HashMap<String, Jwk> = jwks
            .keys
            .into_iter()
            .map(|key| (key.kid.clone(), key))
            .collect();

        tracing::info!(
            target: "authz.jwks",
            key_count = keys.len(),
            "key set cache refreshed"
        );
        metrics::record_jwks_fetch("success");

        // Swap the map whole so readers never see a partial key set.
        let mut cache = self.cache.write().await;
        *cache = Some(keys);

        Ok(())
    }
}
