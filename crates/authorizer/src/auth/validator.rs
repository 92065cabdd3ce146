//! Bearer token validation against the trusted issuer.
//!
//! Validates incoming JWTs using public keys resolved through the
//! [`JwksClient`]. Checks, in order: token size (before any parsing),
//! `kid` extraction, signature (EdDSA only), expiry, issuer, audience,
//! and issued-at clock skew.
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing
//! - Only EdDSA (Ed25519) signatures are accepted; `alg: none` and HMAC
//!   confusion attempts fail at algorithm selection
//! - Detailed failure reasons stay in server-side logs

use crate::auth::claims::Claims;
use crate::auth::jwks::{Jwk, JwksClient};
use crate::errors::AuthError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// Maximum allowed token size in bytes (8KB).
///
/// Oversized tokens are rejected before base64 decoding or any
/// cryptographic work.
pub const MAX_TOKEN_SIZE_BYTES: usize = 8192;

/// Default clock skew tolerance for `iat` validation (5 minutes).
pub const DEFAULT_CLOCK_SKEW: Duration = Duration::from_secs(300);

/// Upper bound on configurable clock skew (10 minutes).
pub const MAX_CLOCK_SKEW: Duration = Duration::from_secs(600);

/// Token validator bound to one trusted issuer and audience.
pub struct TokenValidator {
    /// Key resolver for the issuer's published key set.
    jwks_client: Arc<JwksClient>,

    /// The only issuer whose tokens are accepted (`iss` claim).
    issuer: String,

    /// The audience this API is registered as (`aud` claim).
    audience: String,

    /// Clock skew tolerance in seconds for iat validation.
    clock_skew_seconds: i64,
}

impl TokenValidator {
    /// Create a new validator.
    pub fn new(
        jwks_client: Arc<JwksClient>,
        issuer: String,
        audience: String,
        clock_skew_seconds: i64,
    ) -> Self {
        Self {
            jwks_client,
            issuer,
            audience,
            clock_skew_seconds,
        }
    }

    /// Validate a token and return its decoded claims unmodified.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for every validation failure and
    /// `AuthError::KeyRetrieval` when the key set cannot be fetched.
    #[instrument(skip_all)]
    pub async fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let kid = extract_kid(token)?;

        let jwk = self.jwks_client.get_key(&kid).await?;

        let claims = verify_token(token, &jwk, &self.issuer, &self.audience)?;

        validate_iat(claims.iat, self.clock_skew_seconds)?;

        tracing::debug!(target: "authz.jwt", "token validated");
        Ok(claims)
    }
}

/// Extract the `kid` from a JWT header without verifying the signature.
///
/// The result is only usable for key lookup in the trusted key set; the
/// token must still be verified against the resolved key.
pub fn extract_kid(token: &str) -> Result<String, AuthError> {
    if token.len() > MAX_TOKEN_SIZE_BYTES {
        tracing::debug!(
            target: "authz.jwt",
            token_size = token.len(),
            "token rejected: size exceeds maximum"
        );
        return Err(AuthError::InvalidToken("token exceeds size limit".to_string()));
    }

    // JWT format: header.payload.signature
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(AuthError::InvalidToken("malformed token structure".to_string()));
    }

    let header_part = parts
        .first()
        .ok_or_else(|| AuthError::InvalidToken("malformed token structure".to_string()))?;
    let header_bytes = URL_SAFE_NO_PAD
        .decode(header_part)
        .map_err(|_| AuthError::InvalidToken("malformed token header encoding".to_string()))?;

    let header: serde_json::Value = serde_json::from_slice(&header_bytes)
        .map_err(|_| AuthError::InvalidToken("malformed token header".to_string()))?;

    // Reject empty kid values as unusable for lookup.
    header
        .get("kid")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| AuthError::InvalidToken("token header carries no key id".to_string()))
}

/// Validate the `iat` claim with clock skew tolerance.
///
/// Rejects tokens issued in the future beyond the tolerance, which would
/// indicate clock drift at the issuer or a manipulated token.
pub fn validate_iat(iat: i64, clock_skew_seconds: i64) -> Result<(), AuthError> {
    validate_iat_at(iat, clock_skew_seconds, chrono::Utc::now().timestamp())
}

/// Deterministic `iat` validation against an explicit `now` timestamp.
///
/// Prefer [`validate_iat`] in production code; this variant exists so
/// boundary conditions can be unit-tested without wall-clock dependence.
fn validate_iat_at(iat: i64, clock_skew_seconds: i64, now: i64) -> Result<(), AuthError> {
    if iat > now + clock_skew_seconds {
        tracing::debug!(
            target: "authz.jwt",
            iat = iat,
            now = now,
            clock_skew_seconds = clock_skew_seconds,
            "token rejected: iat too far in the future"
        );
        return Err(AuthError::InvalidToken(
            "token issued-at is in the future".to_string(),
        ));
    }
    Ok(())
}

/// Verify the signature and registered claims, returning the claim set.
///
/// Accepts EdDSA (Ed25519) exclusively; the expiry, issuer, and audience
/// checks are delegated to `jsonwebtoken`.
fn verify_token(
    token: &str,
    jwk: &Jwk,
    issuer: &str,
    audience: &str,
) -> Result<Claims, AuthError> {
    if jwk.kty != "OKP" {
        tracing::warn!(target: "authz.jwt", kty = %jwk.kty, "unexpected JWK key type");
        return Err(AuthError::InvalidToken("unsupported key type".to_string()));
    }
    if let Some(alg) = &jwk.alg {
        if alg != "EdDSA" {
            tracing::warn!(target: "authz.jwt", alg = %alg, "unexpected JWK algorithm");
            return Err(AuthError::InvalidToken("unsupported key algorithm".to_string()));
        }
    }

    let public_key_b64 = jwk
        .x
        .as_ref()
        .ok_or_else(|| AuthError::InvalidToken("JWK missing public key material".to_string()))?;

    let public_key_bytes = URL_SAFE_NO_PAD
        .decode(public_key_b64)
        .map_err(|_| AuthError::InvalidToken("invalid public key encoding".to_string()))?;

    let decoding_key = DecodingKey::from_ed_der(&public_key_bytes);

    let mut validation = Validation::new(Algorithm::EdDSA);
    validation.validate_exp = true;
    validation.set_issuer(&[issuer]);
    validation.set_audience(&[audience]);

    let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
        tracing::debug!(target: "authz.jwt", error = %e, "token verification failed");
        AuthError::InvalidToken(e.to_string())
    })?;

    Ok(token_data.claims)
}
