//! Authorizer failure taxonomy.
//!
//! Every failed authorization maps to exactly one of these variants. The
//! gateway-facing decision is a uniform Deny; the variant only determines
//! how the failure is logged and counted. Messages carried inside variants
//! are for server-side logs and never reach the caller.

use thiserror::Error;

/// A reason the authorizer denied a request.
///
/// Variants are ordered by pipeline stage: token extraction, key
/// retrieval, token validation, endpoint matching, scope enforcement,
/// identity extraction.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No `Authorization` header, or the header does not carry a bearer token.
    #[error("no bearer token presented")]
    NoToken,

    /// The issuer's JWKS endpoint was unreachable or returned malformed data.
    /// This is a provider-health problem, not a caller error.
    #[error("key retrieval failed: {0}")]
    KeyRetrieval(String),

    /// Signature, expiry, issuer, or audience validation failed.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// The gateway exposed an endpoint that has no rule in the policy
    /// table. A configuration defect, not a caller error.
    #[error("no authorization rule for {method} {path}")]
    UnconfiguredEndpoint { method: String, path: String },

    /// The token is valid but its scope claim lacks the required scope.
    /// Carries the caller identifier, when the claims hold one, so the
    /// authorization event log can name who was refused.
    #[error("token lacks required scope {required}")]
    InsufficientScope {
        required: String,
        identifier: Option<String>,
    },

    /// The token is valid and in scope but carries no usable subject claim.
    #[error("token carries no usable subject claim")]
    MissingSubject,
}

impl AuthError {
    /// Stable label for logs and the `reason` metric dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::NoToken => "no_token",
            AuthError::KeyRetrieval(_) => "key_retrieval",
            AuthError::InvalidToken(_) => "invalid_token",
            AuthError::UnconfiguredEndpoint { .. } => "unconfigured_endpoint",
            AuthError::InsufficientScope { .. } => "insufficient_scope",
            AuthError::MissingSubject => "missing_subject",
        }
    }
}
