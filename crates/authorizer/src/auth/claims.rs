//! Validated token claims.
//!
//! The claim set is returned decoded and unmodified by the validator;
//! downstream stages (scope enforcement, identity extraction) read it
//! without re-encoding. Subject and identifier claims may contain citizen
//! identifiers and are redacted in Debug output.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Claims carried by a validated access token.
///
/// Two issuance patterns reach this authorizer: tokens minted for the
/// forms domain carry explicit `identifier`/`type` claims, while generic
/// OAuth client-credentials tokens carry only `sub`. All identity-bearing
/// fields are therefore optional; their interpretation lives in
/// [`crate::identity::Identity::from_claims`].
#[derive(Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - redacted in Debug output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Expiration timestamp (Unix epoch seconds).
    pub exp: i64,

    /// Issued-at timestamp (Unix epoch seconds).
    pub iat: i64,

    /// Space-separated scopes granted to this token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Domain-specific caller identifier - redacted in Debug output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,

    /// Domain-specific caller type (`person`, `system`, `organization`).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub identifier_type: Option<String>,
}

/// Custom Debug implementation that redacts caller identifiers.
impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claims")
            .field("sub", &self.sub.as_ref().map(|_| "[REDACTED]"))
            .field("exp", &self.exp)
            .field("iat", &self.iat)
            .field("scope", &self.scope)
            .field("identifier", &self.identifier.as_ref().map(|_| "[REDACTED]"))
            .field("identifier_type", &self.identifier_type)
            .finish()
    }
}

impl Claims {
    /// Check if the token carries a specific scope.
    ///
    /// Scopes are space-separated; matching is exact per token, never by
    /// prefix. An absent scope claim matches nothing.
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scope
            .as_deref()
            .is_some_and(|s| s.split_whitespace().any(|t| t == scope))
    }
}
