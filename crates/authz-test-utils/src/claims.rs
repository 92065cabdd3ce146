//! Claim-set builder for test tokens.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// The full claim set a test token carries on the wire.
///
/// Unlike the authorizer's own claims type, this includes the registered
/// `iss` and `aud` claims, because signed test tokens must satisfy issuer
/// and audience validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    pub iss: String,

    pub aud: String,

    pub exp: i64,

    pub iat: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub identity_type: Option<String>,
}

impl TokenClaims {
    /// A currently-valid claim set for the given issuer and audience,
    /// with no subject and no scope. Chain the `with_*` methods to
    /// populate the rest.
    pub fn valid(issuer: &str, audience: &str) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: None,
            iss: issuer.to_string(),
            aud: audience.to_string(),
            exp: now + 3600,
            iat: now,
            scope: None,
            identifier: None,
            identity_type: None,
        }
    }

    pub fn with_sub(mut self, sub: &str) -> Self {
        self.sub = Some(sub.to_string());
        self
    }

    pub fn with_scope(mut self, scope: &str) -> Self {
        self.scope = Some(scope.to_string());
        self
    }

    pub fn with_identity(mut self, identifier: &str, identity_type: &str) -> Self {
        self.identifier = Some(identifier.to_string());
        self.identity_type = Some(identity_type.to_string());
        self
    }

    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.iss = issuer.to_string();
        self
    }

    pub fn with_audience(mut self, audience: &str) -> Self {
        self.aud = audience.to_string();
        self
    }

    /// Expired one hour ago, issued two hours ago.
    pub fn expired(mut self) -> Self {
        let now = Utc::now().timestamp();
        self.exp = now - 3600;
        self.iat = now - 7200;
        self
    }

    /// Issued one hour in the future (beyond any sane clock skew).
    pub fn future_iat(mut self) -> Self {
        let now = Utc::now().timestamp();
        self.exp = now + 7200;
        self.iat = now + 3600;
        self
    }
}
