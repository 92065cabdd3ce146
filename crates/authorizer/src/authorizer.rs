//! The end-to-end authorize pipeline.
//!
//! Linear decision procedure: extract bearer token, validate it, match
//! the endpoint rule, enforce the scope, extract the identity, synthesize
//! the decision. No retries; every request is evaluated exactly once and
//! produces exactly one complete Allow or Deny.

use crate::auth::{JwksClient, TokenValidator};
use crate::config::Config;
use crate::errors::AuthError;
use crate::identity::Identity;
use crate::observability::metrics;
use crate::policy::{enforce_scope, match_rule, Decision};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

/// The request description the gateway submits for evaluation.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizeRequest {
    /// HTTP verb of the guarded request.
    pub method: String,

    /// Path of the guarded request.
    pub path: String,

    /// Raw `Authorization` header value, if any.
    #[serde(default)]
    pub authorization: Option<String>,

    /// Gateway-side resource identifier (method ARN or equivalent) the
    /// decision applies to. Defaults to `"<method> <path>"`.
    #[serde(default)]
    pub resource: Option<String>,
}

impl AuthorizeRequest {
    /// The resource identifier the decision is written against.
    pub fn resource(&self) -> String {
        self.resource
            .clone()
            .unwrap_or_else(|| format!("{} {}", self.method, self.path))
    }

    /// The bearer token, if the header carries one.
    fn bearer_token(&self) -> Result<&str, AuthError> {
        self.authorization
            .as_deref()
            .and_then(|header| header.strip_prefix("Bearer "))
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::NoToken)
    }
}

/// The request authorizer. One instance is shared across all requests;
/// the only shared mutable state is the key set cache inside the JWKS
/// client.
pub struct Authorizer {
    validator: TokenValidator,
}

impl Authorizer {
    /// Build an authorizer from configuration.
    pub fn from_config(config: &Config) -> Self {
        let jwks_client = Arc::new(JwksClient::new(config.jwks_url.clone()));
        let validator = TokenValidator::new(
            jwks_client,
            config.issuer.clone(),
            config.audience.clone(),
            config.jwt_clock_skew_seconds,
        );
        Self { validator }
    }

    /// Evaluate a request to its gateway-facing decision.
    ///
    /// Failures never escape: every denial reason collapses into a
    /// uniform Deny on the wire, distinguishable only in logs and
    /// metrics.
    #[instrument(skip_all, fields(method = %request.method, path = %request.path))]
    pub async fn authorize(&self, request: &AuthorizeRequest) -> Decision {
        let resource = request.resource();
        match self.evaluate(request).await {
            Ok(decision) => {
                metrics::record_decision("allow", "allowed");
                decision
            }
            Err(error) => {
                self.log_denial(&error, request);
                metrics::record_decision("deny", error.kind());
                Decision::deny(&resource)
            }
        }
    }

    /// The fallible pipeline behind [`authorize`](Self::authorize).
    ///
    /// Exposed so tests can observe the denial kind, which the wire
    /// decision deliberately hides.
    pub async fn evaluate(&self, request: &AuthorizeRequest) -> Result<Decision, AuthError> {
        let token = request.bearer_token()?;

        let claims = self.validator.validate(token).await?;

        let rule = match_rule(&request.method, &request.path)?;

        enforce_scope(&claims, rule)?;

        let identity = Identity::from_claims(&claims)?;

        tracing::debug!(
            target: "authz.decision",
            identity_type = %identity.identity_type.as_str(),
            scope = %rule.required_scope,
            "request allowed"
        );

        Ok(Decision::allow(&request.resource(), identity))
    }

    /// Log a denial at the severity its kind warrants.
    fn log_denial(&self, error: &AuthError, request: &AuthorizeRequest) {
        let method = request.method.as_str();
        let path = request.path.as_str();
        match error {
            AuthError::NoToken => {
                tracing::debug!(target: "authz.decision", %method, %path, "request without bearer token");
            }
            AuthError::KeyRetrieval(reason) => {
                // Provider-health problem, not a caller error.
                tracing::error!(target: "authz.jwks", reason = %reason, "identity provider key retrieval failed");
            }
            AuthError::InvalidToken(reason) => {
                tracing::warn!(target: "authz.jwt", reason = %reason, %method, %path, "token rejected");
            }
            AuthError::UnconfiguredEndpoint { .. } => {
                // The gateway exposes an endpoint this table cannot evaluate.
                tracing::error!(target: "authz.policy", %method, %path, "no authorization rule for exposed endpoint");
            }
            AuthError::InsufficientScope {
                required,
                identifier,
            } => {
                // Authorization event: name who was refused when the claims say.
                tracing::info!(
                    target: "authz.policy",
                    required = %required,
                    identifier = identifier.as_deref().unwrap_or("unknown"),
                    %method,
                    %path,
                    "token lacks required scope"
                );
            }
            AuthError::MissingSubject => {
                tracing::warn!(target: "authz.jwt", %method, %path, "valid token carries no usable subject claim");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn request(authorization: Option<&str>) -> AuthorizeRequest {
        AuthorizeRequest {
            method: "GET".to_string(),
            path: "/submissions".to_string(),
            authorization: authorization.map(ToString::to_string),
            resource: None,
        }
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(
            request(Some("Bearer abc.def.ghi")).bearer_token().unwrap(),
            "abc.def.ghi"
        );
    }

    #[test]
    fn test_missing_header_is_no_token() {
        assert!(matches!(
            request(None).bearer_token(),
            Err(AuthError::NoToken)
        ));
    }

    #[test]
    fn test_non_bearer_scheme_is_no_token() {
        assert!(matches!(
            request(Some("Basic dXNlcjpwdw==")).bearer_token(),
            Err(AuthError::NoToken)
        ));
    }

    #[test]
    fn test_empty_bearer_is_no_token() {
        assert!(matches!(
            request(Some("Bearer ")).bearer_token(),
            Err(AuthError::NoToken)
        ));
    }

    #[test]
    fn test_default_resource_is_method_and_path() {
        assert_eq!(request(None).resource(), "GET /submissions");
    }

    #[test]
    fn test_explicit_resource_wins() {
        let req = AuthorizeRequest {
            resource: Some(
                "arn:aws:execute-api:eu-west-1:123456789012:api/prod/GET/submissions".to_string(),
            ),
            ..request(None)
        };
        assert!(req.resource().starts_with("arn:aws:execute-api"));
    }

    #[test]
    fn test_request_deserialization() {
        let json = r#"{"method":"GET","path":"/submissions","authorization":"Bearer t"}"#;
        let req: AuthorizeRequest = serde_json::from_str(json).unwrap();

        assert_eq!(req.method, "GET");
        assert_eq!(req.path, "/submissions");
        assert_eq!(req.authorization.as_deref(), Some("Bearer t"));
        assert!(req.resource.is_none());
    }
}
