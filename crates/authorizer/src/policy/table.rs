//! Static endpoint authorization table and scope enforcement.
//!
//! The table is the single place that ties API operations to scopes. It
//! is fully enumerated at compile time; an endpoint the gateway exposes
//! but that has no row here is a configuration defect and is denied with
//! a distinct failure kind so it stands out in logs.

use crate::auth::Claims;
use crate::errors::AuthError;

/// One row of the authorization table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointRule {
    /// HTTP verb, matched exactly.
    pub method: &'static str,

    /// Matches when the request path starts with this prefix.
    pub path_prefix: &'static str,

    /// Scope that must appear in the token's space-delimited scope claim.
    pub required_scope: &'static str,
}

/// The authorization table, evaluated in declaration order.
pub const ENDPOINT_RULES: &[EndpointRule] = &[
    EndpointRule {
        method: "GET",
        path_prefix: "/formoverview",
        required_scope: "form-overview",
    },
    EndpointRule {
        method: "GET",
        path_prefix: "/listformoverviews",
        required_scope: "form-overview",
    },
    EndpointRule {
        method: "GET",
        path_prefix: "/downloadformoverview",
        required_scope: "form-overview",
    },
    EndpointRule {
        method: "GET",
        path_prefix: "/submissions",
        required_scope: "submissions:read-own",
    },
];

/// Find the rule for a request. First match wins.
///
/// # Errors
///
/// Returns `AuthError::UnconfiguredEndpoint` when no rule covers the
/// (method, path) pair.
pub fn match_rule(method: &str, path: &str) -> Result<&'static EndpointRule, AuthError> {
    ENDPOINT_RULES
        .iter()
        .find(|rule| rule.method == method && path.starts_with(rule.path_prefix))
        .ok_or_else(|| AuthError::UnconfiguredEndpoint {
            method: method.to_string(),
            path: path.to_string(),
        })
}

/// Check the token's scope claim against a rule. Pure predicate.
///
/// # Errors
///
/// Returns `AuthError::InsufficientScope` when the scope claim is absent
/// or does not contain the required scope as an exact token. The error
/// carries the caller identifier (explicit `identifier` claim, else
/// `sub`) for the authorization event log.
pub fn enforce_scope(claims: &Claims, rule: &EndpointRule) -> Result<(), AuthError> {
    if claims.has_scope(rule.required_scope) {
        Ok(())
    } else {
        Err(AuthError::InsufficientScope {
            required: rule.required_scope.to_string(),
            identifier: claims.identifier.clone().or_else(|| claims.sub.clone()),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn claims_with_scope(scope: Option<&str>) -> Claims {
        Claims {
            sub: Some("123456782".to_string()),
            exp: 1_234_567_890,
            iat: 1_234_567_800,
            scope: scope.map(ToString::to_string),
            identifier: None,
            identifier_type: None,
        }
    }

    #[test]
    fn test_no_rule_has_empty_scope() {
        for rule in ENDPOINT_RULES {
            assert!(
                !rule.required_scope.is_empty(),
                "rule for {} {} has an empty scope",
                rule.method,
                rule.path_prefix
            );
        }
    }

    #[test]
    fn test_match_every_declared_endpoint() {
        assert_eq!(
            match_rule("GET", "/formoverview").unwrap().required_scope,
            "form-overview"
        );
        assert_eq!(
            match_rule("GET", "/listformoverviews").unwrap().required_scope,
            "form-overview"
        );
        assert_eq!(
            match_rule("GET", "/downloadformoverview")
                .unwrap()
                .required_scope,
            "form-overview"
        );
        assert_eq!(
            match_rule("GET", "/submissions").unwrap().required_scope,
            "submissions:read-own"
        );
    }

    #[test]
    fn test_prefix_match_covers_subpaths() {
        assert_eq!(
            match_rule("GET", "/submissions?formuuid=abc")
                .unwrap()
                .required_scope,
            "submissions:read-own"
        );
        assert_eq!(
            match_rule("GET", "/downloadformoverview/report.csv")
                .unwrap()
                .required_scope,
            "form-overview"
        );
    }

    #[test]
    fn test_undeclared_method_is_unconfigured() {
        let result = match_rule("POST", "/submissions");
        assert!(matches!(
            result,
            Err(AuthError::UnconfiguredEndpoint { ref method, .. }) if method == "POST"
        ));
    }

    #[test]
    fn test_undeclared_path_is_unconfigured() {
        assert!(matches!(
            match_rule("GET", "/forms"),
            Err(AuthError::UnconfiguredEndpoint { .. })
        ));
    }

    #[test]
    fn test_method_match_is_exact() {
        // Lower-case verbs are not normalized here; the gateway sends
        // upper-case methods.
        assert!(match_rule("get", "/submissions").is_err());
    }

    #[test]
    fn test_first_match_wins_follows_declaration_order() {
        // "/formoverview" precedes "/listformoverviews"; a path matching
        // both prefixes resolves to the earlier row.
        let rule = match_rule("GET", "/formoverview/extra").unwrap();
        assert_eq!(rule.path_prefix, "/formoverview");
    }

    #[test]
    fn test_enforce_scope_accepts_exact_token() {
        let rule = match_rule("GET", "/submissions").unwrap();
        let claims = claims_with_scope(Some("form-overview submissions:read-own"));

        assert!(enforce_scope(&claims, rule).is_ok());
    }

    #[test]
    fn test_enforce_scope_rejects_missing_scope() {
        let rule = match_rule("GET", "/formoverview").unwrap();
        let claims = claims_with_scope(Some("submissions:read-own"));

        assert!(matches!(
            enforce_scope(&claims, rule),
            Err(AuthError::InsufficientScope { ref required, .. }) if required == "form-overview"
        ));
    }

    #[test]
    fn test_enforce_scope_rejects_absent_claim() {
        let rule = match_rule("GET", "/submissions").unwrap();
        let claims = claims_with_scope(None);

        assert!(matches!(
            enforce_scope(&claims, rule),
            Err(AuthError::InsufficientScope { .. })
        ));
    }

    #[test]
    fn test_insufficient_scope_carries_explicit_identifier() {
        let rule = match_rule("GET", "/formoverview").unwrap();
        let mut claims = claims_with_scope(Some("submissions:read-own"));
        claims.identifier = Some("999993653".to_string());

        let Err(AuthError::InsufficientScope { identifier, .. }) = enforce_scope(&claims, rule)
        else {
            unreachable!("scope check must fail");
        };
        assert_eq!(identifier.as_deref(), Some("999993653"));
    }

    #[test]
    fn test_insufficient_scope_falls_back_to_sub_identifier() {
        let rule = match_rule("GET", "/formoverview").unwrap();
        let claims = claims_with_scope(Some("submissions:read-own"));

        let Err(AuthError::InsufficientScope { identifier, .. }) = enforce_scope(&claims, rule)
        else {
            unreachable!("scope check must fail");
        };
        assert_eq!(identifier.as_deref(), Some("123456782"));
    }

    #[test]
    fn test_enforce_scope_rejects_partial_token() {
        let rule = match_rule("GET", "/submissions").unwrap();
        let claims = claims_with_scope(Some("submissions:read-own-extended"));

        assert!(enforce_scope(&claims, rule).is_err());
    }
}
