//! Caller identity model and extraction.
//!
//! The identity travels in the decision's context and is what downstream
//! handlers use to restrict results to records owned by the caller. It is
//! built fresh from token claims on every request and never persisted.

use crate::auth::Claims;
use crate::errors::AuthError;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Kind of caller an identity represents.
///
/// Closed over the three kinds the platform knows. Tokens minted by a
/// newer issuer version may carry a type this build does not recognize;
/// such values are forwarded verbatim through `Other` rather than coerced,
/// so the downstream owner filter can make its own call.
#[derive(Clone, PartialEq, Eq)]
pub enum IdentityType {
    /// A natural person (citizen).
    Person,
    /// A machine client authenticated via client credentials.
    System,
    /// An organization.
    Organization,
    /// An unrecognized type claim, forwarded as-is.
    Other(String),
}

impl IdentityType {
    /// Parse a type claim. Never fails; unknown values become `Other`.
    pub fn parse(value: &str) -> Self {
        match value {
            "person" => IdentityType::Person,
            "system" => IdentityType::System,
            "organization" => IdentityType::Organization,
            other => IdentityType::Other(other.to_string()),
        }
    }

    /// The wire representation of this type.
    pub fn as_str(&self) -> &str {
        match self {
            IdentityType::Person => "person",
            IdentityType::System => "system",
            IdentityType::Organization => "organization",
            IdentityType::Other(value) => value,
        }
    }
}

impl fmt::Debug for IdentityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for IdentityType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for IdentityType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        if value.is_empty() {
            return Err(D::Error::custom("identity type must be non-empty"));
        }
        Ok(IdentityType::parse(&value))
    }
}

/// The caller a validated request acts on behalf of.
///
/// `identifier` is guaranteed non-empty by construction; the absence of
/// any usable subject claim is a hard failure, never a default identity.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Person, system, or organization identifier - redacted in Debug output.
    pub identifier: String,

    /// What kind of caller the identifier names.
    #[serde(rename = "type")]
    pub identity_type: IdentityType,
}

/// Custom Debug implementation that redacts the identifier.
impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("identifier", &"[REDACTED]")
            .field("identity_type", &self.identity_type)
            .finish()
    }
}

impl Identity {
    /// Derive the caller identity from validated claims.
    ///
    /// Resolution order, first match wins:
    ///
    /// 1. Explicit `identifier` and `type` claims, used verbatim. These
    ///    are minted by the forms-domain issuer.
    /// 2. A standard `sub` claim, conservatively typed `system`. This is
    ///    the generic client-credentials pattern.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingSubject` when neither rule yields a
    /// non-empty identifier.
    pub fn from_claims(claims: &Claims) -> Result<Self, AuthError> {
        if let (Some(identifier), Some(identifier_type)) =
            (claims.identifier.as_deref(), claims.identifier_type.as_deref())
        {
            if !identifier.is_empty() {
                return Ok(Identity {
                    identifier: identifier.to_string(),
                    identity_type: IdentityType::parse(identifier_type),
                });
            }
        }

        match claims.sub.as_deref() {
            Some(sub) if !sub.is_empty() => Ok(Identity {
                identifier: sub.to_string(),
                identity_type: IdentityType::System,
            }),
            _ => Err(AuthError::MissingSubject),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn claims(
        sub: Option<&str>,
        identifier: Option<&str>,
        identifier_type: Option<&str>,
    ) -> Claims {
        Claims {
            sub: sub.map(ToString::to_string),
            exp: 1_234_567_890,
            iat: 1_234_567_800,
            scope: Some("submissions:read-own".to_string()),
            identifier: identifier.map(ToString::to_string),
            identifier_type: identifier_type.map(ToString::to_string),
        }
    }

    #[test]
    fn test_explicit_identifier_and_type_used_verbatim() {
        let identity =
            Identity::from_claims(&claims(None, Some("999993653"), Some("person"))).unwrap();

        assert_eq!(identity.identifier, "999993653");
        assert_eq!(identity.identity_type, IdentityType::Person);
    }

    #[test]
    fn test_explicit_claims_win_over_sub() {
        let identity = Identity::from_claims(&claims(
            Some("client-abc"),
            Some("69599084"),
            Some("organization"),
        ))
        .unwrap();

        assert_eq!(identity.identifier, "69599084");
        assert_eq!(identity.identity_type, IdentityType::Organization);
    }

    #[test]
    fn test_unrecognized_type_forwarded_as_is() {
        let identity =
            Identity::from_claims(&claims(None, Some("dep-42"), Some("department"))).unwrap();

        assert_eq!(
            identity.identity_type,
            IdentityType::Other("department".to_string())
        );
        assert_eq!(identity.identity_type.as_str(), "department");
    }

    #[test]
    fn test_sub_fallback_is_typed_system() {
        let identity = Identity::from_claims(&claims(Some("123456782"), None, None)).unwrap();

        assert_eq!(identity.identifier, "123456782");
        assert_eq!(identity.identity_type, IdentityType::System);
    }

    #[test]
    fn test_identifier_without_type_falls_back_to_sub() {
        // Rule 1 requires both claims; a lone identifier is not enough.
        let identity =
            Identity::from_claims(&claims(Some("client-abc"), Some("999993653"), None)).unwrap();

        assert_eq!(identity.identifier, "client-abc");
        assert_eq!(identity.identity_type, IdentityType::System);
    }

    #[test]
    fn test_no_usable_subject_is_hard_failure() {
        assert!(matches!(
            Identity::from_claims(&claims(None, None, None)),
            Err(AuthError::MissingSubject)
        ));
    }

    #[test]
    fn test_empty_sub_is_hard_failure() {
        assert!(matches!(
            Identity::from_claims(&claims(Some(""), None, None)),
            Err(AuthError::MissingSubject)
        ));
    }

    #[test]
    fn test_empty_explicit_identifier_falls_through_to_sub() {
        let identity =
            Identity::from_claims(&claims(Some("client-abc"), Some(""), Some("person"))).unwrap();

        assert_eq!(identity.identifier, "client-abc");
        assert_eq!(identity.identity_type, IdentityType::System);
    }

    #[test]
    fn test_serialization_shape() {
        let identity = Identity {
            identifier: "999993653".to_string(),
            identity_type: IdentityType::Person,
        };

        let json = serde_json::to_value(&identity).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"identifier": "999993653", "type": "person"})
        );
    }

    #[test]
    fn test_debug_redacts_identifier() {
        let identity = Identity {
            identifier: "999993653".to_string(),
            identity_type: IdentityType::Person,
        };

        let debug_str = format!("{:?}", identity);
        assert!(!debug_str.contains("999993653"));
        assert!(debug_str.contains("[REDACTED]"));
    }
}
