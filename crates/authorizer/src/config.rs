//! Authorizer configuration.
//!
//! Loaded from environment variables. The JWKS URL defaults to the
//! trusted issuer's well-known path; everything else has a sensible
//! default except the issuer and audience, which must be explicit.

use crate::auth::validator::{DEFAULT_CLOCK_SKEW, MAX_CLOCK_SKEW};
use std::collections::HashMap;
use std::env;
use thiserror::Error;

/// Default HTTP bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Well-known JWKS path appended to the issuer when no explicit URL is set.
pub const JWKS_WELL_KNOWN_PATH: &str = "/.well-known/jwks.json";

/// Authorizer configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Trusted issuer; the only `iss` claim value accepted.
    pub issuer: String,

    /// Audience this API is registered as; the only `aud` claim accepted.
    pub audience: String,

    /// URL of the issuer's JWKS endpoint.
    pub jwks_url: String,

    /// JWT clock skew tolerance in seconds for token validation.
    pub jwt_clock_skew_seconds: i64,

    /// Server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid JWT clock skew configuration: {0}")]
    InvalidJwtClockSkew(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let issuer = vars
            .get("TRUSTED_ISSUER")
            .ok_or_else(|| ConfigError::MissingEnvVar("TRUSTED_ISSUER".to_string()))?
            .clone();

        let audience = vars
            .get("TOKEN_AUDIENCE")
            .ok_or_else(|| ConfigError::MissingEnvVar("TOKEN_AUDIENCE".to_string()))?
            .clone();

        let jwks_url = vars.get("JWKS_URL").cloned().unwrap_or_else(|| {
            format!("{}{}", issuer.trim_end_matches('/'), JWKS_WELL_KNOWN_PATH)
        });

        // Parse JWT clock skew tolerance with validation
        let jwt_clock_skew_seconds = if let Some(value_str) = vars.get("JWT_CLOCK_SKEW_SECONDS") {
            let value: i64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidJwtClockSkew(format!(
                    "JWT_CLOCK_SKEW_SECONDS must be a valid integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if value <= 0 {
                return Err(ConfigError::InvalidJwtClockSkew(format!(
                    "JWT_CLOCK_SKEW_SECONDS must be positive, got {}",
                    value
                )));
            }

            if value > MAX_CLOCK_SKEW.as_secs() as i64 {
                return Err(ConfigError::InvalidJwtClockSkew(format!(
                    "JWT_CLOCK_SKEW_SECONDS must not exceed {} seconds, got {}",
                    MAX_CLOCK_SKEW.as_secs(),
                    value
                )));
            }

            value
        } else {
            DEFAULT_CLOCK_SKEW.as_secs() as i64
        };

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        Ok(Config {
            issuer,
            audience,
            jwks_url,
            jwt_clock_skew_seconds,
            bind_address,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn base_vars() -> HashMap<String, String> {
        HashMap::from([
            (
                "TRUSTED_ISSUER".to_string(),
                "https://idp.forms.example.com".to_string(),
            ),
            ("TOKEN_AUDIENCE".to_string(), "forms-api".to_string()),
        ])
    }

    #[test]
    fn test_from_vars_success_with_defaults() {
        let config = Config::from_vars(&base_vars()).expect("Config should load successfully");

        assert_eq!(config.issuer, "https://idp.forms.example.com");
        assert_eq!(config.audience, "forms-api");
        assert_eq!(
            config.jwks_url,
            "https://idp.forms.example.com/.well-known/jwks.json"
        );
        assert_eq!(
            config.jwt_clock_skew_seconds,
            DEFAULT_CLOCK_SKEW.as_secs() as i64
        );
        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
    }

    #[test]
    fn test_jwks_url_derivation_strips_trailing_slash() {
        let mut vars = base_vars();
        vars.insert(
            "TRUSTED_ISSUER".to_string(),
            "https://idp.forms.example.com/".to_string(),
        );

        let config = Config::from_vars(&vars).expect("Config should load successfully");
        assert_eq!(
            config.jwks_url,
            "https://idp.forms.example.com/.well-known/jwks.json"
        );
    }

    #[test]
    fn test_explicit_jwks_url_wins() {
        let mut vars = base_vars();
        vars.insert(
            "JWKS_URL".to_string(),
            "https://keys.example.com/jwks".to_string(),
        );

        let config = Config::from_vars(&vars).expect("Config should load successfully");
        assert_eq!(config.jwks_url, "https://keys.example.com/jwks");
    }

    #[test]
    fn test_missing_issuer() {
        let vars = HashMap::from([("TOKEN_AUDIENCE".to_string(), "forms-api".to_string())]);

        let result = Config::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(v)) if v == "TRUSTED_ISSUER"));
    }

    #[test]
    fn test_missing_audience() {
        let vars = HashMap::from([(
            "TRUSTED_ISSUER".to_string(),
            "https://idp.forms.example.com".to_string(),
        )]);

        let result = Config::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(v)) if v == "TOKEN_AUDIENCE"));
    }

    #[test]
    fn test_jwt_clock_skew_rejects_zero() {
        let mut vars = base_vars();
        vars.insert("JWT_CLOCK_SKEW_SECONDS".to_string(), "0".to_string());

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidJwtClockSkew(msg)) if msg.contains("must be positive"))
        );
    }

    #[test]
    fn test_jwt_clock_skew_rejects_too_large() {
        let mut vars = base_vars();
        vars.insert("JWT_CLOCK_SKEW_SECONDS".to_string(), "601".to_string());

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidJwtClockSkew(msg)) if msg.contains("must not exceed 600"))
        );
    }

    #[test]
    fn test_jwt_clock_skew_accepts_max() {
        let mut vars = base_vars();
        vars.insert("JWT_CLOCK_SKEW_SECONDS".to_string(), "600".to_string());

        let config = Config::from_vars(&vars).expect("Config should load successfully");
        assert_eq!(config.jwt_clock_skew_seconds, 600);
    }

    #[test]
    fn test_jwt_clock_skew_rejects_non_numeric() {
        let mut vars = base_vars();
        vars.insert(
            "JWT_CLOCK_SKEW_SECONDS".to_string(),
            "five-minutes".to_string(),
        );

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidJwtClockSkew(msg)) if msg.contains("must be a valid integer"))
        );
    }
}
