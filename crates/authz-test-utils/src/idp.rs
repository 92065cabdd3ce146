//! Mock identity provider.
//!
//! Wraps a wiremock server that serves a JWKS document at the standard
//! well-known path, plus a default signing keypair. The server's URI
//! doubles as the trusted issuer in tests.

use crate::claims::TokenClaims;
use crate::keys::TestKeypair;
use serde::Serialize;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A mock identity provider with a JWKS endpoint.
pub struct MockIdp {
    server: MockServer,
    keypair: TestKeypair,
}

impl MockIdp {
    /// Start the provider with a default keypair published in its JWKS.
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let keypair = TestKeypair::new(1, "forms-key-01");

        let idp = Self { server, keypair };
        idp.publish_jwks(&[&idp.keypair]).await;
        idp
    }

    /// The issuer URI tokens from this provider carry.
    pub fn issuer(&self) -> String {
        self.server.uri()
    }

    /// The key ID of the default published keypair.
    pub fn kid(&self) -> &str {
        self.keypair.kid()
    }

    /// A currently-valid claim set for this issuer.
    pub fn claims(&self, audience: &str) -> TokenClaims {
        TokenClaims::valid(&self.issuer(), audience)
    }

    /// Sign a claim set with the provider's default keypair.
    pub fn sign<C: Serialize>(&self, claims: &C) -> String {
        self.keypair.sign_token(claims)
    }

    /// Replace the published JWKS with the given keys.
    ///
    /// Signing keys already handed out keep working for signing; only the
    /// published (verification) side changes. Use this to simulate key
    /// rotation at the provider.
    pub async fn publish_jwks(&self, keys: &[&TestKeypair]) {
        let jwks = serde_json::json!({
            "keys": keys.iter().map(|k| k.jwk_json()).collect::<Vec<_>>()
        });

        self.server.reset().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/jwks.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&jwks))
            .mount(&self.server)
            .await;
    }

    /// Serve a malformed JWKS document (valid HTTP, broken body).
    pub async fn publish_malformed_jwks(&self) {
        self.server.reset().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/jwks.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not a jwks document"))
            .mount(&self.server)
            .await;
    }

    /// Make the JWKS endpoint return a server error.
    pub async fn publish_jwks_error(&self, status: u16) {
        self.server.reset().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/jwks.json"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }
}
