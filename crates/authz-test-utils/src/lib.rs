//! # Authorizer Test Utilities
//!
//! Shared test utilities for the request authorizer:
//!
//! - Deterministic Ed25519 keypairs and token signing (`keys`, `claims`)
//! - A mock identity provider serving a JWKS endpoint (`idp`)
//! - A server harness spawning the real authorizer service (`server_harness`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use authz_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> anyhow::Result<()> {
//!     let idp = MockIdp::start().await;
//!     let token = idp.sign(&TokenClaims::valid(&idp.issuer(), "forms-api").with_sub("client-1"));
//!     // ... evaluate a request carrying `token`
//!     Ok(())
//! }
//! ```

pub mod claims;
pub mod idp;
pub mod keys;
pub mod server_harness;

// Re-export commonly used items
pub use claims::TokenClaims;
pub use idp::MockIdp;
pub use keys::TestKeypair;
pub use server_harness::TestAuthorizerServer;
