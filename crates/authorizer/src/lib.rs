//! Forms Platform Request Authorizer
//!
//! This library implements the token authorizer that guards the forms
//! platform API. Given a request description (HTTP method, path, and
//! `Authorization` header), it:
//!
//! - validates the bearer token against the trusted issuer's published
//!   key set (fetched from its JWKS endpoint and cached in-process),
//! - looks up the required scope for the invoked endpoint in a static
//!   policy table,
//! - enforces that the token carries the required scope,
//! - extracts the caller identity from the token claims, and
//! - synthesizes an IAM-style Allow/Deny policy document for the
//!   invoking gateway layer.
//!
//! # Architecture
//!
//! ```text
//! routes.rs -> authorizer.rs -> auth/* (key set, validation)
//!                            -> policy/* (rule table, decision)
//!                            -> identity.rs (caller identity)
//! ```
//!
//! # Modules
//!
//! - `config` - Service configuration from environment
//! - `errors` - Denial taxonomy (one variant per failure kind)
//! - `auth` - JWKS client and token validation
//! - `policy` - Endpoint rule table and decision synthesis
//! - `identity` - Caller identity model and extraction
//! - `authorizer` - End-to-end authorize pipeline
//! - `routes` - Axum router setup

pub mod auth;
pub mod authorizer;
pub mod config;
pub mod errors;
pub mod identity;
pub mod observability;
pub mod policy;
pub mod routes;
