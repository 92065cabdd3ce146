//! Token authentication: JWKS key resolution and JWT validation.

pub mod claims;
pub mod jwks;
pub mod validator;

pub use claims::Claims;
pub use jwks::JwksClient;
pub use validator::TokenValidator;
