//! `medthing-auth`: bearer token boundary.
//!
//! Decoupled from HTTP: the API crate extracts the header, this crate decodes
//! and validates it.

pub mod claims;
pub mod jwt;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtError, JwtValidator};
