//! HS256 token decoding.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::claims::{JwtClaims, TokenValidationError, validate_claims};

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Verifies a bearer token and yields its claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError>;
}

/// Shared-secret (HMAC-SHA256) validator.
pub struct Hs256JwtValidator {
    decoding: DecodingKey,
    encoding: EncodingKey,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();
        Self {
            decoding: DecodingKey::from_secret(secret),
            encoding: EncodingKey::from_secret(secret),
        }
    }

    /// Sign claims with the same secret (dev tooling and tests).
    pub fn sign(&self, claims: &JwtClaims) -> Result<String, JwtError> {
        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            claims,
            &self.encoding,
        )?)
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError> {
        // Time checks run against the caller's clock in `validate_claims`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding, &validation)?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use medthing_core::DoctorId;

    #[test]
    fn signed_token_validates() {
        let v = Hs256JwtValidator::new("secret");
        let claims = JwtClaims::new(DoctorId::new(), Utc::now(), Duration::hours(1));
        let token = v.sign(&claims).unwrap();
        assert_eq!(v.validate(&token, Utc::now()).unwrap(), claims);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let signer = Hs256JwtValidator::new("secret");
        let verifier = Hs256JwtValidator::new("other");
        let claims = JwtClaims::new(DoctorId::new(), Utc::now(), Duration::hours(1));
        let token = signer.sign(&claims).unwrap();
        assert!(matches!(
            verifier.validate(&token, Utc::now()),
            Err(JwtError::Invalid(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected_by_claims_check() {
        let v = Hs256JwtValidator::new("secret");
        let claims = JwtClaims::new(
            DoctorId::new(),
            Utc::now() - Duration::hours(3),
            Duration::hours(1),
        );
        let token = v.sign(&claims).unwrap();
        assert!(matches!(
            v.validate(&token, Utc::now()),
            Err(JwtError::Claims(TokenValidationError::Expired))
        ));
    }

    #[test]
    fn garbage_is_rejected() {
        let v = Hs256JwtValidator::new("secret");
        assert!(v.validate("not.a.token", Utc::now()).is_err());
    }
}
