//! HS256 token verification.
//!
//! Signature checks are done with `jsonwebtoken`; the time window is checked by
//! [`validate_claims`] so the claim format stays RFC 3339 timestamps rather
//! than the numeric `exp`/`iat` registered claims.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use thiserror::Error;

use crate::{JwtClaims, TokenValidationError, validate_claims};

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("malformed or unsigned token: {0}")]
    Decode(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Verifies a bearer token and yields its claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError>;
}

/// Shared-secret (HS256) validator.
pub struct Hs256JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256JwtValidator {
    pub fn new(secret: Vec<u8>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_aud = false;

        Self {
            key: DecodingKey::from_secret(&secret),
            validation,
        }
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError> {
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.key, &self.validation)?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use jsonwebtoken::{EncodingKey, Header};

    use crate::{PrincipalId, Role, DEFAULT_PRINCIPAL_TYPE};

    fn mint(secret: &str, claims: &JwtClaims) -> String {
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims(now: DateTime<Utc>) -> JwtClaims {
        JwtClaims {
            sub: PrincipalId::new(),
            principal_type: DEFAULT_PRINCIPAL_TYPE.to_string(),
            namespaces: None,
            roles: vec![Role::new("operator")],
            issued_at: now - Duration::seconds(5),
            expires_at: now + Duration::minutes(5),
        }
    }

    #[test]
    fn round_trips_a_signed_token() {
        let now = Utc::now();
        let c = claims(now);
        let token = mint("s3cret", &c);

        let v = Hs256JwtValidator::new(b"s3cret".to_vec());
        assert_eq!(v.validate(&token, now).unwrap(), c);
    }

    #[test]
    fn rejects_wrong_secret() {
        let now = Utc::now();
        let token = mint("s3cret", &claims(now));

        let v = Hs256JwtValidator::new(b"other".to_vec());
        assert!(matches!(v.validate(&token, now), Err(JwtError::Decode(_))));
    }

    #[test]
    fn rejects_expired_claims_after_signature_check() {
        let now = Utc::now();
        let token = mint("s3cret", &claims(now));

        let v = Hs256JwtValidator::new(b"s3cret".to_vec());
        let later = now + Duration::hours(1);
        assert!(matches!(
            v.validate(&token, later),
            Err(JwtError::Claims(TokenValidationError::Expired))
        ));
    }
}
