//! HS256 session token verification.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use thiserror::Error;

use agencyops_auth::{SessionClaims, TokenValidationError, validate_claims};

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, JwtError>;
}

pub struct Hs256JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        // Expiry lives in `SessionClaims` (RFC 3339), not in the registered
        // `exp` claim, and is checked by `validate_claims`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            validation,
        }
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, JwtError> {
        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.key, &self.validation)?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use jsonwebtoken::{EncodingKey, Header};

    use agencyops_core::UserId;

    use super::*;

    fn mint(secret: &str, claims: &SessionClaims) -> String {
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims(ttl_min: i64) -> SessionClaims {
        let now = Utc::now();
        SessionClaims {
            sub: UserId::new(),
            issued_at: now - Duration::minutes(1),
            expires_at: now + Duration::minutes(ttl_min),
        }
    }

    #[test]
    fn accepts_token_signed_with_same_secret() {
        let c = claims(10);
        let v = Hs256JwtValidator::new("s");
        assert_eq!(v.validate(&mint("s", &c), Utc::now()).unwrap(), c);
    }

    #[test]
    fn rejects_foreign_signature() {
        let v = Hs256JwtValidator::new("s");
        let err = v.validate(&mint("other", &claims(10)), Utc::now()).unwrap_err();
        assert!(matches!(err, JwtError::Invalid(_)));
    }

    #[test]
    fn rejects_expired_claims() {
        let v = Hs256JwtValidator::new("s");
        let token = mint("s", &claims(10));
        let err = v
            .validate(&token, Utc::now() + Duration::minutes(30))
            .unwrap_err();
        assert!(matches!(err, JwtError::Claims(TokenValidationError::Expired)));
    }

    #[test]
    fn rejects_garbage() {
        let v = Hs256JwtValidator::new("s");
        assert!(v.validate("not-a-jwt", Utc::now()).is_err());
    }
}
