use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config;
use crate::middleware::auth::Identity;

pub mod credentials;
pub mod password;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(identity: &Identity, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            id: identity.id,
            email: identity.email.clone(),
            username: identity.username.clone(),
            exp,
            iat: now.timestamp(),
        }
    }
}

/// Failure to issue a token. Unlike [`TokenError`] these are server-side
/// faults, not bad client input.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("JWT secret is not configured")]
    InvalidSecret,
}

/// Why a presented token failed verification. Callers treat both the same
/// way (anonymous), but they are kept distinct for diagnostics.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token is malformed or has an invalid signature")]
    Malformed,
    #[error("token has expired")]
    Expired,
}

/// Issues and verifies the signed identity tokens carried in the session
/// cookie. Built once at startup from configuration and shared read-only by
/// all in-flight requests; rotating the secret invalidates every
/// outstanding token.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_hours: u64,
}

impl TokenService {
    pub fn new(secret: &str, expiry_hours: u64) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_hours,
        })
    }

    pub fn from_config() -> Result<Self, JwtError> {
        let security = &config::config().security;
        Self::new(&security.jwt_secret, security.jwt_expiry_hours)
    }

    /// Validity window of issued tokens, in hours. Also used for the cookie
    /// Max-Age so the cookie and the token lapse together.
    pub fn expiry_hours(&self) -> u64 {
        self.expiry_hours
    }

    /// Serialize and sign an identity into a token string.
    pub fn issue(&self, identity: &Identity) -> Result<String, JwtError> {
        let claims = Claims::new(identity, self.expiry_hours);
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    /// Decode a token, checking signature integrity and expiry. A tampered
    /// or expired token is never partially trusted.
    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::Malformed,
                }
            })?;

        Ok(Identity::from(token_data.claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret", 1).expect("valid secret")
    }

    fn identity() -> Identity {
        Identity {
            id: Uuid::new_v4(),
            email: "alice@example.com".to_string(),
            username: "alice".to_string(),
        }
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert!(matches!(
            TokenService::new("", 1),
            Err(JwtError::InvalidSecret)
        ));
    }

    #[test]
    fn issue_verify_round_trip() {
        let service = service();
        let identity = identity();

        let token = service.issue(&identity).expect("issue");
        let resolved = service.verify(&token).expect("verify");

        assert_eq!(resolved.id, identity.id);
        assert_eq!(resolved.email, identity.email);
        assert_eq!(resolved.username, identity.username);
    }

    #[test]
    fn tampered_token_is_malformed() {
        let service = service();
        let token = service.issue(&identity()).expect("issue");

        // Flip one byte of the signature segment
        let mut bytes = token.into_bytes();
        let last = bytes.len() - 1;
        bytes[last] = if bytes[last] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).expect("ascii");

        assert_eq!(service.verify(&tampered), Err(TokenError::Malformed));
    }

    #[test]
    fn garbage_token_is_malformed() {
        assert_eq!(service().verify("not-a-token"), Err(TokenError::Malformed));
    }

    #[test]
    fn expired_token_is_expired_not_malformed() {
        let service = service();
        let identity = identity();

        // Hand-roll claims with an expiry in the past; same key, so only
        // the expiry check can fail.
        let claims = Claims {
            id: identity.id,
            email: identity.email.clone(),
            username: identity.username.clone(),
            exp: (Utc::now() - Duration::hours(2)).timestamp(),
            iat: (Utc::now() - Duration::hours(3)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .expect("encode");

        assert_eq!(service.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn token_signed_with_other_secret_is_malformed() {
        let service = service();
        let other = TokenService::new("other-secret", 1).expect("valid secret");
        let token = other.issue(&identity()).expect("issue");

        assert_eq!(service.verify(&token), Err(TokenError::Malformed));
    }
}
