//! Bearer token signing and verification.
//!
//! Tokens are HS256 JWTs carrying `sub`, `iat`, `nbf` and `exp`. The temporal
//! window is checked here against an explicit clock rather than by the JWT
//! library, so tests can pin `now`.

use chrono::{Duration, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims carried by a bearer token. Times are unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's public id.
    pub sub: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

impl Claims {
    /// A token is valid iff `nbf <= now <= exp`.
    pub fn is_valid_at(&self, now: i64) -> bool {
        self.nbf <= now && now <= self.exp
    }
}

/// Why a credential was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token is expired or not yet valid")]
    Expired,
    #[error("failed to sign token: {0}")]
    Signing(String),
    #[error("token lifetime of {0} hours is out of range")]
    InvalidTtl(i64),
}

impl TokenError {
    /// Short label for metrics and logs.
    pub fn reason(&self) -> &'static str {
        match self {
            TokenError::Malformed => "malformed",
            TokenError::InvalidSignature => "invalid_signature",
            TokenError::Expired => "expired",
            TokenError::Signing(_) => "signing",
            TokenError::InvalidTtl(_) => "invalid_ttl",
        }
    }
}

/// Convert a lifetime in hours, rejecting values below one hour or too large
/// to represent.
pub fn ttl_from_hours(hours: i64) -> Result<TimeDelta, TokenError> {
    if hours < 1 {
        return Err(TokenError::InvalidTtl(hours));
    }
    TimeDelta::try_hours(hours).ok_or(TokenError::InvalidTtl(hours))
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
            ErrorKind::ExpiredSignature | ErrorKind::ImmatureSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        }
    }
}

/// Verifies (and issues) HS256 tokens with a shared secret.
#[derive(Clone)]
pub struct TokenVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier").finish_non_exhaustive()
    }
}

impl TokenVerifier {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Verify `token` against the current time.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verify `token` against `now` (unix seconds).
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;

        if !data.claims.is_valid_at(now) {
            return Err(TokenError::Expired);
        }
        Ok(data.claims)
    }

    /// Sign a token for `subject`, valid from now for `ttl`.
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<String, TokenError> {
        self.issue_at(subject, Utc::now().timestamp(), ttl)
    }

    /// Sign a token for `subject` with `iat = nbf = now`.
    pub fn issue_at(&self, subject: &str, now: i64, ttl: Duration) -> Result<String, TokenError> {
        let claims = Claims {
            sub: subject.to_string(),
            iat: now,
            nbf: now,
            exp: now + ttl.num_seconds(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &[u8] = b"test-secret-key-for-unit-tests";
    const NOW: i64 = 1_700_000_000;

    fn verifier() -> TokenVerifier {
        TokenVerifier::new(TEST_SECRET)
    }

    #[test]
    fn issued_token_verifies() {
        let v = verifier();
        let token = v.issue_at("usr_123", NOW, Duration::hours(24)).unwrap();

        let claims = v.verify_at(&token, NOW + 60).unwrap();
        assert_eq!(claims.sub, "usr_123");
        assert_eq!(claims.iat, NOW);
        assert_eq!(claims.nbf, NOW);
        assert_eq!(claims.exp, NOW + 24 * 3600);
    }

    #[test]
    fn ttl_hours_are_range_checked() {
        assert_eq!(ttl_from_hours(24), Ok(Duration::hours(24)));
        assert_eq!(ttl_from_hours(0), Err(TokenError::InvalidTtl(0)));
        assert_eq!(ttl_from_hours(-3), Err(TokenError::InvalidTtl(-3)));
        assert_eq!(
            ttl_from_hours(9_999_999_999_999_999),
            Err(TokenError::InvalidTtl(9_999_999_999_999_999))
        );
    }

    #[test]
    fn window_edges_are_inclusive() {
        let v = verifier();
        let token = v.issue_at("usr_123", NOW, Duration::seconds(10)).unwrap();

        assert!(v.verify_at(&token, NOW).is_ok());
        assert!(v.verify_at(&token, NOW + 10).is_ok());
        assert_eq!(v.verify_at(&token, NOW + 11), Err(TokenError::Expired));
        assert_eq!(v.verify_at(&token, NOW - 1), Err(TokenError::Expired));
    }

    #[test]
    fn wrong_secret_is_invalid_signature() {
        let token = TokenVerifier::new(b"another-secret")
            .issue_at("usr_123", NOW, Duration::hours(1))
            .unwrap();

        assert_eq!(verifier().verify_at(&token, NOW), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn expired_token_with_valid_signature_is_rejected() {
        let v = verifier();
        let token = v.issue_at("usr_123", NOW - 7200, Duration::hours(1)).unwrap();
        assert_eq!(v.verify_at(&token, NOW), Err(TokenError::Expired));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let v = verifier();
        let token = v.issue_at("usr_123", NOW, Duration::hours(1)).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let other = v.issue_at("usr_999", NOW, Duration::hours(1)).unwrap();
        let other_payload = other.split('.').nth(1).unwrap().to_string();
        parts[1] = &other_payload;

        assert_eq!(
            v.verify_at(&parts.join("."), NOW),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn garbage_is_malformed() {
        let v = verifier();
        assert_eq!(v.verify_at("not-a-token", NOW), Err(TokenError::Malformed));
        assert_eq!(v.verify_at("a.b.c", NOW), Err(TokenError::Malformed));
        assert_eq!(v.verify_at("", NOW), Err(TokenError::Malformed));
    }

    #[test]
    fn missing_claims_are_malformed() {
        #[derive(Serialize)]
        struct Partial {
            sub: String,
        }
        let token = encode(
            &Header::new(Algorithm::HS256),
            &Partial { sub: "usr_1".into() },
            &EncodingKey::from_secret(TEST_SECRET),
        )
        .unwrap();

        assert_eq!(verifier().verify_at(&token, NOW), Err(TokenError::Malformed));
    }

    #[test]
    fn other_algorithm_is_rejected() {
        let token = encode(
            &Header::new(Algorithm::HS512),
            &Claims {
                sub: "usr_1".into(),
                iat: NOW,
                nbf: NOW,
                exp: NOW + 60,
            },
            &EncodingKey::from_secret(TEST_SECRET),
        )
        .unwrap();

        assert_eq!(
            verifier().verify_at(&token, NOW),
            Err(TokenError::InvalidSignature)
        );
    }
}
