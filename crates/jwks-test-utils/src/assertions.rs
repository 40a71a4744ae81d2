//! Custom test assertions for expressive tests
//!
//! Provides trait-based assertions for issued RS256 tokens.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jwks_service::crypto::verify_jwt;
use jwks_service::models::JsonWebKey;
use serde::Deserialize;

/// JWT header structure
#[derive(Debug, Deserialize)]
struct JwtHeader {
    pub alg: String,
    pub typ: String,
    #[serde(default)]
    pub kid: Option<String>,
}

/// JWT claims structure
#[derive(Debug, Deserialize)]
struct JwtClaims {
    pub sub: String,
    pub exp: i64,
}

fn decode_segment<T: for<'de> Deserialize<'de>>(token: &str, index: usize, what: &str) -> T {
    let segment = token
        .split('.')
        .nth(index)
        .unwrap_or_else(|| panic!("JWT has no {} segment", what));

    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .unwrap_or_else(|e| panic!("Failed to base64 decode JWT {}: {}", what, e));

    serde_json::from_slice(&bytes)
        .unwrap_or_else(|e| panic!("Failed to parse JWT {} JSON: {}", what, e))
}

fn header(token: &str) -> JwtHeader {
    decode_segment(token, 0, "header")
}

fn claims(token: &str) -> JwtClaims {
    decode_segment(token, 1, "payload")
}

/// Custom assertions for issued tokens
///
/// # Example
/// ```rust,ignore
/// token
///     .assert_valid_jwt()
///     .assert_signed_by("1")
///     .assert_for_subject("userABC")
///     .assert_not_expired();
/// ```
pub trait TokenAssertions {
    /// Assert that the token is a compact RS256 JWT
    fn assert_valid_jwt(&self) -> &Self;

    /// Assert that the token header names the specified key
    fn assert_signed_by(&self, key_id: &str) -> &Self;

    /// Assert that the token is for the specified subject
    fn assert_for_subject(&self, subject: &str) -> &Self;

    /// Assert that the token's `exp` is in the past
    fn assert_expired(&self) -> &Self;

    /// Assert that the token's `exp` is in the future
    fn assert_not_expired(&self) -> &Self;

    /// Assert that the signature verifies against a published key
    fn assert_verifies_with(&self, jwk: &JsonWebKey) -> &Self;
}

impl TokenAssertions for str {
    fn assert_valid_jwt(&self) -> &Self {
        let parts = self.split('.').count();
        assert_eq!(
            parts, 3,
            "JWT must have 3 parts (header.payload.signature), got {}",
            parts
        );

        let header = header(self);
        assert_eq!(header.alg, "RS256", "Expected RS256 algorithm");
        assert_eq!(header.typ, "JWT", "Expected JWT type");

        let claims = claims(self);
        assert!(!claims.sub.is_empty(), "Subject must not be empty");

        self
    }

    fn assert_signed_by(&self, key_id: &str) -> &Self {
        let header = header(self);
        assert_eq!(
            header.kid.as_deref(),
            Some(key_id),
            "Token signed by unexpected key"
        );
        self
    }

    fn assert_for_subject(&self, subject: &str) -> &Self {
        let claims = claims(self);
        assert_eq!(claims.sub, subject, "Token subject mismatch");
        self
    }

    fn assert_expired(&self) -> &Self {
        let claims = claims(self);
        let now = chrono::Utc::now().timestamp();
        assert!(
            claims.exp < now,
            "Token should be expired (exp {}, now {})",
            claims.exp,
            now
        );
        self
    }

    fn assert_not_expired(&self) -> &Self {
        let claims = claims(self);
        let now = chrono::Utc::now().timestamp();
        assert!(
            claims.exp > now,
            "Token should not be expired (exp {}, now {})",
            claims.exp,
            now
        );
        self
    }

    fn assert_verifies_with(&self, jwk: &JsonWebKey) -> &Self {
        assert_eq!(jwk.kty, "RSA");
        assert_eq!(jwk.alg, "RS256");

        // Expiry is checked separately; this only covers the signature
        let result = verify_jwt(self, &jwk.n, &jwk.e, false);
        assert!(
            result.is_ok(),
            "Token failed verification against key {}: {:?}",
            jwk.kid,
            result.err()
        );
        self
    }
}

impl TokenAssertions for String {
    fn assert_valid_jwt(&self) -> &Self {
        self.as_str().assert_valid_jwt();
        self
    }

    fn assert_signed_by(&self, key_id: &str) -> &Self {
        self.as_str().assert_signed_by(key_id);
        self
    }

    fn assert_for_subject(&self, subject: &str) -> &Self {
        self.as_str().assert_for_subject(subject);
        self
    }

    fn assert_expired(&self) -> &Self {
        self.as_str().assert_expired();
        self
    }

    fn assert_not_expired(&self) -> &Self {
        self.as_str().assert_not_expired();
        self
    }

    fn assert_verifies_with(&self, jwk: &JsonWebKey) -> &Self {
        self.as_str().assert_verifies_with(jwk);
        self
    }
}
