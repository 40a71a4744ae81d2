use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Signing key model (maps to the `keys` table)
///
/// `key` holds the unencrypted PKCS#8 PEM of the RSA private key. Debug is
/// manually implemented so the material never reaches logs.
#[derive(Clone, FromRow)]
pub struct SigningKey {
    pub kid: i64,
    pub key: Vec<u8>,
    pub exp: i64,
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("kid", &self.kid)
            .field("key", &"[REDACTED]")
            .field("exp", &self.exp)
            .finish()
    }
}

/// Expiry class a caller asks for when selecting a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    /// `exp > now`
    Valid,
    /// `exp < now`
    Expired,
}

impl KeyClass {
    /// Map the `expired` flag of an issuance request to a class.
    pub fn from_expired_flag(expired: bool) -> Self {
        if expired {
            KeyClass::Expired
        } else {
            KeyClass::Valid
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyClass::Valid => "valid",
            KeyClass::Expired => "expired",
        }
    }
}

/// JWKS response (RFC 7517)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwks {
    pub keys: Vec<JsonWebKey>,
}

/// Public-only RSA JSON Web Key (RFC 7517 / RFC 7518 section 6.3.1)
///
/// Carries no private parameters (`d`, `p`, `q`, ...), so a serialized
/// key set can never expose signing material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonWebKey {
    pub kid: String, // Key ID (store id rendered as a string)
    pub kty: String, // Key Type ("RSA")
    pub alg: String, // Algorithm ("RS256")
    #[serde(rename = "use")]
    pub use_: String, // Public key use ("sig")
    pub n: String,   // Modulus (base64url, no padding)
    pub e: String,   // Public exponent (base64url, no padding)
}

/// Result of a successful issuance
#[derive(Clone)]
pub struct IssuedToken {
    /// Compact-serialized RS256 JWT
    pub token: String,
    /// Store id of the signing key, for logging
    pub kid: i64,
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken")
            .field("token", &"[REDACTED]")
            .field("kid", &self.kid)
            .finish()
    }
}

/// Ids of the two keys seeded at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrappedKeys {
    pub expired_kid: i64,
    pub valid_kid: i64,
}

/// Body of `POST /auth`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Body of `GET /ready`
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signing_key: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
