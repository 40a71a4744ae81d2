use crate::errors::JwksError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::pkcs8::{DecodePrivateKey, EncodePrivateKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::RsaPrivateKey;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// RSA modulus size for every generated signing key.
pub const RSA_KEY_BITS: usize = 2048;

/// Maximum JWT size accepted by `extract_jwt_kid` and `verify_jwt` (4KB).
///
/// Checked before any base64 decoding so oversized input costs nothing.
const MAX_JWT_SIZE_BYTES: usize = 4096;

/// JWT Claims structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject
    pub exp: i64,    // Expiration timestamp
    pub iat: i64,    // Issued at timestamp
}

/// Generate an RSA-2048 keypair (public exponent 65537) using the OS CSPRNG.
///
/// Returns the private key as unencrypted PKCS#8 PEM. The public half is
/// always derivable from it, so nothing else needs to be stored.
#[instrument(skip_all)]
pub fn generate_signing_key() -> Result<SecretString, JwksError> {
    generate_signing_key_with_rng(&mut OsRng)
}

/// Generate a signing key from a caller-supplied CSPRNG.
///
/// Seeded generators make the output reproducible, which test fixtures rely on.
pub fn generate_signing_key_with_rng<R>(rng: &mut R) -> Result<SecretString, JwksError>
where
    R: RngCore + CryptoRng,
{
    let private_key = RsaPrivateKey::new(rng, RSA_KEY_BITS)
        .map_err(|e| JwksError::Crypto(format!("Keypair generation failed: {}", e)))?;

    let pem = private_key
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| JwksError::Crypto(format!("PKCS#8 encoding failed: {}", e)))?;

    Ok(SecretString::from(pem.as_str().to_owned()))
}

/// Decode stored PKCS#8 PEM bytes into an RSA private key.
///
/// Any failure is a data integrity violation of the store, reported as
/// `MalformedKeyMaterial`.
pub fn decode_private_key(pem: &[u8]) -> Result<RsaPrivateKey, JwksError> {
    let pem = std::str::from_utf8(pem)
        .map_err(|e| JwksError::MalformedKeyMaterial(format!("Key is not UTF-8 PEM: {}", e)))?;

    let private_key = RsaPrivateKey::from_pkcs8_pem(pem)
        .map_err(|e| JwksError::MalformedKeyMaterial(format!("Invalid PKCS#8 key: {}", e)))?;

    private_key
        .validate()
        .map_err(|e| JwksError::MalformedKeyMaterial(format!("Inconsistent RSA key: {}", e)))?;

    Ok(private_key)
}

/// Public modulus and exponent as unpadded base64url (RFC 7518 section 6.3.1).
///
/// Returns `(n, e)`.
pub fn public_components(private_key: &RsaPrivateKey) -> (String, String) {
    let n = URL_SAFE_NO_PAD.encode(private_key.n().to_bytes_be());
    let e = URL_SAFE_NO_PAD.encode(private_key.e().to_bytes_be());
    (n, e)
}

/// Sign a JWT with an RS256 private key, stamping `kid` into the header.
#[instrument(skip_all)]
pub fn sign_jwt(
    claims: &Claims,
    private_key_pem: &[u8],
    key_id: &str,
) -> Result<String, JwksError> {
    let private_key = decode_private_key(private_key_pem)?;

    // The signer takes PKCS#1 DER; storage holds PKCS#8 PEM
    let pkcs1_der = private_key
        .to_pkcs1_der()
        .map_err(|e| JwksError::Crypto(format!("PKCS#1 encoding failed: {}", e)))?;
    let encoding_key = EncodingKey::from_rsa_der(pkcs1_der.as_bytes());

    let mut header = Header::new(Algorithm::RS256);
    header.typ = Some("JWT".to_string());
    header.kid = Some(key_id.to_string());

    let token = encode(&header, claims, &encoding_key)
        .map_err(|e| JwksError::Crypto(format!("JWT signing operation failed: {}", e)))?;

    Ok(token)
}

/// Extract the `kid` (key ID) from a JWT header without verifying the signature.
///
/// Returns `None` if the token is oversized or malformed, or if the header
/// carries no string `kid`.
pub fn extract_jwt_kid(token: &str) -> Option<String> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        return None;
    }

    // JWT format: header.payload.signature
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return None;
    }

    let header_bytes = URL_SAFE_NO_PAD.decode(parts.first()?).ok()?;
    let header: serde_json::Value = serde_json::from_slice(&header_bytes).ok()?;

    header.get("kid")?.as_str().map(|s| s.to_string())
}

/// Verify an RS256 JWT against a published modulus/exponent pair.
///
/// `validate_exp` is off when checking tokens deliberately issued already
/// expired.
#[instrument(skip_all)]
pub fn verify_jwt(token: &str, n: &str, e: &str, validate_exp: bool) -> Result<Claims, JwksError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "crypto",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(JwksError::Crypto("Token exceeds maximum size".to_string()));
    }

    let decoding_key = DecodingKey::from_rsa_components(n, e)
        .map_err(|e| JwksError::Crypto(format!("Invalid public key components: {}", e)))?;

    let mut validation = Validation::new(Algorithm::RS256);
    validation.validate_exp = validate_exp;
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
        tracing::debug!(target: "crypto", error = %e, "Token verification failed");
        JwksError::Crypto(format!("Token verification failed: {}", e))
    })?;

    Ok(token_data.claims)
}

/// Deterministic signing key shared by unit tests across the crate.
///
/// RSA generation is slow, so the PEM is generated once per test binary.
#[cfg(test)]
pub(crate) fn test_pem() -> &'static str {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use secrecy::ExposeSecret;
    use std::sync::OnceLock;

    static PEM: OnceLock<String> = OnceLock::new();
    PEM.get_or_init(|| {
        let mut rng = StdRng::seed_from_u64(7);
        match generate_signing_key_with_rng(&mut rng) {
            Ok(pem) => pem.expose_secret().to_string(),
            Err(e) => unreachable!("fixture key generation failed: {}", e),
        }
    })
}
