//! Deterministic cryptographic fixtures for testing
//!
//! RSA-2048 generation takes long enough to dominate test time, so fixture
//! keys come from a seeded RNG and are cached per seed for the lifetime of
//! the test binary. The same seed always yields the same key.

use jwks_service::crypto;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rsa::RsaPrivateKey;
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

fn cache() -> &'static Mutex<HashMap<u64, String>> {
    static CACHE: OnceLock<Mutex<HashMap<u64, String>>> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

/// PKCS#8 PEM of the fixture key for `seed`.
///
/// # Example
/// ```rust,ignore
/// let a = test_signing_key(1);
/// let b = test_signing_key(1);
/// assert_eq!(a.expose_secret(), b.expose_secret());
/// ```
pub fn test_signing_key(seed: u64) -> SecretString {
    let mut cache = cache().lock().unwrap();
    let pem = cache.entry(seed).or_insert_with(|| {
        let mut rng = StdRng::seed_from_u64(seed);
        crypto::generate_signing_key_with_rng(&mut rng)
            .expect("fixture key generation should succeed")
            .expose_secret()
            .to_string()
    });
    SecretString::from(pem.clone())
}

/// Decoded RSA private key of the fixture for `seed`.
pub fn test_private_key(seed: u64) -> RsaPrivateKey {
    crypto::decode_private_key(test_signing_key(seed).expose_secret().as_bytes())
        .expect("fixture key should decode")
}
