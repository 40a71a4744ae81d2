use crate::crypto::{self, Claims};
use crate::errors::JwksError;
use crate::models::{BootstrappedKeys, IssuedToken, JsonWebKey, Jwks, KeyClass, SigningKey};
use crate::observability::metrics::{
    record_key_generated, record_token_issuance, set_published_keys,
};
use crate::repositories::KeyStore;
use chrono::Utc;
use std::time::Instant;
use tracing::instrument;

/// Offset from startup at which the seeded keys expire (1 hour either side)
pub const KEY_LIFETIME_SECONDS: i64 = 3600;

/// Offset from issuance at which a token expires (1 hour either side)
pub const TOKEN_LIFETIME_SECONDS: i64 = 3600;

/// Subject claim carried by every issued token
pub const TOKEN_SUBJECT: &str = "userABC";

/// Generates keys, selects them by expiry class, signs tokens and projects
/// the valid keys into a public key set.
///
/// Holds no key state of its own; every key lives in the `KeyStore`.
#[derive(Debug, Clone)]
pub struct KeyIssuer {
    store: KeyStore,
}

impl KeyIssuer {
    pub fn new(store: KeyStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &KeyStore {
        &self.store
    }

    /// Seed the store with one expired and one valid key.
    ///
    /// Must run once after `KeyStore::initialize`. Any failure here is
    /// fatal for startup.
    #[instrument(skip_all)]
    pub async fn bootstrap(&self) -> Result<BootstrappedKeys, JwksError> {
        // RSA generation is CPU-bound; keep it off the async workers
        let (expired_material, valid_material) = tokio::task::spawn_blocking(|| {
            Ok::<_, JwksError>((crypto::generate_signing_key()?, crypto::generate_signing_key()?))
        })
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Key generation task failed");
            JwksError::Internal
        })??;

        let now = Utc::now().timestamp();

        let expired_kid = self
            .store
            .insert(&expired_material, now - KEY_LIFETIME_SECONDS)
            .await?;
        record_key_generated(KeyClass::Expired.as_str());

        let valid_kid = self
            .store
            .insert(&valid_material, now + KEY_LIFETIME_SECONDS)
            .await?;
        record_key_generated(KeyClass::Valid.as_str());

        tracing::info!(expired_kid, valid_kid, "Signing keys bootstrapped");

        Ok(BootstrappedKeys {
            expired_kid,
            valid_kid,
        })
    }

    /// Issue a token signed by a key of the requested class.
    pub async fn issue_token(&self, class: KeyClass) -> Result<IssuedToken, JwksError> {
        self.issue_token_at(class, Utc::now().timestamp()).await
    }

    /// Issue a token as of `now`.
    ///
    /// The token's `exp` lands on the same side of `now` as the key's:
    /// `now + 3600` for valid keys, `now - 3600` for expired ones.
    #[instrument(skip_all, fields(key_class = class.as_str(), kid))]
    pub async fn issue_token_at(
        &self,
        class: KeyClass,
        now: i64,
    ) -> Result<IssuedToken, JwksError> {
        let start = Instant::now();
        let result = self.sign_with_class(class, now).await;

        let status = match &result {
            Ok(_) => "success",
            Err(JwksError::NoKeyAvailable) => "not_found",
            Err(_) => "error",
        };
        record_token_issuance(class.as_str(), status, start.elapsed());

        if let Ok(issued) = &result {
            tracing::Span::current().record("kid", issued.kid);
            tracing::info!(kid = issued.kid, key_class = class.as_str(), "Issued JWT");
        }

        result
    }

    async fn sign_with_class(&self, class: KeyClass, now: i64) -> Result<IssuedToken, JwksError> {
        let key = self
            .store
            .find_one(class, now)
            .await?
            .ok_or(JwksError::NoKeyAvailable)?;

        let exp = match class {
            KeyClass::Valid => now + TOKEN_LIFETIME_SECONDS,
            KeyClass::Expired => now - TOKEN_LIFETIME_SECONDS,
        };

        let claims = Claims {
            sub: TOKEN_SUBJECT.to_string(),
            exp,
            iat: now,
        };

        let token = crypto::sign_jwt(&claims, &key.key, &key.kid.to_string())?;

        Ok(IssuedToken {
            token,
            kid: key.kid,
        })
    }

    /// Public key set of every currently valid key.
    pub async fn publish_key_set(&self) -> Result<Jwks, JwksError> {
        self.publish_key_set_at(Utc::now().timestamp()).await
    }

    /// Public key set as of `now`. Expired keys and keys expiring exactly at
    /// `now` are never included.
    #[instrument(skip_all)]
    pub async fn publish_key_set_at(&self, now: i64) -> Result<Jwks, JwksError> {
        let keys = self.store.find_all_valid(now).await?;

        let json_web_keys = keys
            .iter()
            .map(public_jwk)
            .collect::<Result<Vec<_>, _>>()?;

        set_published_keys(json_web_keys.len());

        Ok(Jwks {
            keys: json_web_keys,
        })
    }
}

/// Project a stored key onto its public-only JWK.
pub fn public_jwk(key: &SigningKey) -> Result<JsonWebKey, JwksError> {
    let private_key = crypto::decode_private_key(&key.key)?;
    let (n, e) = crypto::public_components(&private_key);

    Ok(JsonWebKey {
        kid: key.kid.to_string(),
        kty: "RSA".to_string(),
        alg: "RS256".to_string(),
        use_: "sig".to_string(),
        n,
        e,
    })
}
