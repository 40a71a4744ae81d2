//! Persistence tests against an on-disk database
//!
//! Key material written by one pool must read back byte-for-byte from a
//! fresh pool on the same file, and a server start must still clear it.

use chrono::Utc;
use jwks_service::models::KeyClass;
use jwks_service::repositories::KeyStore;
use jwks_service::services::KeyIssuer;
use jwks_test_utils::{test_signing_key, FileDatabase, TestJwksServer, TokenAssertions};
use secrecy::ExposeSecret;

const HOUR: i64 = 3600;

#[tokio::test]
async fn test_key_material_survives_reopen() -> Result<(), anyhow::Error> {
    let db = FileDatabase::new()?;
    let now = Utc::now().timestamp();

    let store = KeyStore::new(db.connect(1).await?);
    store.initialize().await?;
    let kid = store.insert(&test_signing_key(3), now + HOUR).await?;
    store.pool().close().await;

    assert!(db.path().exists(), "Database file should be on disk");

    // A new pool sees the same rows, without re-initializing
    let reopened = KeyStore::new(db.connect(1).await?);
    let key = reopened
        .find_one(KeyClass::Valid, now)
        .await?
        .expect("key should persist");

    assert_eq!(key.kid, kid);
    assert_eq!(key.exp, now + HOUR);
    assert_eq!(key.key, test_signing_key(3).expose_secret().as_bytes());

    // Reloaded material still signs tokens the published key verifies
    let issuer = KeyIssuer::new(reopened);
    let issued = issuer.issue_token_at(KeyClass::Valid, now).await?;
    let jwks = issuer.publish_key_set_at(now).await?;
    issued
        .token
        .assert_signed_by(&kid.to_string())
        .assert_verifies_with(&jwks.keys[0]);

    Ok(())
}

#[tokio::test]
async fn test_server_start_clears_persisted_keys() -> Result<(), anyhow::Error> {
    let db = FileDatabase::new()?;

    let (first, old_kids) =
        TestJwksServer::spawn_with_keys(db.connect(1).await?, &[HOUR, HOUR, -HOUR]).await?;
    first.store().pool().close().await;
    drop(first);

    let second = TestJwksServer::spawn(db.connect(2).await?).await?;
    let seeded = second.seeded_keys().unwrap();

    assert_eq!(second.store().count().await?, 2);
    let max_old = old_kids.iter().copied().max().unwrap();
    assert!(seeded.expired_kid > max_old);
    assert!(seeded.valid_kid > max_old);

    Ok(())
}
