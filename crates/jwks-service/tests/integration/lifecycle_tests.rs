//! End-to-end scenario over a freshly started server
//!
//! Startup clears the store and generates one expired and one valid key.
//! Everything observable afterwards follows from those two keys.

use jwks_service::models::Jwks;
use jwks_test_utils::{memory_pool, TestJwksServer, TokenAssertions};
use reqwest::StatusCode;

#[tokio::test]
async fn test_startup_then_publish_then_issue() -> Result<(), anyhow::Error> {
    let server = TestJwksServer::spawn(memory_pool().await?).await?;
    let seeded = server.seeded_keys().expect("spawn records bootstrapped ids");
    let client = reqwest::Client::new();

    assert_eq!(server.store().count().await?, 2);
    assert!(seeded.valid_kid > seeded.expired_kid);

    // Only the valid key is published
    let jwks: Jwks = client
        .get(format!("{}/.well-known/jwks.json", server.url()))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(jwks.keys.len(), 1);
    let published = &jwks.keys[0];
    assert_eq!(published.kid, seeded.valid_kid.to_string());

    // Expired token, signed by the unpublished key
    let response = client
        .post(format!("{}/auth?expired=true", server.url()))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    let expired_token = body["token"].as_str().unwrap().to_string();
    expired_token
        .assert_valid_jwt()
        .assert_signed_by(&seeded.expired_kid.to_string())
        .assert_expired();
    assert!(
        jwks.keys.iter().all(|k| k.kid != seeded.expired_kid.to_string()),
        "Expired key must not be published"
    );

    // Valid token, verifiable through the published set
    let response = client
        .post(format!("{}/auth?expired=false", server.url()))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    let valid_token = body["token"].as_str().unwrap().to_string();
    valid_token
        .assert_valid_jwt()
        .assert_signed_by(&seeded.valid_kid.to_string())
        .assert_not_expired()
        .assert_verifies_with(published);

    Ok(())
}

#[tokio::test]
async fn test_restart_on_same_store_replaces_keys() -> Result<(), anyhow::Error> {
    let pool = memory_pool().await?;

    let first = TestJwksServer::spawn(pool.clone()).await?;
    let first_keys = first.seeded_keys().unwrap();
    drop(first);

    let second = TestJwksServer::spawn(pool).await?;
    let second_keys = second.seeded_keys().unwrap();

    assert_eq!(second.store().count().await?, 2, "Old keys are cleared");
    assert!(
        second_keys.expired_kid > first_keys.valid_kid,
        "Ids are never reused across restarts"
    );

    Ok(())
}
