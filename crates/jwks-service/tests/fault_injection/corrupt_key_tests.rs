//! Fault injection tests for corrupt key rows
//!
//! Stored bytes that do not decode into an RSA private key are a data
//! integrity failure: 500 on every operation that touches the row.

use jwks_test_utils::{memory_pool, TestJwksServer};
use reqwest::StatusCode;

const HOUR: i64 = 3600;

async fn insert_raw(
    server: &TestJwksServer,
    bytes: &[u8],
    offset: i64,
) -> Result<i64, anyhow::Error> {
    let exp = chrono::Utc::now().timestamp() + offset;
    let result = sqlx::query("INSERT INTO keys (key, exp) VALUES (?, ?)")
        .bind(bytes)
        .bind(exp)
        .execute(server.store().pool())
        .await?;
    Ok(result.last_insert_rowid())
}

#[tokio::test]
async fn test_corrupt_valid_key_fails_jwks_and_auth() -> Result<(), anyhow::Error> {
    let (server, _kids) = TestJwksServer::spawn_with_keys(memory_pool().await?, &[]).await?;
    insert_raw(&server, b"not a private key", HOUR).await?;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/.well-known/jwks.json", server.url()))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = client.post(format!("{}/auth", server.url())).send().await?;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json().await?;
    assert!(!body["error"].as_str().unwrap_or_default().contains("PKCS"));

    Ok(())
}

#[tokio::test]
async fn test_corrupt_expired_key_only_fails_expired_issuance() -> Result<(), anyhow::Error> {
    let (server, kids) = TestJwksServer::spawn_with_keys(memory_pool().await?, &[HOUR]).await?;
    insert_raw(&server, &[0xff, 0x00, 0xfe], -HOUR).await?;
    let client = reqwest::Client::new();

    // Expired rows are never published, so the key set is unaffected
    let response = client
        .get(format!("{}/.well-known/jwks.json", server.url()))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["keys"][0]["kid"], kids[0].to_string());

    let response = client.post(format!("{}/auth", server.url())).send().await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .post(format!("{}/auth?expired=true", server.url()))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    Ok(())
}
