//! Integration tests for the JWKS endpoint
//!
//! `GET /.well-known/jwks.json` publishes the public half of every key whose
//! expiry is still in the future, and nothing else.

use jwks_service::models::Jwks;
use jwks_test_utils::{memory_pool, TestJwksServer};
use reqwest::StatusCode;

const HOUR: i64 = 3600;

async fn fetch_jwks(
    server: &TestJwksServer,
) -> Result<(StatusCode, serde_json::Value), anyhow::Error> {
    let response = reqwest::Client::new()
        .get(format!("{}/.well-known/jwks.json", server.url()))
        .send()
        .await?;

    let status = response.status();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());
    assert_eq!(content_type.as_deref(), Some("application/json"));

    Ok((status, response.json().await?))
}

#[tokio::test]
async fn test_jwks_lists_only_valid_keys() -> Result<(), anyhow::Error> {
    let (server, kids) =
        TestJwksServer::spawn_with_keys(memory_pool().await?, &[-HOUR, HOUR, -1, 2 * HOUR]).await?;

    let (status, body) = fetch_jwks(&server).await?;
    assert_eq!(status, StatusCode::OK);

    let jwks: Jwks = serde_json::from_value(body)?;
    let published: Vec<String> = jwks.keys.iter().map(|k| k.kid.clone()).collect();

    // Valid keys only, lowest id first
    assert_eq!(published, vec![kids[1].to_string(), kids[3].to_string()]);

    Ok(())
}

#[tokio::test]
async fn test_jwks_entries_are_public_rsa_keys() -> Result<(), anyhow::Error> {
    let (server, _kids) = TestJwksServer::spawn_with_keys(memory_pool().await?, &[HOUR]).await?;

    let (_, body) = fetch_jwks(&server).await?;
    let keys = body["keys"].as_array().expect("keys should be an array");
    assert_eq!(keys.len(), 1);

    let key = &keys[0];
    assert_eq!(key["kty"], "RSA");
    assert_eq!(key["alg"], "RS256");
    assert_eq!(key["use"], "sig");
    assert_eq!(key["e"], "AQAB");
    assert!(key["kid"].is_string(), "kid must be a string");

    let n = key["n"].as_str().expect("n should be a string");
    assert_eq!(n.len(), 342, "2048-bit modulus in unpadded base64url");
    assert!(!n.contains('='));

    // No private parameter may ever appear
    for private in ["d", "p", "q", "dp", "dq", "qi"] {
        assert!(
            key.get(private).is_none(),
            "JWK must not carry private parameter '{}'",
            private
        );
    }

    Ok(())
}

#[tokio::test]
async fn test_jwks_empty_when_no_valid_key() -> Result<(), anyhow::Error> {
    let (server, _kids) =
        TestJwksServer::spawn_with_keys(memory_pool().await?, &[-HOUR, -2 * HOUR]).await?;

    let (status, body) = fetch_jwks(&server).await?;
    assert_eq!(status, StatusCode::OK, "Empty key set is still a success");
    assert_eq!(body, serde_json::json!({ "keys": [] }));

    Ok(())
}

#[tokio::test]
async fn test_jwks_empty_store() -> Result<(), anyhow::Error> {
    let (server, kids) = TestJwksServer::spawn_with_keys(memory_pool().await?, &[]).await?;
    assert!(kids.is_empty());

    let (status, body) = fetch_jwks(&server).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["keys"].as_array().map(|k| k.len()), Some(0));

    Ok(())
}

#[tokio::test]
async fn test_jwks_rejects_post() -> Result<(), anyhow::Error> {
    let (server, _kids) = TestJwksServer::spawn_with_keys(memory_pool().await?, &[HOUR]).await?;

    let response = reqwest::Client::new()
        .post(format!("{}/.well-known/jwks.json", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    Ok(())
}
