//! Concurrent issuance and publication
//!
//! Handlers share one store; reads run in parallel across pool connections.

use jwks_service::models::Jwks;
use jwks_test_utils::{FileDatabase, TestJwksServer, TokenAssertions};
use reqwest::StatusCode;
use tokio::task::JoinSet;

const HOUR: i64 = 3600;
const REQUESTS: usize = 24;

#[tokio::test]
async fn test_concurrent_requests_all_succeed() -> Result<(), anyhow::Error> {
    let db = FileDatabase::new()?;
    let (server, kids) =
        TestJwksServer::spawn_with_keys(db.connect(4).await?, &[-HOUR, HOUR]).await?;
    let url = server.url();
    let client = reqwest::Client::new();

    let mut tasks = JoinSet::new();
    for i in 0..REQUESTS {
        let client = client.clone();
        let url = url.clone();
        tasks.spawn(async move {
            let expired = i % 2 == 0;
            let response = client
                .post(format!("{}/auth?expired={}", url, expired))
                .send()
                .await?;
            assert_eq!(response.status(), StatusCode::OK);
            let body: serde_json::Value = response.json().await?;
            let token = body["token"].as_str().unwrap_or_default().to_string();
            Ok::<_, anyhow::Error>((expired, token))
        });
    }

    for _ in 0..REQUESTS / 4 {
        let client = client.clone();
        let url = url.clone();
        tasks.spawn(async move {
            let jwks: Jwks = client
                .get(format!("{}/.well-known/jwks.json", url))
                .send()
                .await?
                .json()
                .await?;
            assert_eq!(jwks.keys.len(), 1);
            Ok::<_, anyhow::Error>((false, String::new()))
        });
    }

    let mut issued = 0;
    while let Some(joined) = tasks.join_next().await {
        let (expired, token) = joined??;
        if token.is_empty() {
            continue;
        }
        if expired {
            token.assert_signed_by(&kids[0].to_string()).assert_expired();
        } else {
            token.assert_signed_by(&kids[1].to_string()).assert_not_expired();
        }
        issued += 1;
    }

    assert_eq!(issued, REQUESTS);

    Ok(())
}
