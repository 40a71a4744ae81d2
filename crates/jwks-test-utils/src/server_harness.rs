//! Test server harness for E2E testing
//!
//! Provides TestJwksServer for spawning real JWKS server instances in tests.

use crate::crypto_fixtures::test_signing_key;
use chrono::Utc;
use jwks_service::models::BootstrappedKeys;
use jwks_service::repositories::KeyStore;
use jwks_service::routes::{self, AppState};
use jwks_service::services::KeyIssuer;
use metrics_exporter_prometheus::PrometheusBuilder;
use sqlx::SqlitePool;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Test harness for spawning the JWKS server in E2E tests
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_jwks_e2e() -> Result<(), anyhow::Error> {
///     let server = TestJwksServer::spawn(memory_pool().await?).await?;
///
///     let response = reqwest::Client::new()
///         .get(format!("{}/.well-known/jwks.json", server.url()))
///         .send()
///         .await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestJwksServer {
    addr: SocketAddr,
    store: KeyStore,
    seeded: Option<BootstrappedKeys>,
    _handle: JoinHandle<()>,
}

impl TestJwksServer {
    /// Spawn a server the way the binary starts: clear the store, generate
    /// one expired and one valid key, then serve on a random local port.
    pub async fn spawn(pool: SqlitePool) -> Result<Self, anyhow::Error> {
        let store = KeyStore::new(pool);
        store
            .initialize()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to initialize key store: {}", e))?;

        let seeded = KeyIssuer::new(store.clone())
            .bootstrap()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bootstrap signing keys: {}", e))?;

        Self::serve(store, Some(seeded)).await
    }

    /// Spawn a server over a cleared store holding fixture keys that expire
    /// at the given offsets (seconds, relative to now). Returns the server
    /// and the ids in the order given.
    ///
    /// Skips RSA generation, and lets tests build stores with any mix of
    /// key classes (including none of one class).
    pub async fn spawn_with_keys(
        pool: SqlitePool,
        expiry_offsets: &[i64],
    ) -> Result<(Self, Vec<i64>), anyhow::Error> {
        let store = KeyStore::new(pool);
        store
            .initialize()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to initialize key store: {}", e))?;

        let now = Utc::now().timestamp();
        let mut kids = Vec::with_capacity(expiry_offsets.len());
        for (seed, offset) in expiry_offsets.iter().enumerate() {
            let kid = store
                .insert(&test_signing_key(seed as u64), now + offset)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to insert fixture key: {}", e))?;
            kids.push(kid);
        }

        let server = Self::serve(store, None).await?;
        Ok((server, kids))
    }

    async fn serve(
        store: KeyStore,
        seeded: Option<BootstrappedKeys>,
    ) -> Result<Self, anyhow::Error> {
        let state = Arc::new(AppState {
            issuer: KeyIssuer::new(store.clone()),
        });

        // A global recorder may already be installed by another test in this
        // process; a standalone recorder gives each server its own handle.
        let metrics_handle = PrometheusBuilder::new().build_recorder().handle();

        let app = routes::build_routes(state, metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            store,
            seeded,
            _handle: handle,
        })
    }

    /// Key store backing the server
    pub fn store(&self) -> &KeyStore {
        &self.store
    }

    /// Ids generated by `spawn`; `None` for `spawn_with_keys`
    pub fn seeded_keys(&self) -> Option<BootstrappedKeys> {
        self.seeded
    }

    /// Get the base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestJwksServer {
    fn drop(&mut self) {
        self._handle.abort();
    }
}
