//! Health check handlers.
//!
//! - `/health`: Liveness probe - returns OK if the process is running
//! - `/ready`: Readiness probe - checks the key store and that a valid key exists

use crate::models::{KeyClass, ReadinessResponse};
use crate::routes::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use std::sync::Arc;

/// Liveness probe handler.
///
/// Does NOT check any dependencies.
pub async fn health_check() -> &'static str {
    "OK"
}

/// Readiness probe handler.
///
/// Returns 200 only when the database answers and at least one valid
/// signing key exists, so `POST /auth` can succeed. Returns 503 otherwise.
///
/// Error messages are generic; the underlying failure is logged.
#[tracing::instrument(skip_all, name = "jwks.health.readiness")]
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let store = state.issuer.store();

    if let Err(e) = store.ping().await {
        tracing::warn!("Readiness check failed: {}", e);
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                status: "not_ready",
                database: Some("unhealthy"),
                signing_key: None,
                error: Some("Service dependencies unavailable".to_string()),
            }),
        );
    }

    match store.find_one(KeyClass::Valid, Utc::now().timestamp()).await {
        Ok(Some(_)) => (
            StatusCode::OK,
            Json(ReadinessResponse {
                status: "ready",
                database: Some("healthy"),
                signing_key: Some("available"),
                error: None,
            }),
        ),
        Ok(None) => {
            tracing::warn!("Readiness check failed: no valid signing key");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadinessResponse {
                    status: "not_ready",
                    database: Some("healthy"),
                    signing_key: Some("unavailable"),
                    error: Some("No valid signing key".to_string()),
                }),
            )
        }
        Err(e) => {
            tracing::warn!("Readiness check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadinessResponse {
                    status: "not_ready",
                    database: Some("unhealthy"),
                    signing_key: None,
                    error: Some("Service dependencies unavailable".to_string()),
                }),
            )
        }
    }
}
