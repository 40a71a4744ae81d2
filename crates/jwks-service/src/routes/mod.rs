//! HTTP routes for the JWKS service.

use crate::handlers;
use crate::middleware::http_metrics_middleware;
use crate::services::KeyIssuer;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Key issuer, owning the key store handle.
    pub issuer: KeyIssuer,
}

/// Build the application routes.
///
/// - `GET /.well-known/jwks.json` - public key set (RFC 8414 well-known path)
/// - `POST /auth` - token issuance, `?expired=true` for an expired token
/// - `GET /health` - liveness probe
/// - `GET /ready` - readiness probe
/// - `GET /metrics` - Prometheus metrics
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let api_routes = Router::new()
        .route("/.well-known/jwks.json", get(handlers::handle_get_jwks))
        .route("/auth", post(handlers::handle_auth))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .with_state(state);

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    // Layer order (last added runs first):
    // 1. http_metrics_middleware (outermost, sees timeouts too)
    // 2. TimeoutLayer
    // 3. TraceLayer (innermost)
    api_routes
        .merge(metrics_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(middleware::from_fn(http_metrics_middleware))
}
