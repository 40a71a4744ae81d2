use crate::errors::JwksError;
use crate::models::Jwks;
use crate::observability::metrics::record_jwks_request;
use crate::routes::AppState;
use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::instrument;

/// Handle JWKS request
///
/// GET /.well-known/jwks.json
///
/// Returns the public half of every unexpired signing key in JWKS format
/// (RFC 7517). An empty `keys` array is a valid answer.
#[instrument(name = "jwks.keys.get", skip_all, fields(status, key_count))]
pub async fn handle_get_jwks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Jwks>, JwksError> {
    let result = state.issuer.publish_key_set().await;

    let status = if result.is_ok() { "success" } else { "error" };
    tracing::Span::current().record("status", status);
    record_jwks_request(status);

    let jwks = result?;
    tracing::Span::current().record("key_count", jwks.keys.len());

    Ok(Json(jwks))
}
