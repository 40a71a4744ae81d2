use crate::errors::JwksError;
use crate::models::{KeyClass, TokenResponse};
use crate::routes::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

/// Query parameters of `POST /auth`
#[derive(Debug, Default, Deserialize)]
pub struct AuthParams {
    pub expired: Option<String>,
}

impl AuthParams {
    /// Only the literal `true` asks for an expired key; anything else,
    /// including an absent parameter, asks for a valid one.
    pub fn key_class(&self) -> KeyClass {
        KeyClass::from_expired_flag(self.expired.as_deref() == Some("true"))
    }
}

/// Handle token issuance request
///
/// POST /auth?expired={true|false}
///
/// Returns `{"token": "<jwt>"}` signed by a key of the requested class, or
/// 404 `{"error": "No appropriate key found"}` when the store holds none.
#[instrument(name = "jwks.auth.issue", skip_all, fields(key_class, status))]
pub async fn handle_auth(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AuthParams>,
) -> Result<Json<TokenResponse>, JwksError> {
    let class = params.key_class();
    tracing::Span::current().record("key_class", class.as_str());

    let result = state.issuer.issue_token(class).await;

    let status = match &result {
        Ok(_) => "success",
        Err(JwksError::NoKeyAvailable) => "not_found",
        Err(_) => "error",
    };
    tracing::Span::current().record("status", status);

    let issued = result?;

    Ok(Json(TokenResponse {
        token: issued.token,
    }))
}
