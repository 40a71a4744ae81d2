use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

/// Message returned to callers when no key of the requested class exists.
pub const NO_KEY_MESSAGE: &str = "No appropriate key found";

#[derive(Debug, Error)]
pub enum JwksError {
    /// The requested key class (valid or expired) is not present in the store.
    #[error("No appropriate key found")]
    NoKeyAvailable,

    #[error("Storage error: {0}")]
    Storage(String),

    /// Stored key bytes did not decode into an RSA private key.
    #[error("Malformed key material: {0}")]
    MalformedKeyMaterial(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Internal server error")]
    Internal,
}

impl JwksError {
    /// Bounded label for metrics and log fields.
    pub fn category(&self) -> &'static str {
        match self {
            JwksError::NoKeyAvailable => "no_key",
            // Corrupt key rows are a data integrity failure of the store
            JwksError::Storage(_) | JwksError::MalformedKeyMaterial(_) => "storage",
            JwksError::Crypto(_) => "crypto",
            JwksError::Internal => "internal",
        }
    }
}

impl IntoResponse for JwksError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            JwksError::NoKeyAvailable => (StatusCode::NOT_FOUND, NO_KEY_MESSAGE),
            JwksError::Storage(_) | JwksError::MalformedKeyMaterial(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal storage error occurred",
            ),
            JwksError::Crypto(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal cryptographic error occurred",
            ),
            JwksError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal error occurred",
            ),
        };

        if status.is_server_error() {
            // Driver and parser details stay server-side
            tracing::error!(error = %self, category = self.category(), "Request failed");
        }

        let body = ErrorResponse {
            error: message.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
