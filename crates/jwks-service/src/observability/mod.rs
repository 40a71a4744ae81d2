//! Observability for the JWKS service
//!
//! Structured logging goes through `tracing`; handlers are instrumented with
//! `skip_all` so request data and key material are never captured
//! implicitly. Metrics go through the `metrics` facade and are exported in
//! Prometheus format at `GET /metrics`.

pub mod metrics;

pub use metrics::{
    init_metrics_recorder, record_http_request, record_jwks_request, record_key_generated,
    record_token_issuance, set_published_keys,
};
