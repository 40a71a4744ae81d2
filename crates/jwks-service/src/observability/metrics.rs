//! Metrics definitions for the JWKS service
//!
//! All metrics follow Prometheus naming conventions:
//! - `jwks_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `key_class`: 2 values (valid, expired)
//! - `status`: 2 values (success, error) plus `not_found` for issuance
//! - `endpoint`: the fixed route table, everything else is `other`

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize the Prometheus metrics recorder and return the handle used to
/// render `/metrics`.
///
/// # Errors
///
/// Returns an error if the recorder cannot be installed (e.g. one is
/// already installed in this process).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("jwks_http_request".to_string()),
            &[
                0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 2.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        // RS256 signing dominates issuance latency
        .set_buckets_for_metric(
            Matcher::Prefix("jwks_token_issuance".to_string()),
            &[0.001, 0.002, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250],
        )
        .map_err(|e| format!("Failed to set token issuance buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// Token Metrics
// ============================================================================

/// Record token issuance duration and outcome
///
/// Metric: `jwks_token_issuance_duration_seconds`, `jwks_token_issuance_total`
/// Labels: `key_class`, `status`
pub fn record_token_issuance(key_class: &str, status: &str, duration: Duration) {
    histogram!("jwks_token_issuance_duration_seconds", "key_class" => key_class.to_string(), "status" => status.to_string())
        .record(duration.as_secs_f64());

    counter!("jwks_token_issuance_total", "key_class" => key_class.to_string(), "status" => status.to_string())
        .increment(1);
}

// ============================================================================
// Key Metrics
// ============================================================================

/// Record JWKS document request
///
/// Metric: `jwks_requests_total`
/// Labels: `status`
pub fn record_jwks_request(status: &str) {
    counter!("jwks_requests_total", "status" => status.to_string()).increment(1);
}

/// Update the number of keys in the last published key set
///
/// Metric: `jwks_published_keys`
pub fn set_published_keys(count: usize) {
    gauge!("jwks_published_keys").set(count as f64);
}

/// Record a generated signing key
///
/// Metric: `jwks_keys_generated_total`
/// Labels: `key_class`
pub fn record_key_generated(key_class: &str) {
    counter!("jwks_keys_generated_total", "key_class" => key_class.to_string()).increment(1);
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record an HTTP request
///
/// Metric: `jwks_http_request_duration_seconds`, `jwks_http_requests_total`
/// Labels: `method`, `endpoint`, `status_code`
pub fn record_http_request(method: &str, path: &str, status_code: u16, duration: Duration) {
    let endpoint = normalize_endpoint(path);

    histogram!("jwks_http_request_duration_seconds", "method" => method.to_string(), "endpoint" => endpoint)
        .record(duration.as_secs_f64());

    counter!("jwks_http_requests_total", "method" => method.to_string(), "endpoint" => endpoint, "status_code" => status_code.to_string())
        .increment(1);
}

/// Collapse request paths onto the known route table.
fn normalize_endpoint(path: &str) -> &'static str {
    match path {
        "/.well-known/jwks.json" => "/.well-known/jwks.json",
        "/auth" => "/auth",
        "/health" => "/health",
        "/ready" => "/ready",
        "/metrics" => "/metrics",
        _ => "other",
    }
}
