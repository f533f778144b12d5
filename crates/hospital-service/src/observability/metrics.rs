//! Metrics definitions for the hospital registration service
//!
//! All metrics follow Prometheus naming conventions:
//! - `hospital_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded to prevent cardinality explosion:
//! - `status`: 2 values (success, error)
//! - `error_category`: 5 values (see `ErrorCategory`)
//! - `collection`: 6 values, one per backing document
//! - `operation`: bounded by code (read_all, create, update, delete, mutate)
//! - `outcome`: bounded by code
//! - `endpoint`: the matched route template, `unmatched` otherwise

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize Prometheus metrics recorder and return the handle
/// for serving metrics via HTTP.
///
/// Must be called before any metrics are recorded.
///
/// # Errors
///
/// Returns error if Prometheus recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        // Whole-document rewrites on local disk
        .set_buckets_for_metric(
            Matcher::Prefix("hospital_store".to_string()),
            &[
                0.0005, 0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000,
            ],
        )
        .map_err(|e| format!("Failed to set store latency buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus metrics recorder: {e}"))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record an HTTP request
///
/// Metric: `hospital_http_requests_total`, `hospital_http_request_duration_seconds`
/// Labels: `method`, `endpoint`, `status_code` / `status`
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    let status = categorize_status_code(status_code);

    histogram!("hospital_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => endpoint.to_string(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("hospital_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => endpoint.to_string(),
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "success",
        400..=499 => "client_error",
        _ => "error",
    }
}

// ============================================================================
// Token Metrics
// ============================================================================

/// Record session token issuance
///
/// Metric: `hospital_token_issuance_total`
/// Labels: `status`
pub fn record_token_issuance(status: &str) {
    counter!("hospital_token_issuance_total", "status" => status.to_string()).increment(1);
}

/// Record token validation result
///
/// Metric: `hospital_token_validations_total`
/// Labels: `status`, `error_category`
pub fn record_token_validation(status: &str, error_category: Option<&str>) {
    let category = error_category.unwrap_or("none");
    counter!("hospital_token_validations_total", "status" => status.to_string(), "error_category" => category.to_string())
        .increment(1);
}

// ============================================================================
// Store Metrics
// ============================================================================

/// Record a record store operation
///
/// Metric: `hospital_store_operation_duration_seconds`, `hospital_store_operations_total`
/// Labels: `collection`, `operation`, `status`
pub fn record_store_operation(collection: &str, operation: &str, status: &str, duration: Duration) {
    histogram!("hospital_store_operation_duration_seconds", "collection" => collection.to_string(), "operation" => operation.to_string())
        .record(duration.as_secs_f64());

    counter!("hospital_store_operations_total", "collection" => collection.to_string(), "operation" => operation.to_string(), "status" => status.to_string())
        .increment(1);
}

// ============================================================================
// Error Metrics
// ============================================================================

/// Record an error by category
///
/// Metric: `hospital_errors_total`
/// Labels: `operation`, `error_category`, `status_code`
pub fn record_error(operation: &str, error_category: &str, status_code: u16) {
    counter!("hospital_errors_total",
        "operation" => operation.to_string(),
        "error_category" => error_category.to_string(),
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

// ============================================================================
// Workflow Metrics
// ============================================================================

/// Record a registration status change attempt
///
/// Metric: `hospital_registration_transitions_total`
/// Labels: `outcome` (applied, unchanged, rejected, override)
pub fn record_registration_transition(outcome: &str) {
    counter!("hospital_registration_transitions_total", "outcome" => outcome.to_string())
        .increment(1);
}

/// Record a login attempt
///
/// Metric: `hospital_logins_total`
/// Labels: `outcome` (registered, authenticated, rejected)
pub fn record_login(outcome: &str) {
    counter!("hospital_logins_total", "outcome" => outcome.to_string()).increment(1);
}
