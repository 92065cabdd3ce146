//! Metrics definitions for the authorizer.
//!
//! Prometheus naming conventions: `authz_` prefix, `_total` suffix for
//! counters.
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `effect`: 2 values (allow, deny)
//! - `reason`: one value per `AuthError` kind plus "allowed"
//! - `status`: 2 values (success, error)

use metrics::counter;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and return its render handle.
///
/// # Errors
///
/// Returns `BuildError` if a global recorder is already installed.
pub fn init_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    let builder = PrometheusBuilder::new();
    builder.install_recorder()
}

/// Record an authorization decision.
///
/// Metric: `authz_decisions_total`
/// Labels: `effect`, `reason`
///
/// The reason is the denial kind, or "allowed" for Allow decisions. This
/// is what keeps the uniform wire-facing Deny distinguishable in
/// telemetry.
pub fn record_decision(effect: &str, reason: &str) {
    counter!("authz_decisions_total",
        "effect" => effect.to_string(),
        "reason" => reason.to_string()
    )
    .increment(1);
}

/// Record a JWKS fetch attempt.
///
/// Metric: `authz_jwks_fetches_total`
/// Labels: `status`
pub fn record_jwks_fetch(status: &str) {
    counter!("authz_jwks_fetches_total",
        "status" => status.to_string()
    )
    .increment(1);
}
