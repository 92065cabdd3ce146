//! HTTP routes for the authorizer service.
//!
//! The service surface is deliberately small: the gateway POSTs a request
//! description to `/v1/authorize` and receives the serialized decision.
//! Denials are ordinary 200 responses carrying a Deny policy; translating
//! a Deny into 401/403 for the original caller is the gateway's job.

use crate::authorizer::{Authorizer, AuthorizeRequest};
use crate::policy::Decision;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

pub use crate::observability::metrics::init_metrics_recorder;

/// Application state shared across all handlers.
pub struct AppState {
    /// The request authorizer (holds the shared key set cache).
    pub authorizer: Authorizer,
}

/// Build the application routes.
///
/// - `POST /v1/authorize` - Evaluate a request description to a decision
/// - `GET /health` - Liveness probe
/// - `GET /metrics` - Prometheus exposition
///
/// TraceLayer logs requests; TimeoutLayer bounds each evaluation to 30
/// seconds end to end.
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    Router::new()
        .route("/v1/authorize", post(authorize))
        .route("/health", get(health_check))
        .route(
            "/metrics",
            get(move || async move { metrics_handle.render() }),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
}

/// Evaluate one request description.
async fn authorize(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AuthorizeRequest>,
) -> Json<Decision> {
    Json(state.authorizer.authorize(&request).await)
}

/// Liveness probe for orchestration.
async fn health_check() -> &'static str {
    "OK"
}
