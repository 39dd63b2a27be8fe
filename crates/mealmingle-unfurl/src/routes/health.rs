//! Health check endpoint.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    store: &'static str,
}

/// Public health check endpoint.
///
/// Returns basic service health for load balancer probes. The store is not
/// queried; a slow backend must not fail the probe.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "mealmingle-unfurl",
        version: env!("CARGO_PKG_VERSION"),
        store: state.store.backend(),
    })
}
