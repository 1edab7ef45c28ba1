use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

use minitter_shared::types::api::{HealthCheck, HealthResponse, HealthStatus};

use crate::store;
use crate::{AppState, SERVICE_NAME};

// --- GET /ping ---

pub async fn ping() -> &'static str {
    "pong"
}

// --- GET /health ---

pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let database = match store::blocking(state.store.clone(), |store| store.ping()).await {
        Ok(()) => HealthCheck::healthy("database"),
        Err(e) => {
            tracing::warn!(error = %e, "database health check failed");
            HealthCheck::unhealthy("database", "unreachable")
        }
    };

    let response = HealthResponse::healthy(SERVICE_NAME, env!("CARGO_PKG_VERSION")).with_checks(vec![database]);
    let status = match response.status {
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        HealthStatus::Healthy => StatusCode::OK,
    };

    (status, Json(response))
}

// --- GET /metrics ---

pub async fn metrics(State(state): State<Arc<AppState>>) -> (StatusCode, String) {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, String::new()),
    }
}
