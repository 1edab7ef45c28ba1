use axum::{middleware, routing::{get, post}, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use minitter_shared::middleware::metrics_middleware;

pub mod config;
pub mod extract;
pub mod models;
pub mod routes;
pub mod schema;
pub mod services;
pub mod store;

use store::Store;

pub const SERVICE_NAME: &str = "minitter-api";

/// Everything a handler may touch, built once at startup.
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store, metrics: None }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/ping", get(routes::health::ping))
        .route("/health", get(routes::health::health_check))
        .route("/sign-up", post(routes::users::sign_up))
        .route("/users/:user_id", get(routes::users::get_user))
        .route("/tweet", post(routes::tweets::tweet))
        .route("/timeline/:user_id", get(routes::tweets::timeline))
        .route("/follow", post(routes::follows::follow))
        .route("/unfollow", post(routes::follows::unfollow));

    if state.metrics.is_some() {
        app = app.route("/metrics", get(routes::health::metrics));
    }

    app.route_layer(middleware::from_fn(metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
