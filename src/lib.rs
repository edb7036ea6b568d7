pub mod config;
pub mod error;
pub mod state;
pub mod analytics;
pub mod attribution;
pub mod client_ip;
pub mod forms;
pub mod pages;
pub mod rate_limit;
pub mod routes;
pub mod session;
pub mod submission;
pub mod views;

use std::time::Duration;

use axum::Router;
use axum::http::{HeaderName, HeaderValue};
use tokio::task::JoinHandle;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::state::SharedState;

pub fn build_app(state: SharedState) -> Router {
    Router::new()
        .merge(routes::api_routes())
        .merge(routes::lead_routes())
        .merge(views::view_routes())
        .nest_service("/static", ServeDir::new("static"))
        .route("/health", axum::routing::get(health))
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state)
}

/// Sweeps expired dedup keys, idle sessions and rate limit windows.
pub fn spawn_maintenance(state: SharedState, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            state.sweep();
            tracing::trace!(sessions = state.sessions.len(), "Maintenance sweep done");
        }
    })
}

async fn health() -> &'static str {
    "ok"
}
