pub mod analytics;
pub mod leads;

use axum::Router;
use axum::routing::{get, post};

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        .route("/api/events", post(analytics::track))
        .route("/api/data-layer", get(analytics::data_layer))
        .route("/api/metrics", get(analytics::metrics))
}

pub fn lead_routes() -> Router<SharedState> {
    Router::new()
        .route("/leads/{slug}", post(leads::submit_lead))
        .route("/contato/{slug}", post(leads::submit_contact))
        .route("/forms/{slug}/{form}/start", post(leads::start_form))
}
