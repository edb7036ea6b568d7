use axum::Json;
use axum::extract::State;
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::analytics::{Metric, Properties, is_primitive, is_reserved};
use crate::error::AppError;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct TrackRequest {
    pub event: String,
    #[serde(default)]
    pub properties: Properties,
}

/// Engagement events sent by the page (CTA clicks, scroll depth, widget
/// opens), deduplicated against the visitor's session.
pub async fn track(
    State(state): State<SharedState>,
    jar: CookieJar,
    Json(req): Json<TrackRequest>,
) -> Result<(CookieJar, Json<Value>), AppError> {
    let event = req.event.trim();
    if event.is_empty() {
        return Err(AppError::BadRequest("event is required".to_string()));
    }
    if is_reserved(event) {
        return Err(AppError::BadRequest(format!(
            "Event {event} is emitted by the server only"
        )));
    }
    if let Some((key, _)) = req.properties.iter().find(|(_, v)| !is_primitive(v)) {
        return Err(AppError::BadRequest(format!(
            "Property {key} must be a string, number or boolean"
        )));
    }

    let (jar, session) = state.sessions.resolve(jar, state.config.cookie_secure);
    let emitted = session.tracker.track_event(event, req.properties);
    Ok((jar, Json(json!({ "emitted": emitted }))))
}

pub async fn data_layer(State(state): State<SharedState>) -> Json<Vec<Value>> {
    Json(state.analytics.data_layer())
}

pub async fn metrics(State(state): State<SharedState>) -> Json<Vec<Metric>> {
    Json(state.analytics.metrics())
}
