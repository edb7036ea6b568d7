pub mod dedup;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

pub use dedup::EventDeduplicator;

pub const CONVERSION_EVENT: &str = "generate_lead";
pub const FORM_START_EVENT: &str = "form_start";
pub const FORM_SUBMIT_EVENT: &str = "form_submit";

/// Events only the server may emit.
pub const RESERVED_EVENTS: [&str; 3] = [CONVERSION_EVENT, FORM_START_EVENT, FORM_SUBMIT_EVENT];

/// Entries kept per channel when no capacity is configured.
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Event properties. `Map` keeps keys sorted, which makes the serialized
/// form usable as a dedup key.
pub type Properties = Map<String, Value>;

#[derive(Debug, Clone, Serialize)]
pub struct TrackedEvent {
    pub name: String,
    pub properties: Properties,
}

impl TrackedEvent {
    pub fn new(name: impl Into<String>, properties: Properties) -> Self {
        Self {
            name: name.into(),
            properties,
        }
    }

    /// Deterministic key built from the name and the serialized properties.
    pub fn dedup_key(&self) -> String {
        let props = serde_json::to_string(&self.properties).unwrap_or_default();
        format!("{}-{}", self.name, props)
    }

    /// `{ event: name, ...properties }`, properties winning on clash.
    pub fn to_data_layer(&self) -> Value {
        let mut entry = Map::new();
        entry.insert("event".to_string(), Value::String(self.name.clone()));
        for (k, v) in &self.properties {
            entry.insert(k.clone(), v.clone());
        }
        Value::Object(entry)
    }

    fn category(&self) -> String {
        self.properties
            .get("type")
            .and_then(|v| v.as_str())
            .unwrap_or("Engagement")
            .to_string()
    }
}

/// Only strings, numbers, booleans and null are accepted as property values.
pub fn is_primitive(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

pub fn is_reserved(name: &str) -> bool {
    RESERVED_EVENTS.contains(&name)
}

#[derive(Debug, Clone, Serialize)]
pub struct Metric {
    pub name: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Append-only buffer that drops its oldest entries past `capacity`.
struct Ring<T> {
    capacity: usize,
    entries: Mutex<VecDeque<T>>,
}

impl<T: Clone> Ring<T> {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(VecDeque::new()),
        }
    }

    fn push(&self, entry: T) {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.push_back(entry);
        while entries.len() > self.capacity {
            entries.pop_front();
        }
    }

    fn snapshot(&self) -> Vec<T> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .cloned()
            .collect()
    }
}

/// Process-wide analytics destination: the data layer consumed by tag
/// management and the metrics channel. Both keep the most recent entries.
pub struct AnalyticsSink {
    data_layer: Ring<Value>,
    metrics: Ring<Metric>,
}

impl AnalyticsSink {
    pub fn new(capacity: usize) -> Self {
        Self {
            data_layer: Ring::new(capacity),
            metrics: Ring::new(capacity),
        }
    }

    fn emit(&self, event: &TrackedEvent) {
        tracing::info!(event = %event.name, "Firing event");
        self.data_layer.push(event.to_data_layer());
        self.record_metric(&event.name, 1.0, Some(event.category()));
    }

    /// Conversion for a successful lead. Never deduplicated.
    pub fn push_conversion(&self, service: &str) {
        let mut entry = Map::new();
        entry.insert("event".to_string(), Value::from(CONVERSION_EVENT));
        entry.insert("currency".to_string(), Value::from("BRL"));
        entry.insert("value".to_string(), Value::from("0"));
        entry.insert("service".to_string(), Value::from(service));
        self.data_layer.push(Value::Object(entry));
        tracing::info!(service, "Pushed {CONVERSION_EVENT} to data layer");
    }

    pub fn record_metric(&self, name: &str, value: f64, label: Option<String>) {
        self.metrics.push(Metric {
            name: name.to_string(),
            value,
            label,
            recorded_at: Utc::now(),
        });
    }

    pub fn track_page_view(&self, path: &str) {
        self.record_metric("page_view", 1.0, Some(path.to_string()));
    }

    pub fn data_layer(&self) -> Vec<Value> {
        self.data_layer.snapshot()
    }

    pub fn metrics(&self) -> Vec<Metric> {
        self.metrics.snapshot()
    }

    /// Number of data layer entries for `event`.
    pub fn count(&self, event: &str) -> usize {
        self.data_layer
            .snapshot()
            .iter()
            .filter(|entry| entry["event"] == event)
            .count()
    }
}

impl Default for AnalyticsSink {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// One visitor's path into the sink. Repeats are suppressed against this
/// visitor's own history only.
pub struct EventTracker {
    sink: Arc<AnalyticsSink>,
    dedup: EventDeduplicator,
}

impl EventTracker {
    pub fn new(sink: Arc<AnalyticsSink>, window: Duration) -> Self {
        Self {
            sink,
            dedup: EventDeduplicator::new(window),
        }
    }

    /// Emits the event unless an identical one is inside the dedup window.
    /// Returns whether the event was emitted.
    pub fn track_event(&self, name: &str, properties: Properties) -> bool {
        let event = TrackedEvent::new(name, properties);
        if self.dedup.should_suppress(&event.dedup_key()) {
            tracing::debug!("Suppressed duplicate event: {name}");
            return false;
        }
        self.sink.emit(&event);
        true
    }

    pub fn push_conversion(&self, service: &str) {
        self.sink.push_conversion(service);
    }

    pub fn evict_expired(&self) {
        self.dedup.evict_expired();
    }
}
