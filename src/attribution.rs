use std::sync::RwLock;

use serde::Serialize;
use serde_json::{Map, Value};

pub const UTM_KEYS: [&str; 5] = [
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
];

/// Campaign attribution for a browsing session. Every key is always present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttributionSnapshot {
    pub utm_source: String,
    pub utm_medium: String,
    pub utm_campaign: String,
    pub utm_term: String,
    pub utm_content: String,
}

impl AttributionSnapshot {
    fn slot_mut(&mut self, key: &str) -> Option<&mut String> {
        match key {
            "utm_source" => Some(&mut self.utm_source),
            "utm_medium" => Some(&mut self.utm_medium),
            "utm_campaign" => Some(&mut self.utm_campaign),
            "utm_term" => Some(&mut self.utm_term),
            "utm_content" => Some(&mut self.utm_content),
            _ => None,
        }
    }

    /// Writes the five keys into `target`, overriding existing entries.
    pub fn merge_into(&self, target: &mut Map<String, Value>) {
        for (key, value) in [
            ("utm_source", &self.utm_source),
            ("utm_medium", &self.utm_medium),
            ("utm_campaign", &self.utm_campaign),
            ("utm_term", &self.utm_term),
            ("utm_content", &self.utm_content),
        ] {
            target.insert(key.to_string(), Value::String(value.clone()));
        }
    }
}

/// Session-scoped UTM store. Values only change when a URL carries a new,
/// non-empty value for a key.
#[derive(Debug, Default)]
pub struct AttributionStore {
    values: RwLock<AttributionSnapshot>,
}

impl AttributionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture UTM parameters from a URL, a path with a query, or a bare path.
    pub fn capture(&self, url: &str) {
        let query = url
            .split_once('?')
            .map(|(_, q)| q)
            .unwrap_or("");
        let query = query.split_once('#').map(|(q, _)| q).unwrap_or(query);
        self.capture_query(query);
    }

    pub fn capture_query(&self, query: &str) {
        if query.is_empty() {
            return;
        }

        let mut values = self
            .values
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut captured = false;

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            if value.is_empty() || !UTM_KEYS.contains(&&*key) {
                continue;
            }
            if let Some(slot) = values.slot_mut(&key) {
                *slot = value.into_owned();
                captured = true;
            }
        }

        if captured {
            tracing::debug!("Captured UTM parameters: {:?}", *values);
        }
    }

    pub fn snapshot(&self) -> AttributionSnapshot {
        self.values
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}
