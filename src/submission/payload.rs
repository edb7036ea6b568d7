use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::attribution::AttributionSnapshot;

use super::Fields;

/// One lead, frozen at submit time.
#[derive(Debug, Clone)]
pub struct LeadSubmission {
    pub service_name: String,
    pub fields: Fields,
    pub page: String,
    pub timestamp: String,
    pub attribution: AttributionSnapshot,
}

impl LeadSubmission {
    pub fn new(
        service_name: &str,
        fields: &Fields,
        page: &str,
        attribution: AttributionSnapshot,
    ) -> Self {
        Self {
            service_name: service_name.to_string(),
            fields: fields.clone(),
            page: page.to_string(),
            timestamp: now_iso8601(),
            attribution,
        }
    }

    /// Flat webhook body: form fields, then `servico`, `pagina`, `timestamp`,
    /// then the attribution keys. Later keys override earlier ones.
    pub fn to_payload(&self) -> Value {
        let mut body = Map::new();
        for (k, v) in &self.fields {
            body.insert(k.clone(), Value::String(v.clone()));
        }
        body.insert("servico".to_string(), Value::String(self.service_name.clone()));
        body.insert("pagina".to_string(), Value::String(self.page.clone()));
        body.insert("timestamp".to_string(), Value::String(self.timestamp.clone()));
        self.attribution.merge_into(&mut body);
        Value::Object(body)
    }
}

/// UTC, millisecond precision, `Z` suffix.
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
