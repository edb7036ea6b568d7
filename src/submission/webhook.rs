use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

use crate::attribution::AttributionStore;

use super::payload::LeadSubmission;
use super::{Fields, SubmissionResult};

#[derive(Debug)]
pub enum WebhookError {
    Status(u16),
    Transport(String),
    Body(String),
}

impl std::fmt::Display for WebhookError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WebhookError::Status(code) => write!(f, "Webhook responded with status: {code}"),
            WebhookError::Transport(msg) => write!(f, "Webhook request failed: {msg}"),
            WebhookError::Body(msg) => write!(f, "Failed to read webhook response: {msg}"),
        }
    }
}

impl std::error::Error for WebhookError {}

/// Sends one form instance's leads to the webhook. One POST per call, no retry.
pub struct WebhookSubmitter {
    client: reqwest::Client,
    endpoint: String,
    page: String,
    attribution: Arc<AttributionStore>,
    in_flight: AtomicBool,
}

impl WebhookSubmitter {
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        page: impl Into<String>,
        attribution: Arc<AttributionStore>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            page: page.into(),
            attribution,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Never fails: transport and status errors come back as an unsuccessful result.
    pub async fn submit(&self, service_name: &str, fields: &Fields) -> SubmissionResult {
        let _guard = InFlight::enter(&self.in_flight);

        let lead = LeadSubmission::new(service_name, fields, &self.page, self.attribution.snapshot());
        let payload = lead.to_payload();
        tracing::debug!("Preparing webhook payload for {service_name}: {payload}");

        let result = self.post(&payload).await;
        match &result {
            Ok(data) => tracing::info!(service = service_name, "Webhook accepted lead: {data}"),
            Err(e) => tracing::warn!(service = service_name, "Webhook submission failed: {e}"),
        }
        result.into()
    }

    async fn post(&self, payload: &Value) -> Result<Value, WebhookError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| WebhookError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(WebhookError::Status(status.as_u16()));
        }

        let is_json = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));

        let text = resp
            .text()
            .await
            .map_err(|e| WebhookError::Body(e.to_string()))?;

        // Webhooks often answer with plain text such as "Accepted".
        if is_json {
            Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
        } else {
            Ok(Value::String(text))
        }
    }
}

/// Holds the in-flight flag for the lifetime of a submit, including when the
/// submit future is dropped before completing.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        InFlight(flag)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
