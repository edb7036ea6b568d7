pub mod coordinator;
pub mod notify;
pub mod parser;
pub mod payload;
pub mod webhook;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use coordinator::SubmissionCoordinator;
pub use notify::{Notice, NoticeKind, Notifier};
pub use payload::LeadSubmission;
pub use webhook::{WebhookError, WebhookSubmitter};

/// Flat form values as they leave the form, keyed by field name.
pub type Fields = BTreeMap<String, String>;

/// Outcome of one webhook submission, handed back to the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubmissionResult {
    pub fn ok(data: serde_json::Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

impl From<Result<serde_json::Value, WebhookError>> for SubmissionResult {
    fn from(result: Result<serde_json::Value, WebhookError>) -> Self {
        match result {
            Ok(data) => SubmissionResult::ok(data),
            Err(e) => SubmissionResult::failed(e.to_string()),
        }
    }
}
