use std::sync::Arc;

use serde_json::Value;

use crate::analytics::{EventTracker, FORM_SUBMIT_EVENT, Properties};

use super::notify::{Notice, Notifier};
use super::webhook::WebhookSubmitter;
use super::{Fields, SubmissionResult};

/// Runs a lead submission end to end for one form instance.
///
/// The `form_submit` attempt event is emitted before the webhook call. The
/// `generate_lead` conversion is emitted after a successful call only, once
/// per call, and bypasses the deduplicator.
pub struct SubmissionCoordinator {
    submitter: WebhookSubmitter,
    tracker: Arc<EventTracker>,
    notifier: Arc<dyn Notifier>,
}

impl SubmissionCoordinator {
    pub fn new(
        submitter: WebhookSubmitter,
        tracker: Arc<EventTracker>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            submitter,
            tracker,
            notifier,
        }
    }

    pub fn tracker(&self) -> &Arc<EventTracker> {
        &self.tracker
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    pub fn is_loading(&self) -> bool {
        self.submitter.is_in_flight()
    }

    pub async fn handle_submit<F>(
        &self,
        service_name: &str,
        fields: &Fields,
        on_success: F,
    ) -> SubmissionResult
    where
        F: FnOnce(),
    {
        self.tracker
            .track_event(FORM_SUBMIT_EVENT, attempt_properties(service_name, fields));

        let result = self.submitter.submit(service_name, fields).await;

        if result.success {
            self.tracker.push_conversion(service_name);
            on_success();
            self.notifier.notify(Notice::submitted());
        } else {
            self.notifier.notify(Notice::submit_failed());
        }

        result
    }
}

/// `{ type: service, ...fields }`
fn attempt_properties(service_name: &str, fields: &Fields) -> Properties {
    let mut props = Properties::new();
    props.insert("type".to_string(), Value::from(service_name));
    for (k, v) in fields {
        props.insert(k.clone(), Value::from(v.as_str()));
    }
    props
}
