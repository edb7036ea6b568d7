pub mod fields;

use std::marker::PhantomData;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::analytics::{FORM_START_EVENT, Properties};
use crate::submission::{Fields, Notice, SubmissionCoordinator, SubmissionResult};

/// How a field is rendered on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Tel,
    Select(&'static [&'static str]),
    MultiSelect(&'static [&'static str]),
    Consent,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

/// A typed field set for one kind of lead form.
pub trait LeadFields: DeserializeOwned + Serialize + Send + 'static {
    const FIELDS: &'static [FieldSpec];

    /// `None` when the form has no LGPD consent checkbox.
    fn consent(&self) -> Option<bool> {
        None
    }

    fn validate(&self) -> Result<(), FormError> {
        match self.consent() {
            Some(false) => Err(FormError::Invalid("LGPD consent is required".to_string())),
            _ => Ok(()),
        }
    }

    fn into_fields(self) -> Fields {
        flatten(&self)
    }
}

/// Flattens a serializable field set into string values. Booleans become
/// `"true"`/`"false"`, lists are joined with `", "`, nulls are dropped.
pub fn flatten<T: Serialize>(value: &T) -> Fields {
    let mut out = Fields::new();
    let object = match serde_json::to_value(value) {
        Ok(Value::Object(object)) => object,
        Ok(_) => return out,
        Err(e) => {
            tracing::warn!("Failed to serialize form fields: {e}");
            return out;
        }
    };

    for (key, value) in object {
        let text = match value {
            Value::Null => continue,
            Value::String(s) => s,
            Value::Array(items) => items
                .iter()
                .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                .collect::<Vec<_>>()
                .join(", "),
            other => other.to_string(),
        };
        out.insert(key, text);
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormState {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// A submission from this form instance is still outstanding.
    Busy,
    Invalid(String),
}

impl std::fmt::Display for FormError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormError::Busy => write!(f, "A submission is already in progress"),
            FormError::Invalid(msg) => write!(f, "Invalid form: {msg}"),
        }
    }
}

impl std::error::Error for FormError {}

/// One mounted lead form: `Idle -> Submitting -> {Succeeded | Failed}`, with
/// re-submission allowed from either outcome but never while submitting.
pub struct LeadForm<F> {
    service_name: String,
    coordinator: SubmissionCoordinator,
    state: Mutex<FormState>,
    started: AtomicBool,
    _fields: PhantomData<fn() -> F>,
}

impl<F: LeadFields> LeadForm<F> {
    pub fn new(service_name: impl Into<String>, coordinator: SubmissionCoordinator) -> Self {
        Self {
            service_name: service_name.into(),
            coordinator,
            state: Mutex::new(FormState::Idle),
            started: AtomicBool::new(false),
            _fields: PhantomData,
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn state(&self) -> FormState {
        *self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_loading(&self) -> bool {
        self.coordinator.is_loading()
    }

    /// First field interaction. Emits `form_start` once per instance until a
    /// successful submission resets it. A start suppressed as a repeat leaves
    /// the instance unstarted. Returns whether the event was emitted.
    pub fn start(&self) -> bool {
        if self.started.swap(true, Ordering::AcqRel) {
            return false;
        }
        let mut props = Properties::new();
        props.insert("type".to_string(), Value::from(self.service_name.as_str()));
        let emitted = self.coordinator.tracker().track_event(FORM_START_EVENT, props);
        if !emitted {
            self.started.store(false, Ordering::Release);
        }
        emitted
    }

    pub async fn submit(&self, fields: F) -> Result<SubmissionResult, FormError> {
        if let Err(e) = fields.validate() {
            self.coordinator.notifier().notify(Notice::consent_required());
            return Err(e);
        }

        let mut attempt = Attempt::begin(&self.state)?;
        let fields = fields.into_fields();
        let started = &self.started;

        let result = self
            .coordinator
            .handle_submit(&self.service_name, &fields, || {
                started.store(false, Ordering::Release);
            })
            .await;

        attempt.finish(if result.success {
            FormState::Succeeded
        } else {
            FormState::Failed
        });
        Ok(result)
    }
}

/// Marks the form as submitting. Dropped without `finish` (the request was
/// abandoned), the form falls back to `Idle` so it can be submitted again.
struct Attempt<'a> {
    state: &'a Mutex<FormState>,
    finished: bool,
}

impl<'a> Attempt<'a> {
    fn begin(state: &'a Mutex<FormState>) -> Result<Self, FormError> {
        let mut current = state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if *current == FormState::Submitting {
            return Err(FormError::Busy);
        }
        *current = FormState::Submitting;
        Ok(Self {
            state,
            finished: false,
        })
    }

    fn finish(&mut self, outcome: FormState) {
        *self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = outcome;
        self.finished = true;
    }
}

impl Drop for Attempt<'_> {
    fn drop(&mut self) {
        if !self.finished {
            *self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = FormState::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize)]
    struct Sample {
        nome: String,
        aceite: bool,
        tags: Vec<String>,
        apelido: Option<String>,
    }

    #[test]
    fn flatten_stringifies_values() {
        let fields = flatten(&Sample {
            nome: "Ana".into(),
            aceite: true,
            tags: vec!["Vida".into(), "Auto".into()],
            apelido: None,
        });

        assert_eq!(fields["nome"], "Ana");
        assert_eq!(fields["aceite"], "true");
        assert_eq!(fields["tags"], "Vida, Auto");
        assert!(!fields.contains_key("apelido"));
    }

    #[test]
    fn attempt_rejects_reentry_and_resets_when_abandoned() {
        let state = Mutex::new(FormState::Idle);
        {
            let _attempt = Attempt::begin(&state).unwrap();
            assert!(matches!(Attempt::begin(&state), Err(FormError::Busy)));
        }
        assert_eq!(*state.lock().unwrap(), FormState::Idle);
    }

    #[test]
    fn attempt_allows_resubmit_after_outcome() {
        let state = Mutex::new(FormState::Idle);
        Attempt::begin(&state).unwrap().finish(FormState::Failed);
        assert_eq!(*state.lock().unwrap(), FormState::Failed);

        Attempt::begin(&state).unwrap().finish(FormState::Succeeded);
        assert_eq!(*state.lock().unwrap(), FormState::Succeeded);
    }
}
