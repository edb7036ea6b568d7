use std::sync::Arc;
use std::time::Duration;

use crate::analytics::AnalyticsSink;
use crate::config::Config;
use crate::error::AppError;
use crate::forms::{LeadFields, LeadForm};
use crate::pages::Page;
use crate::rate_limit::SubmissionRateLimiter;
use crate::session::{Session, SessionStore};
use crate::submission::{SubmissionCoordinator, WebhookSubmitter};

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub analytics: Arc<AnalyticsSink>,
    pub http: reqwest::Client,
    pub sessions: SessionStore,
    pub submission_limiter: SubmissionRateLimiter,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.webhook_timeout)
            .build()?;

        let analytics = Arc::new(AnalyticsSink::new(config.analytics_capacity));

        Ok(Self {
            sessions: SessionStore::new(analytics.clone(), config.dedup_window),
            analytics,
            http,
            submission_limiter: SubmissionRateLimiter::new(
                config.rate_limit,
                Duration::from_secs(config.rate_limit_window_secs),
            ),
            config,
        })
    }

    /// The session's instance of a page form, mounting it on first use.
    pub fn lead_form<F: LeadFields>(
        &self,
        session: &Session,
        page: &Page,
        form: &str,
        service_name: &str,
    ) -> Result<Arc<LeadForm<F>>, AppError> {
        let key = page.form_key(form);
        session
            .form(&key, || {
                let submitter = WebhookSubmitter::new(
                    self.http.clone(),
                    self.config.webhook_url.clone(),
                    page.path,
                    session.attribution.clone(),
                );
                let coordinator = SubmissionCoordinator::new(
                    submitter,
                    session.tracker.clone(),
                    session.notices.clone(),
                );
                LeadForm::new(service_name, coordinator)
            })
            .ok_or_else(|| AppError::Internal(format!("Form {key} has an unexpected field set")))
    }

    /// Periodic housekeeping for the in-memory structures.
    pub fn sweep(&self) {
        self.sessions.cleanup(self.config.session_ttl);
        self.submission_limiter.sweep();
    }
}
