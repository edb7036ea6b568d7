#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use reqwest::Client;
use serde_json::Value;

use leadpipe::analytics::{AnalyticsSink, EventTracker};
use leadpipe::attribution::AttributionStore;
use leadpipe::config::Config;
use leadpipe::forms::{LeadFields, LeadForm};
use leadpipe::state::{AppState, SharedState};
use leadpipe::submission::notify::NoticeQueue;
use leadpipe::submission::{SubmissionCoordinator, WebhookSubmitter};

/// How the stub webhook answers.
#[derive(Clone)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
    pub delay: Duration,
}

impl Reply {
    pub fn json(body: &str) -> Self {
        Self {
            status: 200,
            content_type: "application/json",
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn text(body: &str) -> Self {
        Self {
            status: 200,
            content_type: "text/plain; charset=utf-8",
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: "error".to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Clone)]
struct StubState {
    received: Arc<Mutex<Vec<Value>>>,
    reply: Reply,
}

/// A webhook receiver on an ephemeral port that records every payload.
pub struct StubWebhook {
    pub url: String,
    received: Arc<Mutex<Vec<Value>>>,
}

impl StubWebhook {
    pub fn received(&self) -> Vec<Value> {
        self.received.lock().unwrap().clone()
    }
}

async fn receive(State(stub): State<StubState>, Json(payload): Json<Value>) -> impl IntoResponse {
    stub.received.lock().unwrap().push(payload);
    if !stub.reply.delay.is_zero() {
        tokio::time::sleep(stub.reply.delay).await;
    }
    (
        StatusCode::from_u16(stub.reply.status).unwrap(),
        [(header::CONTENT_TYPE, stub.reply.content_type)],
        stub.reply.body.clone(),
    )
}

pub async fn spawn_webhook(reply: Reply) -> StubWebhook {
    let received = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/hook", post(receive))
        .with_state(StubState {
            received: received.clone(),
            reply,
        });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub webhook");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Stub webhook failed");
    });

    StubWebhook {
        url: format!("http://{addr}/hook"),
        received,
    }
}

/// Everything a standalone form instance needs, with handles for assertions.
pub struct Harness {
    pub analytics: Arc<AnalyticsSink>,
    pub tracker: Arc<EventTracker>,
    pub attribution: Arc<AttributionStore>,
    pub notices: Arc<NoticeQueue>,
    client: Client,
    webhook_url: String,
}

impl Harness {
    pub fn new(webhook_url: &str) -> Self {
        Self::with_window(webhook_url, Duration::from_millis(2000))
    }

    pub fn with_window(webhook_url: &str, window: Duration) -> Self {
        let analytics = Arc::new(AnalyticsSink::default());
        Self {
            tracker: Arc::new(EventTracker::new(analytics.clone(), window)),
            analytics,
            attribution: Arc::new(AttributionStore::new()),
            notices: Arc::new(NoticeQueue::new()),
            client: Client::new(),
            webhook_url: webhook_url.to_string(),
        }
    }

    pub fn coordinator(&self, page: &str) -> SubmissionCoordinator {
        let submitter = WebhookSubmitter::new(
            self.client.clone(),
            self.webhook_url.clone(),
            page,
            self.attribution.clone(),
        );
        SubmissionCoordinator::new(submitter, self.tracker.clone(), self.notices.clone())
    }

    pub fn form<F: LeadFields>(&self, service: &str, page: &str) -> LeadForm<F> {
        LeadForm::new(service, self.coordinator(page))
    }

    /// `generate_lead` entries in the data layer.
    pub fn conversions(&self) -> Vec<Value> {
        self.analytics
            .data_layer()
            .into_iter()
            .filter(|e| e["event"] == "generate_lead")
            .collect()
    }
}

pub fn test_config(webhook_url: &str) -> Config {
    Config {
        webhook_url: webhook_url.to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        max_body_size: 65_536,
        trusted_proxies: Vec::new(),
        log_level: "warn".to_string(),
        dedup_window: Duration::from_millis(2000),
        analytics_capacity: 10_000,
        webhook_timeout: Duration::from_secs(5),
        session_ttl: Duration::from_secs(1800),
        rate_limit: 100,
        rate_limit_window_secs: 60,
        whatsapp_number: "5511999999999".to_string(),
        cookie_secure: false,
    }
}

/// A running site instance.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub state: SharedState,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// GET a page, returning the session cookie it set (if any) and the response.
    pub async fn visit(&self, path: &str, cookie: Option<&str>) -> (Option<String>, reqwest::Response) {
        let mut req = self.client.get(self.url(path));
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        let resp = req.send().await.expect("page request failed");
        (session_cookie(&resp), resp)
    }

    pub async fn post_json(&self, path: &str, cookie: Option<&str>, body: &Value) -> reqwest::Response {
        let mut req = self.client.post(self.url(path)).json(body);
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        req.send().await.expect("json post failed")
    }

    pub async fn post_form(&self, path: &str, cookie: Option<&str>, form: &[(&str, &str)]) -> reqwest::Response {
        let mut req = self.client.post(self.url(path)).form(form);
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        req.send().await.expect("form post failed")
    }
}

/// `name=value` of the session cookie set by a response.
pub fn session_cookie(resp: &reqwest::Response) -> Option<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(leadpipe::session::SESSION_COOKIE))
        .and_then(|v| v.split(';').next())
        .map(|v| v.to_string())
}

pub async fn spawn_app(config: Config) -> TestApp {
    let state: SharedState = Arc::new(AppState::new(config).expect("Failed to build state"));
    let app = leadpipe::build_app(state.clone());

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp { addr, client, state }
}
