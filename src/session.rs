use std::any::Any;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use dashmap::DashMap;
use uuid::Uuid;

use crate::analytics::{AnalyticsSink, EventTracker};
use crate::attribution::AttributionStore;
use crate::forms::{LeadFields, LeadForm};
use crate::submission::notify::NoticeQueue;

pub const SESSION_COOKIE: &str = "lp_session";

/// One browsing session: its attribution, its event history, pending
/// notices and the form instances it has mounted. Nothing here outlives the
/// session.
pub struct Session {
    pub id: Uuid,
    pub attribution: Arc<AttributionStore>,
    pub tracker: Arc<EventTracker>,
    pub notices: Arc<NoticeQueue>,
    forms: DashMap<String, Arc<dyn Any + Send + Sync>>,
    last_seen: Mutex<Instant>,
}

impl Session {
    fn new(id: Uuid, tracker: EventTracker) -> Self {
        Self {
            id,
            attribution: Arc::new(AttributionStore::new()),
            tracker: Arc::new(tracker),
            notices: Arc::new(NoticeQueue::new()),
            forms: DashMap::new(),
            last_seen: Mutex::new(Instant::now()),
        }
    }

    /// The form mounted under `key`, created with `init` on first use.
    /// Returns `None` if `key` already holds a form of another field set.
    pub fn form<F, I>(&self, key: &str, init: I) -> Option<Arc<LeadForm<F>>>
    where
        F: LeadFields,
        I: FnOnce() -> LeadForm<F>,
    {
        let form = self
            .forms
            .entry(key.to_string())
            .or_insert_with(|| -> Arc<dyn Any + Send + Sync> { Arc::new(init()) })
            .value()
            .clone();
        form.downcast::<LeadForm<F>>().ok()
    }

    fn touch(&self) {
        *self
            .last_seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Instant::now();
    }

    fn idle_for(&self, now: Instant) -> Duration {
        let last_seen = *self
            .last_seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        now.duration_since(last_seen)
    }
}

pub struct SessionStore {
    sessions: DashMap<Uuid, Arc<Session>>,
    analytics: Arc<AnalyticsSink>,
    dedup_window: Duration,
}

impl SessionStore {
    pub fn new(analytics: Arc<AnalyticsSink>, dedup_window: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            analytics,
            dedup_window,
        }
    }

    /// The session named by the cookie jar, or a fresh one with its cookie
    /// added to the returned jar.
    pub fn resolve(&self, jar: CookieJar, secure: bool) -> (CookieJar, Arc<Session>) {
        let existing = jar
            .get(SESSION_COOKIE)
            .and_then(|c| c.value().parse::<Uuid>().ok())
            .and_then(|id| self.get(id));

        if let Some(session) = existing {
            session.touch();
            return (jar, session);
        }

        let id = Uuid::now_v7();
        let tracker = EventTracker::new(self.analytics.clone(), self.dedup_window);
        let session = Arc::new(Session::new(id, tracker));
        self.sessions.insert(id, session.clone());
        tracing::debug!(session = %id, "Started session");

        let cookie = Cookie::build((SESSION_COOKIE, id.to_string()))
            .path("/")
            .http_only(true)
            .secure(secure)
            .same_site(SameSite::Lax);
        (jar.add(cookie), session)
    }

    pub fn get(&self, id: Uuid) -> Option<Arc<Session>> {
        self.sessions.get(&id).map(|s| s.value().clone())
    }

    /// Drop sessions idle for longer than `ttl` and expired dedup keys of the
    /// rest. In-flight submissions keep their own handle and complete
    /// unaffected.
    pub fn cleanup(&self, ttl: Duration) {
        let now = Instant::now();
        self.sessions.retain(|_, session| session.idle_for(now) < ttl);
        for session in self.sessions.iter() {
            session.tracker.evict_expired();
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
