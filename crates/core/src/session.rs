//! Live session tracking.
//!
//! A session is one client identified by the `sessionId` cookie. The store
//! is the only owner of session state; callers get clones.
//!
//! The service runs on a multi-threaded runtime, so every read-modify-write
//! happens under one mutex and never spans an await point.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::geo::{GeoResolver, Location};
use crate::useragent::{Browser, ClientAgent, Device};

/// A tracked client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Session ID (cookie value)
    pub id: String,
    /// Last observed client IP
    pub ip: String,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    /// Fixed when the session is created
    pub browser: Browser,
    /// Fixed when the session is created
    pub device: Device,
    /// Resolved once when the session is created
    pub location: Location,
    pub request_count: u64,
}

impl Session {
    fn new(id: String, ip: &str, agent: ClientAgent, location: Location, now: DateTime<Utc>) -> Self {
        Self {
            id,
            ip: ip.to_string(),
            first_seen: now,
            last_seen: now,
            browser: agent.browser,
            device: agent.device,
            location,
            request_count: 1,
        }
    }

    fn touch(&mut self, ip: &str, now: DateTime<Utc>) {
        // Clock skew between requests must not break lastSeen >= firstSeen.
        self.last_seen = now.max(self.first_seen);
        self.ip = ip.to_string();
        self.request_count += 1;
    }

    /// Whether the session has been idle longer than `window`.
    pub fn is_idle(&self, now: DateTime<Utc>, window: Duration) -> bool {
        now - self.last_seen > window
    }

    /// Whole minutes since the session started, rounded to nearest.
    pub fn duration_minutes(&self, now: DateTime<Utc>) -> i64 {
        let millis = (now - self.first_seen).num_milliseconds();
        (millis as f64 / 60_000.0).round() as i64
    }
}

/// Session projection returned to the admin layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSession {
    #[serde(flatten)]
    pub session: Session,
    /// Derived at read time, never stored
    pub duration_minutes: i64,
}

/// In-memory keyed collection of live sessions.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the session for `session_id` or start a new one.
    ///
    /// A known ID bumps `lastSeen` and `requestCount` and returns
    /// `(session, false)`. An absent or unrecognized ID gets a freshly
    /// generated identifier; the location is resolved exactly once, for the
    /// new session, and `(session, true)` is returned.
    pub fn get_or_create(
        &self,
        session_id: Option<&str>,
        ip: &str,
        agent: ClientAgent,
        geo: &GeoResolver,
        now: DateTime<Utc>,
    ) -> (Session, bool) {
        if let Some(id) = session_id {
            let mut sessions = self.sessions.lock();
            if let Some(session) = sessions.get_mut(id) {
                session.touch(ip, now);
                return (session.clone(), false);
            }
        }

        // Resolved outside the lock; the new ID cannot collide with a
        // concurrent insert.
        let location = geo.resolve(ip);
        let session = Session::new(Uuid::new_v4().to_string(), ip, agent, location, now);

        self.sessions
            .lock()
            .insert(session.id.clone(), session.clone());

        (session, true)
    }

    /// Look up a single session.
    pub fn get(&self, session_id: &str) -> Option<Session> {
        self.sessions.lock().get(session_id).cloned()
    }

    /// All live sessions, oldest first, with their current duration.
    pub fn snapshot(&self, now: DateTime<Utc>) -> Vec<ActiveSession> {
        let mut sessions: Vec<ActiveSession> = self
            .sessions
            .lock()
            .values()
            .map(|session| ActiveSession {
                duration_minutes: session.duration_minutes(now),
                session: session.clone(),
            })
            .collect();

        sessions.sort_by(|a, b| a.session.first_seen.cmp(&b.session.first_seen));
        sessions
    }

    /// Remove every session idle for longer than `window`.
    ///
    /// Returns the number of sessions removed.
    pub fn evict_older_than(&self, now: DateTime<Utc>, window: Duration) -> usize {
        let mut sessions = self.sessions.lock();
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_idle(now, window));
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}
