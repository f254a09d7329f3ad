//! In-memory registry of in-progress valuation conversations.
//!
//! Sessions are independent units of state keyed by an opaque id; every
//! store operation is individually atomic and there is no cross-session
//! locking. Idle sessions expire after a fixed TTL, enforced eagerly on
//! lookup and periodically by a background sweep.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

const SESSION_TTL_MINUTES: i64 = 30;

/// Default cadence for the background expiry sweep.
pub const SWEEP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(300);

/// One in-flight conversation. `questions` is fixed at creation; `answers`
/// grows by exactly one per accepted message. The cursor is the answer
/// count, so it cannot drift from the transcript.
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub id: String,
    pub habit_name: String,
    pub category: String,
    pub reason: Option<String>,
    pub questions: Vec<String>,
    pub answers: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ChatSession {
    pub fn cursor(&self) -> usize {
        self.answers.len()
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn is_complete(&self) -> bool {
        self.cursor() >= self.questions.len()
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// The question waiting for an answer, if any.
    pub fn next_question(&self) -> Option<&str> {
        self.questions.get(self.cursor()).map(String::as_str)
    }
}

/// Concurrency-safe session registry shared by all request workers.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, ChatSession>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: Duration::minutes(SESSION_TTL_MINUTES),
        }
    }

    /// Override the TTL. Intended for tests.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn create(
        &self,
        habit_name: &str,
        category: &str,
        reason: Option<&str>,
        questions: Vec<String>,
    ) -> ChatSession {
        let now = Utc::now();
        let session = ChatSession {
            id: uuid::Uuid::new_v4().to_string(),
            habit_name: habit_name.to_string(),
            category: category.to_string(),
            reason: reason.map(str::to_string),
            questions,
            answers: Vec::new(),
            created_at: now,
            expires_at: now + self.ttl,
        };

        let mut sessions = self.write();
        sessions.insert(session.id.clone(), session.clone());
        info!(session_id = %session.id, habit = %session.habit_name, "chat session created");
        session
    }

    /// Look up a session snapshot. An expired session is treated as absent
    /// and removed on the spot, whether or not the sweep got there first.
    pub fn get(&self, session_id: &str) -> Option<ChatSession> {
        let mut sessions = self.write();
        match sessions.get(session_id) {
            Some(session) if session.is_expired() => {
                warn!(session_id, "session expired");
                sessions.remove(session_id);
                None
            }
            Some(session) => Some(session.clone()),
            None => {
                debug!(session_id, "session not found");
                None
            }
        }
    }

    /// Append one answer and return the updated snapshot. Answers past the
    /// question count are not appended; the cursor never exceeds it.
    pub fn add_answer(&self, session_id: &str, answer: &str) -> Option<ChatSession> {
        let mut sessions = self.write();
        let session = sessions.get_mut(session_id)?;
        if session.is_expired() {
            sessions.remove(session_id);
            return None;
        }
        if session.answers.len() < session.questions.len() {
            session.answers.push(answer.to_string());
            debug!(session_id, cursor = session.answers.len(), "answer recorded");
        }
        Some(session.clone())
    }

    pub fn remove(&self, session_id: &str) -> bool {
        let removed = self.write().remove(session_id).is_some();
        if removed {
            info!(session_id, "session removed");
        }
        removed
    }

    /// Drop every session whose deadline has passed. Returns the number
    /// removed.
    pub fn sweep_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.write();
        let before = sessions.len();
        sessions.retain(|_, session| session.expires_at >= now);
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, ChatSession>> {
        self.sessions.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, ChatSession>> {
        self.sessions.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// Periodic expiry sweep, normally run at [`SWEEP_INTERVAL`]. Runs until
/// the returned handle is aborted; each tick holds the store's write lock
/// only for a single scan-and-remove.
pub fn spawn_sweeper(
    store: Arc<SessionStore>,
    every: std::time::Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        // first tick fires immediately; skip it
        interval.tick().await;
        loop {
            interval.tick().await;
            let removed = store.sweep_expired();
            if removed > 0 {
                info!(removed, "expired sessions swept");
            }
        }
    })
}
