use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use crate::srs::session::ReviewSession;

/// Holder for the active in-memory review sessions. Sessions are ephemeral:
/// they live here for the duration of one study run and are dropped when
/// finished, abandoned, or idle past the TTL (the sweeper worker's job).
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, ReviewSession>>,
    idle_ttl: Duration,
}

impl SessionRegistry {
    pub fn new(idle_ttl_secs: u64) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_ttl: Duration::seconds(idle_ttl_secs.min(i64::MAX as u64) as i64),
        }
    }

    pub async fn insert(&self, session: ReviewSession) {
        self.sessions
            .write()
            .await
            .insert(session.id().to_string(), session);
    }

    /// Run `f` against a session under the write lock. Returns `None` when
    /// the session does not exist (expired, swept, or never created).
    pub async fn with_session<R>(
        &self,
        session_id: &str,
        f: impl FnOnce(&mut ReviewSession) -> R,
    ) -> Option<R> {
        let mut sessions = self.sessions.write().await;
        sessions.get_mut(session_id).map(f)
    }

    pub async fn remove(&self, session_id: &str) -> Option<ReviewSession> {
        self.sessions.write().await.remove(session_id)
    }

    pub async fn active_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop abandoned sessions and sessions idle beyond the TTL. Returns the
    /// number removed.
    pub async fn sweep(&self, now: DateTime<Utc>) -> usize {
        let cutoff = now - self.idle_ttl;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_abandoned() && session.last_activity_at() > cutoff);
        before - sessions.len()
    }
}
