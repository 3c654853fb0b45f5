//! Session store
//!
//! Holds one [`SessionContext`] per browser session. Sessions are created on
//! first use, ended explicitly, or dropped once idle longer than the
//! configured timeout. Eviction runs whenever the store is accessed; there
//! is no background sweeper.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use ecomind_common::session::ScoreSnapshot;
use ecomind_common::{SessionContext, TipBook, TipPicker};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionContext>>>,
    tips: Arc<TipBook>,
    picker: Arc<TipPicker>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(tips: TipBook, picker: TipPicker, idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            tips: Arc::new(tips),
            picker: Arc::new(picker),
            idle_timeout,
        }
    }

    /// Run `f` against the session `id`, creating a fresh session when the
    /// id is absent or unknown. Returns the id actually used.
    pub async fn with_session<R>(
        &self,
        id: Option<Uuid>,
        f: impl FnOnce(&mut SessionContext) -> R,
    ) -> (Uuid, R) {
        self.with_session_at(id, Utc::now(), f).await
    }

    pub(crate) async fn with_session_at<R>(
        &self,
        id: Option<Uuid>,
        now: DateTime<Utc>,
        f: impl FnOnce(&mut SessionContext) -> R,
    ) -> (Uuid, R) {
        let mut sessions = self.sessions.write().await;
        self.evict_idle(&mut sessions, now);

        let id = id
            .filter(|id| sessions.contains_key(id))
            .unwrap_or_else(Uuid::new_v4);
        let context = sessions.entry(id).or_insert_with(|| {
            debug!("Starting session {}", id);
            SessionContext::new(id, self.picker.pick(&self.tips))
        });

        context.touch(now);
        (id, f(context))
    }

    /// Score and tip of an existing session, without creating one
    pub async fn peek(&self, id: Uuid) -> Option<ScoreSnapshot> {
        self.sessions.read().await.get(&id).map(SessionContext::snapshot)
    }

    /// Discard a session; false if it did not exist
    pub async fn end(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            debug!("Ended session {}", id);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    fn evict_idle(&self, sessions: &mut HashMap<Uuid, SessionContext>, now: DateTime<Utc>) {
        let before = sessions.len();
        sessions.retain(|_, context| now - context.last_seen() <= self.idle_timeout);

        let evicted = before - sessions.len();
        if evicted > 0 {
            info!("Evicted {} idle session(s)", evicted);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SessionStore {
        SessionStore::new(
            TipBook::parse("Turn off the tap while brushing."),
            TipPicker::seeded(9),
            Duration::minutes(30),
        )
    }

    #[tokio::test]
    async fn test_unknown_id_creates_session() {
        let store = store();
        let stale = Uuid::new_v4();

        let (id, tip) = store
            .with_session(Some(stale), |ctx| ctx.daily_tip().map(str::to_string))
            .await;

        assert_ne!(id, stale);
        assert_eq!(tip.as_deref(), Some("Turn off the tap while brushing."));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_known_id_is_reused() {
        let store = store();
        let (id, _) = store.with_session(None, |ctx| ctx.submit_energy_query("fan", 2.0)).await;
        let (again, score) = store.with_session(Some(id), |ctx| ctx.score()).await;

        assert_eq!(id, again);
        assert_eq!(score, 5);
        assert_eq!(store.peek(id).await.map(|s| s.score), Some(5));
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = store();
        let (a, _) = store.with_session(None, |ctx| ctx.submit_energy_query("fan", 2.0)).await;
        let (b, score) = store.with_session(None, |ctx| ctx.score()).await;

        assert_ne!(a, b);
        assert_eq!(score, 0);
    }

    #[tokio::test]
    async fn test_end_session() {
        let store = store();
        let (id, _) = store.with_session(None, |_| ()).await;

        assert!(store.end(id).await);
        assert!(!store.end(id).await);
        assert!(store.peek(id).await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_idle_sessions_are_evicted() {
        let store = store();
        let start = Utc::now();
        let (idle, _) = store.with_session_at(None, start, |_| ()).await;

        let later = start + Duration::minutes(31);
        let (fresh, _) = store.with_session_at(Some(idle), later, |_| ()).await;

        assert_ne!(idle, fresh);
        assert!(store.peek(idle).await.is_none());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_activity_keeps_session_alive() {
        let store = store();
        let start = Utc::now();
        let (id, _) = store.with_session_at(None, start, |_| ()).await;
        let (id2, _) = store
            .with_session_at(Some(id), start + Duration::minutes(20), |_| ())
            .await;
        let (id3, _) = store
            .with_session_at(Some(id), start + Duration::minutes(40), |_| ())
            .await;

        assert_eq!(id, id2);
        assert_eq!(id, id3);
    }
}
