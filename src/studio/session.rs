use crate::studio::state::StudioState;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "studio_session";

struct Session {
    state: StudioState,
    last_seen: Instant,
}

/// In-memory studio state per browser session. The lock is never held across
/// an `.await`.
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, Session>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Runs `f` against the session's state, creating it if needed.
    pub fn with_session<T>(&self, id: Uuid, f: impl FnOnce(&mut StudioState) -> T) -> T {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        let ttl = self.ttl;
        sessions.retain(|key, s| *key == id || s.state.is_loading || now.duration_since(s.last_seen) < ttl);

        let session = sessions.entry(id).or_insert_with(|| {
            log::debug!("New studio session {}", id);
            Session {
                state: StudioState::new(),
                last_seen: now,
            }
        });
        session.last_seen = now;
        f(&mut session.state)
    }

    pub fn snapshot(&self, id: Uuid) -> StudioState {
        self.with_session(id, |state| state.clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sessions_are_isolated() {
        let store = SessionStore::new(Duration::from_secs(60));
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        store.with_session(a, |s| s.set_brand_name("Alpha"));
        store.with_session(b, |s| s.set_brand_name("Beta"));

        assert_eq!(store.snapshot(a).brand_name, "Alpha");
        assert_eq!(store.snapshot(b).brand_name, "Beta");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_idle_sessions_are_pruned() {
        let store = SessionStore::new(Duration::from_millis(0));
        let old = Uuid::new_v4();
        store.with_session(old, |s| s.set_brand_name("Old"));
        std::thread::sleep(Duration::from_millis(5));

        store.with_session(Uuid::new_v4(), |_| ());
        assert_eq!(store.len(), 1);
        assert_eq!(store.snapshot(old).brand_name, "Elegance");
    }
}
