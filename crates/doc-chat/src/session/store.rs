//! In-memory session registry with idle expiry and LRU eviction

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::SessionState;
use crate::config::SessionConfig;

/// One user's session. Actions lock `state` for their whole duration, so a
/// session handles one action at a time.
pub struct SessionHandle {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    state: Mutex<SessionState>,
    last_seen: parking_lot::Mutex<Instant>,
}

impl SessionHandle {
    fn new(id: Uuid) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            state: Mutex::new(SessionState::default()),
            last_seen: parking_lot::Mutex::new(Instant::now()),
        }
    }

    /// Wait for exclusive access to the session state
    pub async fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().await
    }

    fn touch(&self) {
        *self.last_seen.lock() = Instant::now();
    }

    fn last_seen(&self) -> Instant {
        *self.last_seen.lock()
    }

    fn idle_for(&self) -> Duration {
        self.last_seen().elapsed()
    }
}

/// All live sessions, keyed by id
pub struct SessionStore {
    sessions: DashMap<Uuid, Arc<SessionHandle>>,
    idle_ttl: Duration,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            idle_ttl: Duration::from_secs(config.idle_ttl_secs),
            max_sessions: config.max_sessions.max(1),
        }
    }

    /// Resume the session `id` if it is known and not expired, otherwise
    /// start and register a new one
    pub fn get_or_create(&self, id: Option<Uuid>) -> Arc<SessionHandle> {
        match self.resume(id) {
            Some(handle) => handle,
            None => {
                let handle = self.start();
                self.register(&handle);
                handle
            }
        }
    }

    /// The live session `id`, marked as just used. Expired sessions are dropped.
    pub fn resume(&self, id: Option<Uuid>) -> Option<Arc<SessionHandle>> {
        let id = id?;
        let handle = self.sessions.get(&id).map(|entry| entry.value().clone())?;
        if handle.idle_for() <= self.idle_ttl {
            handle.touch();
            return Some(handle);
        }
        tracing::debug!("Session {} expired", id);
        self.sessions.remove(&id);
        None
    }

    /// A new session that is not yet in the store; see [`SessionStore::register`]
    pub fn start(&self) -> Arc<SessionHandle> {
        Arc::new(SessionHandle::new(Uuid::new_v4()))
    }

    /// Add a started session, evicting expired and then least recently used
    /// sessions to make room. Already registered sessions are left alone.
    pub fn register(&self, handle: &Arc<SessionHandle>) {
        if self.sessions.contains_key(&handle.id) {
            return;
        }

        let ttl = self.idle_ttl;
        self.sessions.retain(|_, existing| existing.idle_for() <= ttl);

        while self.sessions.len() >= self.max_sessions {
            let oldest = self
                .sessions
                .iter()
                .min_by_key(|entry| entry.value().last_seen())
                .map(|entry| *entry.key());
            match oldest {
                Some(id) => {
                    tracing::debug!("Session store full, evicting {}", id);
                    self.sessions.remove(&id);
                }
                None => break,
            }
        }

        handle.touch();
        self.sessions.insert(handle.id, handle.clone());
        tracing::debug!("New session {} ({} live)", handle.id, self.sessions.len());
    }

    /// Look up a live session without creating one
    pub fn get(&self, id: &Uuid) -> Option<Arc<SessionHandle>> {
        self.sessions
            .get(id)
            .map(|entry| entry.value().clone())
            .filter(|handle| handle.idle_for() <= self.idle_ttl)
    }

    /// Drop a session; returns true if it existed
    pub fn remove(&self, id: &Uuid) -> bool {
        self.sessions.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
