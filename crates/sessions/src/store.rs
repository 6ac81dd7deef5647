use std::{sync::Arc, time::Duration};

use {dashmap::DashMap, tokio_util::sync::CancellationToken, tracing::debug};

use crate::session::{ConversationSession, now_secs};

/// Sessions idle longer than this are treated as absent.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// How often the background sweeper scans for expired sessions.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Concurrent per-conversation session store.
///
/// Every mutation goes through a single dashmap entry operation, so
/// concurrent workers touching the same chat id never lose updates to a
/// read-then-write race.
pub struct SessionStore {
    sessions: DashMap<i64, ConversationSession>,
    idle_timeout_secs: i64,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_timeout(IDLE_TIMEOUT)
    }

    pub fn with_timeout(idle_timeout: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            idle_timeout_secs: idle_timeout.as_secs() as i64,
        }
    }

    fn is_expired(&self, last_activity: i64, now: i64) -> bool {
        now - last_activity > self.idle_timeout_secs
    }

    /// Return the chat's live session, creating a fresh idle one if there is
    /// none (or only an expired one). Always refreshes `last_activity`.
    pub fn get(&self, chat_id: i64) -> ConversationSession {
        let now = now_secs();
        let mut entry = self
            .sessions
            .entry(chat_id)
            .or_insert_with(|| ConversationSession::new(chat_id));
        if self.is_expired(entry.last_activity, now) {
            *entry = ConversationSession::new(chat_id);
        }
        entry.last_activity = now;
        entry.clone()
    }

    /// Like [`get`](Self::get) but never creates. An expired entry counts as
    /// absent and is evicted as a side effect.
    pub fn find(&self, chat_id: i64) -> Option<ConversationSession> {
        let now = now_secs();
        let live = match self.sessions.get_mut(&chat_id) {
            Some(mut entry) if !self.is_expired(entry.last_activity, now) => {
                entry.last_activity = now;
                Some(entry.clone())
            },
            Some(_) => None,
            None => return None,
        };
        if live.is_none() {
            self.sessions
                .remove_if(&chat_id, |_, s| self.is_expired(s.last_activity, now_secs()));
        }
        live
    }

    /// Persist the full session state, stamping `last_activity` to now.
    pub fn save(&self, mut session: ConversationSession) {
        session.last_activity = now_secs();
        self.sessions.insert(session.chat_id, session);
    }

    /// Atomically mutate the chat's session (created idle if absent),
    /// returning the state after the mutation.
    pub fn update<F>(&self, chat_id: i64, f: F) -> ConversationSession
    where
        F: FnOnce(&mut ConversationSession),
    {
        let now = now_secs();
        let mut entry = self
            .sessions
            .entry(chat_id)
            .or_insert_with(|| ConversationSession::new(chat_id));
        if self.is_expired(entry.last_activity, now) {
            *entry = ConversationSession::new(chat_id);
        }
        f(&mut entry);
        entry.last_activity = now;
        entry.clone()
    }

    /// Remove the session unconditionally.
    pub fn reset(&self, chat_id: i64) {
        self.sessions.remove(&chat_id);
    }

    /// Evict all expired sessions, returning how many were removed. Expiry
    /// is re-checked under the shard lock at the moment of removal, so an
    /// entry re-activated mid-sweep is never evicted.
    pub fn sweep(&self) -> usize {
        let mut evicted = 0;
        self.sessions.retain(|_, s| {
            let keep = !self.is_expired(s.last_activity, now_secs());
            if !keep {
                evicted += 1;
            }
            keep
        });
        evicted
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Spawn the periodic sweeper. Cancel the returned token to stop it.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> CancellationToken {
        let store = Arc::clone(self);
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // the first tick fires immediately
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let evicted = store.sweep();
                        if evicted > 0 {
                            debug!(evicted, "evicted expired sessions");
                        }
                    }
                }
            }
        });
        cancel
    }
}
