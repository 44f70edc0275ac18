//! Shared server state: the read-only puzzle index plus live sessions.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use chess_puzzler::chess_core::StandardRules;
use chess_puzzler::{CorpusIndex, PuzzleSession};

use crate::config::Config;
use crate::error::AppError;

pub type SessionId = u64;

#[derive(Clone)]
pub struct AppState {
    pub index: Arc<CorpusIndex>,
    pub sessions: Arc<SessionStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(index: CorpusIndex, config: Config) -> Self {
        Self {
            index: Arc::new(index),
            sessions: Arc::new(SessionStore::new(config.session_ttl, config.max_sessions)),
            config: Arc::new(config),
        }
    }
}

struct SessionEntry {
    session: PuzzleSession<StandardRules>,
    touched: Instant,
}

type SessionMap = HashMap<SessionId, SessionEntry>;

/// Sessions are owned here and handed out only under the lock.
///
/// Abandoned sessions expire after `ttl` without a request; at `capacity`
/// the least recently used one is evicted to make room.
pub struct SessionStore {
    next_id: AtomicU64,
    ttl: Duration,
    capacity: usize,
    sessions: Mutex<SessionMap>,
}

impl SessionStore {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            next_id: AtomicU64::new(0),
            ttl,
            capacity: capacity.max(1),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn insert(&self, session: PuzzleSession<StandardRules>) -> Result<SessionId, AppError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let now = Instant::now();

        let mut sessions = self.lock()?;
        self.expire(&mut sessions, now);
        while sessions.len() >= self.capacity {
            let oldest = sessions
                .iter()
                .min_by_key(|(id, entry)| (entry.touched, **id))
                .map(|(id, _)| *id);
            match oldest {
                Some(oldest) => {
                    sessions.remove(&oldest);
                    tracing::debug!(session_id = oldest, "Session evicted at capacity");
                }
                None => break,
            }
        }

        sessions.insert(id, SessionEntry { session, touched: now });
        Ok(id)
    }

    pub fn remove(&self, id: SessionId) -> Result<Option<PuzzleSession<StandardRules>>, AppError> {
        Ok(self.lock()?.remove(&id).map(|entry| entry.session))
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop sessions idle for longer than the TTL as of `now`.
    /// Returns how many were dropped.
    pub fn prune_idle(&self, now: Instant) -> Result<usize, AppError> {
        let mut sessions = self.lock()?;
        Ok(self.expire(&mut sessions, now))
    }

    /// Run `f` against one session while holding the store lock.
    pub fn with_session<T>(
        &self,
        id: SessionId,
        f: impl FnOnce(&mut PuzzleSession<StandardRules>) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut sessions = self.lock()?;
        let entry = sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;
        entry.touched = Instant::now();
        f(&mut entry.session)
    }

    fn expire(&self, sessions: &mut SessionMap, now: Instant) -> usize {
        let before = sessions.len();
        sessions.retain(|_, entry| now.saturating_duration_since(entry.touched) <= self.ttl);
        let dropped = before - sessions.len();
        if dropped > 0 {
            tracing::info!(dropped, "Idle sessions expired");
        }
        dropped
    }

    fn lock(&self) -> Result<MutexGuard<'_, SessionMap>, AppError> {
        self.sessions
            .lock()
            .map_err(|_| AppError::Internal("session store lock poisoned".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_puzzler::Puzzle;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    fn session() -> PuzzleSession<StandardRules> {
        let puzzle = Puzzle::new("p", START, &["e2e4", "e7e5", "g1f3"], 1200, &["opening"]);
        PuzzleSession::open(Arc::new(puzzle), StandardRules).unwrap()
    }

    #[test]
    fn test_idle_sessions_expire() {
        let store = SessionStore::new(Duration::from_secs(60), 100);
        let id = store.insert(session()).unwrap();
        store.insert(session()).unwrap();

        assert_eq!(store.prune_idle(Instant::now()).unwrap(), 0);
        assert_eq!(store.len(), 2);

        let later = Instant::now() + Duration::from_secs(61);
        assert_eq!(store.prune_idle(later).unwrap(), 2);
        assert!(store.is_empty());
        assert!(matches!(
            store.with_session(id, |_| Ok(())),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_capacity_evicts_oldest_session() {
        let store = SessionStore::new(Duration::from_secs(60), 2);
        let first = store.insert(session()).unwrap();
        let second = store.insert(session()).unwrap();
        let third = store.insert(session()).unwrap();

        assert_eq!(store.len(), 2);
        assert!(store.remove(first).unwrap().is_none());
        assert!(store.remove(second).unwrap().is_some());
        assert!(store.remove(third).unwrap().is_some());
    }

    #[test]
    fn test_remove_hands_back_the_session() {
        let store = SessionStore::new(Duration::from_secs(60), 10);
        let id = store.insert(session()).unwrap();
        store
            .with_session(id, |s| {
                s.submit_move("e7", "e5", None).map_err(AppError::from)?;
                Ok(())
            })
            .unwrap();

        let finished = store.remove(id).unwrap().unwrap();
        assert!(finished.attempt().unwrap().solved);
        assert!(store.remove(id).unwrap().is_none());
    }
}
