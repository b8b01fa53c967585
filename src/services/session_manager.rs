// src/services/session_manager.rs
use std::{
    collections::HashMap,
    fmt::{self, Debug},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::error::AppError;

/// Upstream conversation handle supplied by the caller. Always ASCII digits.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(String);

pub fn is_valid_session_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
}

impl SessionId {
    pub fn parse(id: &str) -> Result<Self, AppError> {
        if is_valid_session_id(id) {
            Ok(Self(id.to_string()))
        } else {
            Err(AppError::InvalidSessionId)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

type LockMap = HashMap<String, Arc<AsyncMutex<()>>>;

/// Serializes relay calls that share a session id so the upstream never sees
/// two interleaved handshakes for the same conversation.
#[derive(Clone, Default)]
pub struct SessionLocks {
    inner: Arc<Mutex<LockMap>>,
}

impl Debug for SessionLocks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionLocks")
            .field("sessions", &self.len())
            .finish()
    }
}

fn lock_map(map: &Mutex<LockMap>) -> MutexGuard<'_, LockMap> {
    map.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other call holds this session, then hold it until the
    /// returned guard is dropped.
    pub async fn acquire(&self, id: &SessionId) -> SessionGuard {
        let lock = {
            let mut map = lock_map(&self.inner);
            Arc::clone(map.entry(id.as_str().to_string()).or_default())
        };

        // Built before waiting so a cancelled wait still cleans up the entry.
        let mut guard = SessionGuard {
            locks: Arc::clone(&self.inner),
            id: id.as_str().to_string(),
            held: None,
        };
        guard.held = Some(lock.lock_owned().await);
        guard
    }

    /// Number of session ids currently held or waited on.
    pub fn len(&self) -> usize {
        lock_map(&self.inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct SessionGuard {
    locks: Arc<Mutex<LockMap>>,
    id: String,
    held: Option<OwnedMutexGuard<()>>,
}

impl Debug for SessionGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionGuard").field("id", &self.id).finish()
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.held.take();
        let mut map = lock_map(&self.locks);
        // Only the map's own reference left: nobody holds or waits on it.
        if map
            .get(&self.id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            map.remove(&self.id);
        }
    }
}
