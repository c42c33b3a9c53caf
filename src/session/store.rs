//! In-memory session store with idle expiry
//!
//! Sessions live in lock-striped shards so unrelated sessions never contend.
//! Every access first sweeps out sessions idle longer than the TTL; a
//! periodic background sweep can be added with [`SessionStore::spawn_sweeper`].

use std::collections::HashMap;
use std::hash::{BuildHasher, RandomState};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::{BoundedHistory, HistoryEntry};

/// Default history bound per session
pub const DEFAULT_MAX_QUEUE_LENGTH: usize = 10;

/// Default idle timeout (10 minutes)
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(600);

/// Default number of lock shards
pub const DEFAULT_SHARDS: usize = 16;

/// Store parameters, fixed for the store's lifetime
#[derive(Debug, Clone, Copy)]
pub struct StoreConfig {
    /// Maximum history entries kept per session
    pub max_queue_length: usize,
    /// Idle duration after which a session is evicted
    pub session_ttl: Duration,
    /// Number of independently locked shards (1 = single global lock)
    pub shards: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_queue_length: DEFAULT_MAX_QUEUE_LENGTH,
            session_ttl: DEFAULT_SESSION_TTL,
            shards: DEFAULT_SHARDS,
        }
    }
}

#[derive(Debug)]
struct Session {
    history: BoundedHistory,
    last_access: Instant,
}

type Shard = Mutex<HashMap<String, Session>>;

/// Session id → bounded history, with idle eviction
#[derive(Debug)]
pub struct SessionStore {
    shards: Box<[Shard]>,
    hasher: RandomState,
    max_queue_length: usize,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl SessionStore {
    /// Create an empty store
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        let shards = (0..config.shards.max(1))
            .map(|_| Mutex::new(HashMap::new()))
            .collect();

        Self {
            shards,
            hasher: RandomState::new(),
            max_queue_length: config.max_queue_length,
            ttl: config.session_ttl,
        }
    }

    /// History bound applied to every session
    #[must_use]
    pub const fn max_queue_length(&self) -> usize {
        self.max_queue_length
    }

    /// Idle timeout
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fetch a session's history, creating the session if needed.
    ///
    /// Sweeps expired sessions first and stamps the session's last access.
    /// Returns a snapshot, oldest entry first.
    pub fn get_or_create(&self, session_id: &str) -> Vec<HistoryEntry> {
        self.sweep_expired();

        let now = Instant::now();
        let mut shard = self.shard(session_id).lock();
        let session = shard.entry(session_id.to_string()).or_insert_with(|| {
            tracing::debug!(session_id, "created session");
            Session {
                history: BoundedHistory::new(self.max_queue_length),
                last_access: now,
            }
        });
        session.last_access = now;
        session.history.to_vec()
    }

    /// Append a completed turn to a session's history.
    ///
    /// Append and trim happen under one lock. A session evicted while its
    /// turn was in flight is recreated holding just this entry.
    pub fn record(&self, session_id: &str, entry: HistoryEntry) {
        self.sweep_expired();

        let now = Instant::now();
        let mut shard = self.shard(session_id).lock();
        let session = shard
            .entry(session_id.to_string())
            .or_insert_with(|| Session {
                history: BoundedHistory::new(self.max_queue_length),
                last_access: now,
            });

        if session.history.push(entry).is_some() {
            tracing::trace!(session_id, "dropped oldest history entry");
        }
        session.last_access = now;
    }

    /// Remove every session idle longer than the TTL.
    ///
    /// Returns the number of sessions evicted.
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut evicted = 0;

        for shard in &*self.shards {
            let mut sessions = shard.lock();
            sessions.retain(|session_id, session| {
                let expired = now.saturating_duration_since(session.last_access) > self.ttl;
                if expired {
                    tracing::info!(session_id = %session_id, "cleaned up expired session");
                    evicted += 1;
                }
                !expired
            });
        }

        evicted
    }

    /// Drop all sessions. Best effort: writers racing with this may reinsert.
    pub fn clear(&self) {
        for shard in &*self.shards {
            shard.lock().clear();
        }
    }

    /// Whether a session is present. Does not sweep or touch the session.
    #[must_use]
    pub fn contains(&self, session_id: &str) -> bool {
        self.shard(session_id).lock().contains_key(session_id)
    }

    /// Peek at a session's history without sweeping or touching it
    #[must_use]
    pub fn history(&self, session_id: &str) -> Option<Vec<HistoryEntry>> {
        self.shard(session_id)
            .lock()
            .get(session_id)
            .map(|s| s.history.to_vec())
    }

    /// Number of live sessions
    #[must_use]
    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.lock().len()).sum()
    }

    /// Whether the store holds no sessions
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|s| s.lock().is_empty())
    }

    /// Sweep on a fixed interval in the background.
    ///
    /// The task ends once the last strong reference to the store is dropped.
    ///
    /// # Panics
    ///
    /// Panics if `every` is zero.
    #[must_use]
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let store = Arc::downgrade(self);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(store) = store.upgrade() else {
                    tracing::debug!("session store dropped, stopping sweeper");
                    break;
                };
                let evicted = store.sweep_expired();
                if evicted > 0 {
                    tracing::debug!(evicted, "background sweep");
                }
            }
        })
    }

    fn shard(&self, session_id: &str) -> &Shard {
        // Truncation is fine: only used to pick a shard
        #[allow(clippy::cast_possible_truncation)]
        let idx = self.hasher.hash_one(session_id) as usize % self.shards.len();
        &self.shards[idx]
    }
}
