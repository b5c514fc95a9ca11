//! # Table Session Lock
//!
//! TTL-based exclusive flag per (store, table).
//!
//! The original system kept these flags in Redis with a key TTL; here the
//! same semantics are a deadline map. Expiry is purely time-based and not
//! tied to caller liveness: a crashed client's lock simply ages out.
//!
//! `unlock` carries no ownership token — any caller may clear any lock.
//! That is observed production behavior (the request layer authenticates
//! the caller before it can reach this component) and is kept as-is.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use smartorder_core::TableKey;
use tracing::debug;

/// Per-table session locks with a shared TTL.
pub struct TableSessionLock {
    deadlines: DashMap<TableKey, Instant>,
    ttl: Duration,
}

impl TableSessionLock {
    pub fn new(ttl: Duration) -> Self {
        TableSessionLock {
            deadlines: DashMap::new(),
            ttl,
        }
    }

    /// Sets (or refreshes) the lock for the configured TTL.
    pub fn lock(&self, key: &TableKey) {
        debug!(table = %key, ttl_secs = self.ttl.as_secs(), "session lock");
        self.deadlines.insert(key.clone(), Instant::now() + self.ttl);
    }

    /// Clears the lock immediately, regardless of who set it.
    pub fn unlock(&self, key: &TableKey) {
        debug!(table = %key, "session unlock");
        self.deadlines.remove(key);
    }

    /// True while the flag has not expired. Expired entries are evicted
    /// lazily on read.
    pub fn is_active(&self, key: &TableKey) -> bool {
        let now = Instant::now();
        let deadline = match self.deadlines.get(key) {
            Some(entry) => *entry,
            None => return false,
        };
        if deadline > now {
            return true;
        }
        self.deadlines.remove_if(key, |_, deadline| *deadline <= now);
        false
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> TableKey {
        TableKey::parse("s1", "t1").unwrap()
    }

    #[test]
    fn test_lock_unlock() {
        let locks = TableSessionLock::new(Duration::from_secs(60));
        let k = key();

        assert!(!locks.is_active(&k));
        locks.lock(&k);
        assert!(locks.is_active(&k));
        locks.unlock(&k);
        assert!(!locks.is_active(&k));
    }

    #[test]
    fn test_lock_expires_by_ttl() {
        let locks = TableSessionLock::new(Duration::from_millis(20));
        let k = key();

        locks.lock(&k);
        assert!(locks.is_active(&k));
        std::thread::sleep(Duration::from_millis(40));
        assert!(!locks.is_active(&k));
    }

    #[test]
    fn test_relock_refreshes_deadline() {
        let locks = TableSessionLock::new(Duration::from_millis(50));
        let k = key();

        locks.lock(&k);
        std::thread::sleep(Duration::from_millis(30));
        locks.lock(&k);
        std::thread::sleep(Duration::from_millis(30));
        // 60ms after the first lock, but only 30ms after the refresh.
        assert!(locks.is_active(&k));
    }
}
