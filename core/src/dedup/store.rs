use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::clock::Clock;

/// What kind of work an admission reserves. Distinct classes for the same issue
/// do not block each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionClass {
    Triage,
    FixRequest,
}

impl ActionClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Triage => "triage",
            Self::FixRequest => "fix-request",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub repository: String,
    pub issue: u64,
    pub action: ActionClass,
}

impl DedupKey {
    /// Repository names are folded to lowercase.
    pub fn new(repository: &str, issue: u64, action: ActionClass) -> Self {
        Self {
            repository: repository.trim().to_ascii_lowercase(),
            issue,
            action,
        }
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}:{}", self.repository, self.issue, self.action.as_str())
    }
}

/// At-most-once admission guard.
pub trait DedupStore: Send + Sync {
    /// Records the current time under `key` and returns true when the key is
    /// absent or older than the TTL; otherwise returns false and changes nothing.
    /// Atomic per key across concurrent callers.
    fn admit(&self, key: &DedupKey) -> bool;

    /// Drops entries older than the TTL relative to `now`. Returns how many went.
    fn sweep(&self, now: DateTime<Utc>) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local store. The lock is held only for the map operation itself.
pub struct MemoryDedupStore {
    entries: Mutex<HashMap<DedupKey, DateTime<Utc>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl MemoryDedupStore {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    fn expired(&self, admitted_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - admitted_at > self.ttl
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<DedupKey, DateTime<Utc>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl DedupStore for MemoryDedupStore {
    fn admit(&self, key: &DedupKey) -> bool {
        let now = self.clock.now();
        let mut entries = self.entries();
        match entries.get(key) {
            Some(&admitted_at) if !self.expired(admitted_at, now) => false,
            _ => {
                entries.insert(key.clone(), now);
                true
            }
        }
    }

    fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, admitted_at| !self.expired(*admitted_at, now));
        before - entries.len()
    }

    fn len(&self) -> usize {
        self.entries().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::ManualClock;
    use chrono::TimeZone;

    fn setup() -> (Arc<ManualClock>, MemoryDedupStore) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        ));
        let store = MemoryDedupStore::new(Duration::hours(24), clock.clone());
        (clock, store)
    }

    fn key(issue: u64) -> DedupKey {
        DedupKey::new("acme/api", issue, ActionClass::Triage)
    }

    #[test]
    fn test_second_admission_within_window_rejected() {
        let (clock, store) = setup();
        assert!(store.admit(&key(1)));
        clock.advance(Duration::hours(23));
        assert!(!store.admit(&key(1)));
    }

    #[test]
    fn test_admission_reopens_after_ttl() {
        let (clock, store) = setup();
        assert!(store.admit(&key(1)));
        assert!(!store.admit(&key(1)));
        clock.advance(Duration::hours(24) + Duration::seconds(1));
        assert!(store.admit(&key(1)));
        // The re-admission starts a fresh window.
        clock.advance(Duration::hours(1));
        assert!(!store.admit(&key(1)));
    }

    #[test]
    fn test_exactly_ttl_old_is_still_duplicate() {
        let (clock, store) = setup();
        assert!(store.admit(&key(1)));
        clock.advance(Duration::hours(24));
        assert!(!store.admit(&key(1)));
    }

    #[test]
    fn test_rejected_admission_does_not_refresh_timestamp() {
        let (clock, store) = setup();
        assert!(store.admit(&key(1)));
        clock.advance(Duration::hours(20));
        assert!(!store.admit(&key(1)));
        clock.advance(Duration::hours(5));
        assert!(store.admit(&key(1)));
    }

    #[test]
    fn test_keys_are_independent() {
        let (_clock, store) = setup();
        assert!(store.admit(&key(1)));
        assert!(store.admit(&key(2)));
        assert!(store.admit(&DedupKey::new("acme/api", 1, ActionClass::FixRequest)));
        assert!(store.admit(&DedupKey::new("acme/web", 1, ActionClass::Triage)));
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_repository_case_folded() {
        let (_clock, store) = setup();
        assert!(store.admit(&DedupKey::new("Acme/API", 1, ActionClass::Triage)));
        assert!(!store.admit(&key(1)));
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let (clock, store) = setup();
        store.admit(&key(1));
        clock.advance(Duration::hours(12));
        store.admit(&key(2));
        clock.advance(Duration::hours(13));

        assert_eq!(store.sweep(clock.now()), 1);
        assert_eq!(store.len(), 1);
        assert!(!store.admit(&key(2)));
        assert!(store.admit(&key(1)));
    }

    #[test]
    fn test_concurrent_admission_single_winner() {
        let (_clock, store) = setup();
        let store = Arc::new(store);
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || store.admit(&key(9)))
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|admitted| *admitted)
            .count();
        assert_eq!(winners, 1);
    }

    #[test]
    fn test_key_display() {
        assert_eq!(
            DedupKey::new("acme/api", 3, ActionClass::FixRequest).to_string(),
            "acme/api#3:fix-request"
        );
    }
}
