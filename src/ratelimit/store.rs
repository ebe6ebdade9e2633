//! Shared window store and admission verdicts.

use std::time::Duration;

use dashmap::DashMap;
use serde::Serialize;
use tracing::{debug, trace};

/// A counting window for a single client key.
#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    /// Operations recorded in the current window
    count: u32,
    /// When the window expires, in epoch milliseconds
    reset_at: u64,
}

impl WindowEntry {
    fn fresh(reset_at: u64) -> Self {
        Self { count: 0, reset_at }
    }
}

/// The admit/deny decision plus quota metadata from a single check.
///
/// Callers surface this as response status and headers; the governance
/// layer itself never rejects a request on their behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Verdict {
    /// Whether the operation was admitted
    pub admitted: bool,
    /// Ceiling on admitted operations per window
    pub limit: u32,
    /// Quota left in the current window
    pub remaining: u32,
    /// When the current window expires, in epoch milliseconds
    pub reset_at: u64,
}

/// Shared table mapping client keys to counting windows.
///
/// This is the only mutable state in the crate. Both
/// [`check_and_increment`](WindowStore::check_and_increment) and
/// [`sweep`](WindowStore::sweep) go through the map's shard locks, so a
/// check never observes a torn entry and a sweep never removes an entry
/// mid-increment.
#[derive(Debug, Default)]
pub struct WindowStore {
    entries: DashMap<String, WindowEntry>,
}

impl WindowStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one operation for `key`, admitting it if the window has quota.
    ///
    /// An absent or expired entry is replaced with a fresh window before
    /// counting. The entry guard holds the shard write lock for the whole
    /// read-replace-increment step, so concurrent callers on the same key
    /// serialize here and never admit more than `max` per window.
    pub fn check_and_increment(&self, key: &str, max: u32, window: Duration, now: u64) -> Verdict {
        let window_ms = window.as_millis() as u64;

        let mut entry = self.entries.entry(key.to_string()).or_insert_with(|| {
            trace!(key = %key, "creating window entry");
            WindowEntry::fresh(now + window_ms)
        });

        if now >= entry.reset_at {
            *entry = WindowEntry::fresh(now + window_ms);
        }

        if entry.count >= max {
            debug!(key = %key, limit = max, reset_at = entry.reset_at, "over limit");
            return Verdict {
                admitted: false,
                limit: max,
                remaining: 0,
                reset_at: entry.reset_at,
            };
        }

        entry.count += 1;
        Verdict {
            admitted: true,
            limit: max,
            remaining: max - entry.count,
            reset_at: entry.reset_at,
        }
    }

    /// Remove every entry whose window expired at least `grace` ago.
    ///
    /// Returns the number of entries removed.
    pub fn sweep(&self, now: u64, grace: Duration) -> usize {
        let grace_ms = grace.as_millis() as u64;
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let live = entry.reset_at + grace_ms > now;
            if !live {
                removed += 1;
            }
            live
        });
        removed
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is tracking any keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries.
    ///
    /// This is primarily useful for testing.
    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    const WINDOW: Duration = Duration::from_millis(1_000);

    #[test]
    fn test_fresh_key_admits() {
        let store = WindowStore::new();

        let verdict = store.check_and_increment("1.2.3.4", 3, WINDOW, 0);

        assert!(verdict.admitted);
        assert_eq!(verdict.limit, 3);
        assert_eq!(verdict.remaining, 2);
        assert_eq!(verdict.reset_at, 1_000);
    }

    #[test]
    fn test_exhaustion_rejects_at_max_plus_one() {
        let store = WindowStore::new();

        for expected_remaining in (0..3).rev() {
            let verdict = store.check_and_increment("1.2.3.4", 3, WINDOW, 0);
            assert!(verdict.admitted);
            assert_eq!(verdict.remaining, expected_remaining);
        }

        // The 4th check is rejected and does not consume quota.
        let verdict = store.check_and_increment("1.2.3.4", 3, WINDOW, 10);
        assert!(!verdict.admitted);
        assert_eq!(verdict.remaining, 0);
        assert_eq!(verdict.reset_at, 1_000);
    }

    #[test]
    fn test_denied_checks_do_not_consume_quota() {
        let store = WindowStore::new();

        store.check_and_increment("key", 1, WINDOW, 0);
        for _ in 0..5 {
            assert!(!store.check_and_increment("key", 1, WINDOW, 1).admitted);
        }

        // After the window rolls over the full quota is available again.
        let verdict = store.check_and_increment("key", 1, WINDOW, 1_000);
        assert!(verdict.admitted);
        assert_eq!(verdict.reset_at, 2_000);
    }

    #[test]
    fn test_window_resets_after_expiry() {
        let store = WindowStore::new();

        assert!(store.check_and_increment("key", 1, WINDOW, 0).admitted);
        assert!(!store.check_and_increment("key", 1, WINDOW, 500).admitted);

        let verdict = store.check_and_increment("key", 1, WINDOW, 1_001);
        assert!(verdict.admitted);
        assert_eq!(verdict.remaining, 0);
        assert_eq!(verdict.reset_at, 2_001);
    }

    #[test]
    fn test_reset_boundary_is_inclusive() {
        let store = WindowStore::new();
        store.check_and_increment("key", 1, WINDOW, 0);

        // At exactly reset_at the entry is expired and replaced.
        let verdict = store.check_and_increment("key", 1, WINDOW, 1_000);
        assert!(verdict.admitted);
        assert_eq!(verdict.reset_at, 2_000);
    }

    #[test]
    fn test_fixed_window_admits_double_quota_across_boundary() {
        let store = WindowStore::new();

        // A burst right before the boundary followed by one right after
        // admits 2*max in quick succession. This is specified fixed-window
        // behavior, not a bug.
        assert!(store.check_and_increment("key", 2, WINDOW, 998).admitted);
        assert!(store.check_and_increment("key", 2, WINDOW, 999).admitted);
        assert!(store.check_and_increment("key", 2, WINDOW, 1_998).admitted);
        assert!(store.check_and_increment("key", 2, WINDOW, 1_999).admitted);
        assert!(!store.check_and_increment("key", 2, WINDOW, 2_000).admitted);
    }

    #[test]
    fn test_distinct_keys_have_independent_windows() {
        let store = WindowStore::new();

        assert!(store.check_and_increment("1.2.3.4", 1, WINDOW, 0).admitted);
        assert!(!store.check_and_increment("1.2.3.4", 1, WINDOW, 1).admitted);
        assert!(store.check_and_increment("5.6.7.8", 1, WINDOW, 1).admitted);
    }

    #[test]
    fn test_sweep_removes_only_expired_entries() {
        let store = WindowStore::new();

        store.check_and_increment("expired", 5, Duration::from_millis(100), 0);
        store.check_and_increment("live", 5, Duration::from_millis(10_000), 0);
        assert_eq!(store.len(), 2);

        let removed = store.sweep(200, Duration::ZERO);
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);

        // The live entry still carries its quota usage.
        let verdict = store.check_and_increment("live", 5, Duration::from_millis(10_000), 200);
        assert_eq!(verdict.remaining, 3);
    }

    #[test]
    fn test_sweep_honors_grace_period() {
        let store = WindowStore::new();
        store.check_and_increment("key", 5, Duration::from_millis(100), 0);

        // Expired at 100, but still within the 500ms grace.
        assert_eq!(store.sweep(300, Duration::from_millis(500)), 0);
        assert_eq!(store.len(), 1);

        assert_eq!(store.sweep(601, Duration::from_millis(500)), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_concurrent_checks_never_exceed_limit() {
        let store = Arc::new(WindowStore::new());
        let admitted = Arc::new(AtomicU32::new(0));
        let max = 40;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let admitted = Arc::clone(&admitted);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        let verdict =
                            store.check_and_increment("shared", max, Duration::from_secs(60), 0);
                        if verdict.admitted {
                            admitted.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        // 200 concurrent checks against the same key, exactly `max` admitted.
        assert_eq!(admitted.load(Ordering::SeqCst), max);
    }

    #[test]
    fn test_verdict_serializes_quota_metadata() {
        let verdict = Verdict {
            admitted: false,
            limit: 5,
            remaining: 0,
            reset_at: 1_700_000_000_000,
        };

        let json = serde_json::to_value(verdict).unwrap();
        assert_eq!(json["admitted"], false);
        assert_eq!(json["limit"], 5);
        assert_eq!(json["remaining"], 0);
        assert_eq!(json["reset_at"], 1_700_000_000_000u64);
    }
}
