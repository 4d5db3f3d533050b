//! Course info cache and the breaker that guards catalog fetches.

use super::types::CourseInfo;
use crate::requirements::CourseCode;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::warn;

#[derive(Clone)]
struct Entry {
    info: CourseInfo,
    stored_at: Instant,
    ttl: Duration,
}

impl Entry {
    fn is_fresh(&self) -> bool {
        self.stored_at.elapsed() < self.ttl
    }
}

/// Concurrent TTL map from canonical course code to its last lookup.
///
/// Each entry carries its own TTL so placeholders can expire sooner than
/// real records.
pub struct CourseInfoCache {
    entries: DashMap<CourseCode, Entry>,
    default_ttl: Duration,
}

impl CourseInfoCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            default_ttl,
        }
    }

    /// Fresh record for `code`. A stale one is evicted on the way out.
    pub fn get(&self, code: &CourseCode) -> Option<CourseInfo> {
        if let Some(entry) = self.entries.get(code) {
            if entry.is_fresh() {
                return Some(entry.info.clone());
            }
        }
        self.entries.remove_if(code, |_, entry| !entry.is_fresh());
        None
    }

    pub fn insert(&self, code: CourseCode, info: CourseInfo) {
        self.insert_with_ttl(code, info, self.default_ttl);
    }

    pub fn insert_with_ttl(&self, code: CourseCode, info: CourseInfo, ttl: Duration) {
        let entry = Entry {
            info,
            stored_at: Instant::now(),
            ttl,
        };
        self.entries.insert(code, entry);
    }

    pub fn invalidate(&self, code: &CourseCode) {
        self.entries.remove(code);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Entry count, stale entries included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cleanup_expired(&self) {
        self.entries.retain(|_, entry| entry.is_fresh());
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats::default();
        for entry in self.entries.iter() {
            stats.total_entries += 1;
            if !entry.is_fresh() {
                stats.expired_entries += 1;
            } else if entry.info.is_placeholder() {
                stats.placeholder_entries += 1;
            }
        }
        stats.active_entries = stats.total_entries - stats.expired_entries;
        stats
    }
}

impl Default for CourseInfoCache {
    /// One hour TTL.
    fn default() -> Self {
        Self::new(Duration::from_secs(60 * 60))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub active_entries: usize,
    /// Fresh entries holding a placeholder record
    pub placeholder_entries: usize,
}

#[derive(Debug, Default)]
struct BreakerState {
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

/// Stops catalog fetches after `threshold` consecutive retryable failures.
///
/// Once `recovery_time` has passed since it opened, the breaker closes again
/// and the next lookup goes to the network.
pub struct CircuitBreaker {
    state: Mutex<BreakerState>,
    threshold: u32,
    recovery_time: Duration,
}

impl CircuitBreaker {
    pub fn new(threshold: u32, recovery_time: Duration) -> Self {
        Self {
            state: Mutex::new(BreakerState::default()),
            threshold,
            recovery_time,
        }
    }

    pub fn is_open(&self) -> bool {
        let Ok(mut state) = self.state.lock() else {
            return false;
        };

        match state.opened_at {
            Some(opened) if opened.elapsed() > self.recovery_time => {
                *state = BreakerState::default();
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    pub fn record_success(&self) {
        if let Ok(mut state) = self.state.lock() {
            *state = BreakerState::default();
        }
    }

    pub fn record_failure(&self) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };

        state.consecutive_failures += 1;
        if state.consecutive_failures >= self.threshold && state.opened_at.is_none() {
            warn!(
                failures = state.consecutive_failures,
                recovery_secs = self.recovery_time.as_secs(),
                "Catalog circuit breaker opened"
            );
            state.opened_at = Some(Instant::now());
        }
    }

    pub fn failure_count(&self) -> u32 {
        self.state
            .lock()
            .map(|state| state.consecutive_failures)
            .unwrap_or(0)
    }
}

impl Default for CircuitBreaker {
    /// Five failures, 30 second recovery.
    fn default() -> Self {
        Self::new(5, Duration::from_secs(30))
    }
}
