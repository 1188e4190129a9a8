//! Process-wide counters. Plain atomics, never held across I/O — the same
//! policy the teacher applies to its anti-bot stats structs.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use serde::Serialize;

#[derive(Default)]
pub struct Stats {
    total_requests: AtomicU64,
    successes: AtomicU64,
    failures: AtomicU64,
    proxy_errors: AtomicU64,
    profile_errors: AtomicU64,
    detection_events: AtomicU64,
    active_workers: AtomicI64,
    queue_size: AtomicI64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub total_requests: u64,
    pub successes: u64,
    pub failures: u64,
    pub proxy_errors: u64,
    pub profile_errors: u64,
    pub detection_events: u64,
    pub active_workers: i64,
    pub queue_size: i64,
}

impl Stats {
    pub fn record_request(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_success(&self) {
        self.successes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_proxy_error(&self) {
        self.proxy_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_profile_error(&self) {
        self.profile_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_active_workers(&self, n: i64) {
        self.active_workers.store(n, Ordering::Relaxed);
    }

    pub fn set_queue_size(&self, n: i64) {
        self.queue_size.store(n, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successes: self.successes.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            proxy_errors: self.proxy_errors.load(Ordering::Relaxed),
            profile_errors: self.profile_errors.load(Ordering::Relaxed),
            detection_events: self.detection_events.load(Ordering::Relaxed),
            active_workers: self.active_workers.load(Ordering::Relaxed),
            queue_size: self.queue_size.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_equal_sum_of_outcomes_at_quiescence() {
        let stats = Stats::default();
        stats.record_request();
        stats.record_success();
        stats.record_request();
        stats.record_failure();
        stats.record_request();
        stats.record_proxy_error();

        let snap = stats.snapshot();
        assert_eq!(snap.total_requests, 3);
        assert_eq!(snap.successes + snap.failures + snap.proxy_errors + snap.profile_errors, 3);
    }
}
