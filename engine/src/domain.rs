//! Per-domain admission gate.
//!
//! One `RwLock<HashMap<..>>` guarding lazily-created per-domain records,
//! in the same shape as the teacher's `DistributedRateLimiter` — a single
//! lock, entries created on first use, never removed for the run's
//! lifetime.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use scour_core::domain::extract_domain;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct DomainState {
    last_request: Option<DateTime<Utc>>,
    request_count: u64,
    blocked: bool,
    preferred_pool: Option<String>,
}

impl Default for DomainState {
    fn default() -> Self {
        Self {
            last_request: None,
            request_count: 0,
            blocked: false,
            preferred_pool: None,
        }
    }
}

/// Gates scheduling decisions on per-domain pacing and block state.
///
/// Entries are created lazily by `observe`/`can_schedule` and never removed
/// during a run — a blocked domain stays blocked for the process lifetime
/// unless an operator action clears it (not exposed here).
pub struct DomainTable {
    rate_limit: Duration,
    domains: RwLock<HashMap<String, DomainState>>,
}

impl DomainTable {
    pub fn new(rate_limit: Duration) -> Arc<Self> {
        Arc::new(Self {
            rate_limit,
            domains: RwLock::new(HashMap::new()),
        })
    }

    /// `true` if `url`'s domain has no entry, or has one that is neither
    /// blocked nor within `rate_limit` of its last request.
    pub async fn can_schedule(&self, url: &str) -> bool {
        let domain = match extract_domain(url) {
            Ok(d) => d,
            Err(_) => return false,
        };

        let domains = self.domains.read().await;
        match domains.get(&domain) {
            None => true,
            Some(state) => {
                if state.blocked {
                    return false;
                }
                match state.last_request {
                    None => true,
                    Some(last) => Utc::now().signed_duration_since(last)
                        >= chrono::Duration::from_std(self.rate_limit).unwrap_or_default(),
                }
            }
        }
    }

    /// Record a request against `url`'s domain, creating the entry if absent.
    pub async fn observe(&self, url: &str) {
        let Ok(domain) = extract_domain(url) else { return };

        let mut domains = self.domains.write().await;
        let state = domains.entry(domain).or_default();
        state.last_request = Some(Utc::now());
        state.request_count += 1;
    }

    pub async fn block(&self, url: &str) {
        let Ok(domain) = extract_domain(url) else { return };
        let mut domains = self.domains.write().await;
        domains.entry(domain).or_default().blocked = true;
    }

    pub async fn set_preferred_pool(&self, url: &str, pool: impl Into<String>) {
        let Ok(domain) = extract_domain(url) else { return };
        let mut domains = self.domains.write().await;
        domains.entry(domain).or_default().preferred_pool = Some(pool.into());
    }

    pub async fn preferred_pool(&self, url: &str) -> Option<String> {
        let domain = extract_domain(url).ok()?;
        let domains = self.domains.read().await;
        domains.get(&domain).and_then(|s| s.preferred_pool.clone())
    }

    pub async fn request_count(&self, url: &str) -> u64 {
        let Ok(domain) = extract_domain(url) else { return 0 };
        let domains = self.domains.read().await;
        domains.get(&domain).map(|s| s.request_count).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unseen_domain_is_schedulable() {
        let table = DomainTable::new(Duration::from_millis(500));
        assert!(table.can_schedule("https://a.example/1").await);
    }

    #[tokio::test]
    async fn rate_limit_blocks_immediate_reschedule() {
        let table = DomainTable::new(Duration::from_secs(60));
        table.observe("https://a.example/1").await;
        assert!(!table.can_schedule("https://a.example/2").await);
    }

    #[tokio::test]
    async fn different_domains_do_not_interfere() {
        let table = DomainTable::new(Duration::from_secs(60));
        table.observe("https://a.example/1").await;
        assert!(table.can_schedule("https://b.example/1").await);
    }

    #[tokio::test]
    async fn blocked_domain_never_schedules() {
        let table = DomainTable::new(Duration::from_millis(1));
        table.block("https://a.example/1").await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(!table.can_schedule("https://a.example/1").await);
    }

    #[tokio::test]
    async fn request_count_accumulates() {
        let table = DomainTable::new(Duration::from_millis(0));
        table.observe("https://a.example/1").await;
        table.observe("https://a.example/2").await;
        assert_eq!(table.request_count("https://a.example/3").await, 2);
    }
}
