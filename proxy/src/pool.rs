//! Named pools of upstream proxies with round-robin, lock-disciplined selection.
//!
//! Locking order is always pool -> proxy, never the reverse, matching the
//! shared-resource policy: a pool-level lock guards the rotation cursor, a
//! per-proxy lock guards that proxy's mutable health fields.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::ProxyError;
use crate::types::{PoolStats, ProxyHandle, ProxyHealth, ProxyInfo, ProxyStats, ProxyView};

/// One proxy's immutable identity plus its per-proxy-locked health state.
struct ProxySlot {
    info: ProxyInfo,
    health: RwLock<ProxyHealth>,
}

/// An ordered, named collection of proxies plus a rotation cursor.
pub struct Pool {
    name: String,
    proxies: Vec<Arc<ProxySlot>>,
    cursor: RwLock<usize>,
}

impl Pool {
    pub fn new(name: impl Into<String>, proxies: Vec<ProxyInfo>) -> Self {
        Self {
            name: name.into(),
            proxies: proxies
                .into_iter()
                .map(|info| {
                    Arc::new(ProxySlot {
                        info,
                        health: RwLock::new(ProxyHealth::default()),
                    })
                })
                .collect(),
            cursor: RwLock::new(0),
        }
    }

    /// Round-robin scan starting at the cursor, returning the first usable
    /// proxy. Advances the cursor past the returned element on success; on
    /// total failure the cursor is left exactly where it started (never
    /// "double advanced" past the starting point).
    async fn next_usable(&self) -> Result<ProxyHandle, ProxyError> {
        if self.proxies.is_empty() {
            return Err(ProxyError::NoHealthyProxy(self.name.clone()));
        }

        let mut cursor = self.cursor.write().await;
        let len = self.proxies.len();
        let start = *cursor;

        for step in 0..len {
            let idx = (start + step) % len;
            let slot = &self.proxies[idx];
            let mut health = slot.health.write().await;
            if health.is_usable() {
                health.record_use();
                *cursor = (idx + 1) % len;
                debug!(pool = %self.name, proxy = %slot.info.id, "selected proxy");
                return Ok(ProxyHandle {
                    pool_name: self.name.clone(),
                    info: slot.info.clone(),
                });
            }
        }

        warn!(pool = %self.name, "no usable proxy after full rotation");
        Err(ProxyError::NoHealthyProxy(self.name.clone()))
    }

    pub fn add_proxy(&mut self, info: ProxyInfo) {
        self.proxies.push(Arc::new(ProxySlot {
            info,
            health: RwLock::new(ProxyHealth::default()),
        }));
    }

    async fn stats(&self) -> PoolStats {
        let mut healthy = 0usize;
        for slot in &self.proxies {
            if slot.health.read().await.is_usable() {
                healthy += 1;
            }
        }
        PoolStats {
            name: self.name.clone(),
            total: self.proxies.len(),
            healthy,
            proxy_type: self.proxies.first().map(|s| s.info.proxy_type),
        }
    }

    async fn views(&self) -> Vec<ProxyView> {
        let mut out = Vec::with_capacity(self.proxies.len());
        for slot in &self.proxies {
            let health = slot.health.read().await;
            out.push(ProxyView {
                info: slot.info.clone(),
                healthy: health.healthy,
                fail_count: health.fail_count,
                last_used: health.last_used,
            });
        }
        out
    }

    pub(crate) async fn record_probe(&self, proxy_id: &str, success: bool) {
        for slot in &self.proxies {
            if slot.info.id == proxy_id {
                let mut health = slot.health.write().await;
                if success {
                    health.record_probe_success();
                } else {
                    health.record_probe_failure();
                }
                return;
            }
        }
    }

    pub(crate) fn proxy_infos(&self) -> Vec<ProxyInfo> {
        self.proxies.iter().map(|s| s.info.clone()).collect()
    }
}

/// Owns the named pool -> Pool mapping. The sole entry point workers use to
/// obtain a proxy for a fetch, and the sole mutator of health state (via the
/// health checker).
pub struct ProxyPoolManager {
    enabled: bool,
    default_pool: String,
    pools: RwLock<HashMap<String, Pool>>,
}

impl ProxyPoolManager {
    pub fn new(enabled: bool, default_pool: impl Into<String>) -> Self {
        Self {
            enabled,
            default_pool: default_pool.into(),
            pools: RwLock::new(HashMap::new()),
        }
    }

    pub async fn add_pool(&self, pool: Pool) {
        self.pools.write().await.insert(pool.name.clone(), pool);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Hand out a proxy from `pool_name` (falling back to the manager's
    /// default pool when `pool_name` is `None`). Returns `Ok(None)` when the
    /// proxy subsystem is disabled — callers should fall back to a direct
    /// connection in that case. Returns `Err(NoHealthyProxy)` when enabled
    /// but no proxy in the pool is currently usable.
    pub async fn get_proxy(&self, pool_name: Option<&str>) -> Result<Option<ProxyHandle>, ProxyError> {
        if !self.enabled {
            return Ok(None);
        }

        let name = pool_name.unwrap_or(&self.default_pool);
        let pools = self.pools.read().await;
        let pool = pools
            .get(name)
            .ok_or_else(|| ProxyError::PoolNotFound(name.to_string()))?;
        pool.next_usable().await.map(Some)
    }

    pub async fn get_stats(&self) -> ProxyStats {
        let pools = self.pools.read().await;
        let mut out = Vec::with_capacity(pools.len());
        for pool in pools.values() {
            out.push(pool.stats().await);
        }
        ProxyStats { pools: out }
    }

    pub async fn pool_views(&self, pool_name: &str) -> Result<Vec<ProxyView>, ProxyError> {
        let pools = self.pools.read().await;
        let pool = pools
            .get(pool_name)
            .ok_or_else(|| ProxyError::PoolNotFound(pool_name.to_string()))?;
        Ok(pool.views().await)
    }

    /// Snapshot of `(pool name, proxy identities)` for every pool, used by
    /// the health checker to fan out probes without holding the pools lock
    /// across network I/O.
    pub(crate) async fn pool_snapshot(&self) -> Vec<(String, Vec<ProxyInfo>)> {
        let pools = self.pools.read().await;
        pools.values().map(|p| (p.name.clone(), p.proxy_infos())).collect()
    }

    pub(crate) async fn record_probe(&self, pool_name: &str, proxy_id: &str, success: bool) {
        let pools = self.pools.read().await;
        if let Some(pool) = pools.get(pool_name) {
            pool.record_probe(proxy_id, success).await;
        }
    }
}
