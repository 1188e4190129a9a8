//! Background liveness probing for proxies.
//!
//! Every `interval`, every proxy in every pool is probed concurrently
//! against a fixed test endpoint. Per-proxy state updates go through
//! `ProxyPoolManager::record_probe`, which takes the per-proxy lock, so
//! concurrent probes never race on the same proxy's health fields.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::pool::ProxyPoolManager;
use crate::types::ProxyInfo;

#[derive(Debug, Clone)]
pub struct HealthCheckConfig {
    pub interval: Duration,
    pub probe_timeout: Duration,
    /// IP-echo-style endpoint used purely to confirm the proxy forwards
    /// traffic and returns a 2xx.
    pub probe_url: String,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            probe_timeout: Duration::from_secs(10),
            probe_url: "https://httpbin.org/ip".to_string(),
        }
    }
}

pub struct HealthChecker;

impl HealthChecker {
    /// Spawn the recurring health-check loop. Runs until `shutdown` is
    /// cancelled. Returns the task handle so callers can await it during
    /// shutdown if desired (the loop exits promptly on cancellation; it
    /// never straddles a probe across the cancellation boundary longer than
    /// one in-flight probe's timeout).
    pub fn spawn(
        manager: Arc<ProxyPoolManager>,
        config: HealthCheckConfig,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(config.interval);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        debug!("health checker stopping");
                        break;
                    }
                    _ = ticker.tick() => {
                        probe_all_pools(&manager, &config).await;
                    }
                }
            }
        })
    }
}

async fn probe_all_pools(manager: &ProxyPoolManager, config: &HealthCheckConfig) {
    for (pool_name, proxies) in manager.pool_snapshot().await {
        probe_pool(manager, &pool_name, proxies, config).await;
    }
}

async fn probe_pool(
    manager: &ProxyPoolManager,
    pool_name: &str,
    proxies: Vec<ProxyInfo>,
    config: &HealthCheckConfig,
) {
    let futures = proxies.into_iter().map(|info| {
        let config = config.clone();
        async move {
            let ok = probe_one(&info, &config).await;
            (info.id, ok)
        }
    });

    let results = futures::future::join_all(futures).await;
    for (proxy_id, ok) in results {
        manager.record_probe(pool_name, &proxy_id, ok).await;
    }
}

/// Ad-hoc single-proxy probe, exposed for the control surface's
/// `POST /proxies/test`. Does not update stored health state; callers that
/// want that should go through the regular health-check loop.
pub async fn probe_proxy(info: &ProxyInfo, config: &HealthCheckConfig) -> bool {
    probe_one(info, config).await
}

async fn probe_one(info: &ProxyInfo, config: &HealthCheckConfig) -> bool {
    let client = match Client::builder()
        .proxy(reqwest::Proxy::all(info.proxy_url()).unwrap_or_else(|_| {
            // unreachable in practice: proxy_url() always produces a valid URL
            reqwest::Proxy::all("http://127.0.0.1:1").expect("fallback proxy url is valid")
        }))
        .timeout(config.probe_timeout)
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            warn!(proxy = %info.id, error = %e, "failed to build probe client");
            return false;
        }
    };

    match client.get(&config.probe_url).send().await {
        Ok(resp) if resp.status().is_success() => true,
        Ok(resp) => {
            debug!(proxy = %info.id, status = %resp.status(), "probe returned non-2xx");
            false
        }
        Err(e) => {
            debug!(proxy = %info.id, error = %e, "probe transport error");
            false
        }
    }
}
