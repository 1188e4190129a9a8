//! Builds the concrete collaborators (store, cache, proxy pools, profile
//! factory) and the `Engine` from an `AppConfig`. Separated from the
//! binaries so `scour-server` and `scour-seed` share it.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use scour_engine::{Engine, EngineConfig};
use scour_profile::ProfileFactory;
use scour_proxy::{HealthCheckConfig, Pool, ProxyInfo, ProxyPoolManager, ProxyType};
use scour_store::{CrawlStore, RedisResultCache, ResultCache, SqliteStore};

use crate::config::AppConfig;

pub struct Runtime {
    pub store: Arc<dyn CrawlStore>,
    pub cache: Arc<dyn ResultCache>,
    pub proxies: Arc<ProxyPoolManager>,
    pub engine: Arc<Engine>,
}

fn parse_proxy_type(raw: &str) -> ProxyType {
    match raw {
        "residential" => ProxyType::Residential,
        "mobile" => ProxyType::Mobile,
        _ => ProxyType::Datacenter,
    }
}

fn parse_endpoint(endpoint: &str, proxy_type: ProxyType, provider: &str) -> Option<ProxyInfo> {
    let (host, port) = endpoint.rsplit_once(':')?;
    let port: u16 = port.parse().ok()?;
    Some(ProxyInfo::new(host, port, proxy_type, "unknown", provider))
}

async fn build_proxy_manager(config: &AppConfig) -> Arc<ProxyPoolManager> {
    let default_pool = config
        .proxy
        .pools
        .first()
        .map(|p| p.name.clone())
        .unwrap_or_else(|| "default".to_string());

    let manager = Arc::new(ProxyPoolManager::new(config.proxy.enabled, default_pool));

    for pool_cfg in &config.proxy.pools {
        let proxy_type = parse_proxy_type(&pool_cfg.pool_type);
        let provider = pool_cfg.providers.first().cloned().unwrap_or_else(|| "unknown".to_string());
        let proxies: Vec<ProxyInfo> = pool_cfg
            .endpoints
            .iter()
            .filter_map(|e| parse_endpoint(e, proxy_type, &provider))
            .collect();
        manager.add_pool(Pool::new(pool_cfg.name.clone(), proxies)).await;
    }

    manager
}

pub async fn build_runtime(config: &AppConfig) -> Result<Runtime> {
    let store: Arc<dyn CrawlStore> = Arc::new(
        SqliteStore::connect(&config.store.database_path)
            .await
            .context("failed to open crawl store")?,
    );
    let cache: Arc<dyn ResultCache> = Arc::new(
        RedisResultCache::connect(&config.store.redis_url).context("failed to open result cache")?,
    );

    let proxies = build_proxy_manager(config).await;

    let profiles = Arc::new(ProfileFactory::new(
        config.stealth.enabled,
        &config.crawler.user_agent,
        config.stealth.fingerprint_seed,
    ));

    let engine_config = EngineConfig {
        max_workers: config.crawler.max_workers,
        queue_size: config.crawler.queue_size,
        rate_limit: Duration::from_millis(config.crawler.rate_limit_ms),
        health_check: HealthCheckConfig {
            interval: Duration::from_secs(config.proxy.health_check_interval_secs),
            ..HealthCheckConfig::default()
        },
        cache_ttl_secs: config.store.cache_ttl_secs,
        ..EngineConfig::default()
    };

    let engine = Arc::new(Engine::new(store.clone(), cache.clone(), proxies.clone(), profiles, engine_config));

    Ok(Runtime { store, cache, proxies, engine })
}
