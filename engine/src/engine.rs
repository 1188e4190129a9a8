//! Wires scheduler, workers, sink and health-checker into one lifecycle.
//!
//! Startup order: sink, then scheduler, then workers (each depends on the
//! the next stage downstream already being able to receive). Shutdown
//! order is the reverse: workers first so no new results are produced,
//! then the scheduler, then the sink drains whatever is left in flight.

use std::sync::Arc;
use std::time::Duration;

use scour_core::CrawlTask;
use scour_profile::ProfileFactory;
use scour_proxy::{HealthCheckConfig, HealthChecker, ProxyPoolManager, ProxyStats};
use scour_store::{CrawlStore, ResultCache};
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::domain::DomainTable;
use crate::error::EngineError;
use crate::scheduler::{self, SchedulerConfig};
use crate::sink::{self, SinkConfig};
use crate::stats::{Stats, StatsSnapshot};
use crate::worker::{self, WorkerContext};

pub struct EngineConfig {
    pub max_workers: usize,
    pub queue_size: usize,
    pub rate_limit: Duration,
    pub scheduler: SchedulerConfig,
    pub health_check: HealthCheckConfig,
    pub cache_ttl_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_workers: 1000,
            queue_size: 10_000,
            rate_limit: Duration::from_millis(0),
            scheduler: SchedulerConfig::default(),
            health_check: HealthCheckConfig::default(),
            cache_ttl_secs: 3600,
        }
    }
}

struct RunningHandles {
    workers: Vec<tokio::task::JoinHandle<()>>,
    scheduler: tokio::task::JoinHandle<()>,
    sink: tokio::task::JoinHandle<()>,
    health_checker: tokio::task::JoinHandle<()>,
    shutdown: CancellationToken,
}

pub struct Engine {
    store: Arc<dyn CrawlStore>,
    cache: Arc<dyn ResultCache>,
    proxies: Arc<ProxyPoolManager>,
    profiles: Arc<ProfileFactory>,
    domains: Arc<DomainTable>,
    stats: Arc<Stats>,
    config: EngineConfig,
    running: Mutex<Option<RunningHandles>>,
}

impl Engine {
    pub fn new(
        store: Arc<dyn CrawlStore>,
        cache: Arc<dyn ResultCache>,
        proxies: Arc<ProxyPoolManager>,
        profiles: Arc<ProfileFactory>,
        config: EngineConfig,
    ) -> Self {
        let domains = DomainTable::new(config.rate_limit);
        Self {
            store,
            cache,
            proxies,
            profiles,
            domains,
            stats: Arc::new(Stats::default()),
            config,
            running: Mutex::new(None),
        }
    }

    pub async fn start(&self) -> Result<(), EngineError> {
        let mut running = self.running.lock().await;
        if running.is_some() {
            return Err(EngineError::AlreadyRunning);
        }

        let shutdown = CancellationToken::new();
        let (task_tx, task_rx) = mpsc::channel::<CrawlTask>(self.config.queue_size);
        let (result_tx, result_rx) = mpsc::channel(self.config.queue_size);

        let sink = tokio::spawn(sink::run(
            result_rx,
            self.store.clone(),
            self.cache.clone(),
            SinkConfig { cache_ttl_secs: self.config.cache_ttl_secs },
        ));

        let scheduler = tokio::spawn(scheduler::run(
            self.store.clone(),
            self.domains.clone(),
            task_tx,
            self.stats.clone(),
            SchedulerConfig {
                tick_interval: self.config.scheduler.tick_interval,
                batch_size: self.config.scheduler.batch_size,
            },
            shutdown.clone(),
        ));

        let worker_ctx = Arc::new(WorkerContext {
            proxies: self.proxies.clone(),
            profiles: self.profiles.clone(),
            stats: self.stats.clone(),
        });
        let workers = worker::spawn_pool(
            self.config.max_workers,
            task_rx,
            result_tx,
            worker_ctx,
            shutdown.clone(),
        );
        self.stats.set_active_workers(workers.len() as i64);

        let health_checker = HealthChecker::spawn(self.proxies.clone(), self.config.health_check.clone(), shutdown.clone());

        *running = Some(RunningHandles { workers, scheduler, sink, health_checker, shutdown });
        info!(workers = self.config.max_workers, "engine started");
        Ok(())
    }

    /// Cancels workers first, then the scheduler, then waits (up to 10s)
    /// for the sink to drain whatever results are already in the channel.
    pub async fn shutdown(&self) -> Result<(), EngineError> {
        let mut running = self.running.lock().await;
        let Some(handles) = running.take() else {
            return Err(EngineError::NotRunning);
        };

        handles.shutdown.cancel();

        for worker in handles.workers {
            let _ = worker.await;
        }
        let _ = handles.scheduler.await;
        let _ = handles.health_checker.await;

        let drain = tokio::time::timeout(Duration::from_secs(10), handles.sink).await;
        if drain.is_err() {
            tracing::warn!("result sink did not drain within 10s deadline");
        }

        self.stats.set_active_workers(0);
        info!("engine stopped");
        Ok(())
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub async fn proxy_stats(&self) -> ProxyStats {
        self.proxies.get_stats().await
    }

    pub fn store(&self) -> &Arc<dyn CrawlStore> {
        &self.store
    }
}
