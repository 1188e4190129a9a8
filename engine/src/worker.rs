//! Worker pool: consumes tasks, acquires a proxy and profile, performs the
//! fetch, and emits a result. Workers never share per-task state; the only
//! shared state they touch lives behind the proxy pool's own locks and the
//! stats counters.

use std::sync::Arc;

use chrono::Utc;
use scour_core::{CrawlData, CrawlResult, CrawlTask};
use scour_profile::ProfileFactory;
use scour_proxy::ProxyPoolManager;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::client::{fetch_once, FetchError};
use crate::stats::Stats;

pub struct WorkerContext {
    pub proxies: Arc<ProxyPoolManager>,
    pub profiles: Arc<ProfileFactory>,
    pub stats: Arc<Stats>,
}

/// Spawns `count` worker tasks, each pulling from `task_rx` and publishing
/// to `result_tx`, until `shutdown` fires or the task channel closes.
/// `task_rx` is wrapped so all workers compete for the same receiver.
pub fn spawn_pool(
    count: usize,
    task_rx: mpsc::Receiver<CrawlTask>,
    result_tx: mpsc::Sender<CrawlResult>,
    ctx: Arc<WorkerContext>,
    shutdown: CancellationToken,
) -> Vec<tokio::task::JoinHandle<()>> {
    let task_rx = Arc::new(tokio::sync::Mutex::new(task_rx));
    (0..count)
        .map(|id| {
            let task_rx = task_rx.clone();
            let result_tx = result_tx.clone();
            let ctx = ctx.clone();
            let shutdown = shutdown.clone();
            tokio::spawn(async move { run_worker(format!("worker-{id}"), task_rx, result_tx, ctx, shutdown).await })
        })
        .collect()
}

async fn run_worker(
    worker_id: String,
    task_rx: Arc<tokio::sync::Mutex<mpsc::Receiver<CrawlTask>>>,
    result_tx: mpsc::Sender<CrawlResult>,
    ctx: Arc<WorkerContext>,
    shutdown: CancellationToken,
) {
    loop {
        let task = {
            let mut rx = task_rx.lock().await;
            tokio::select! {
                _ = shutdown.cancelled() => return,
                task = rx.recv() => task,
            }
        };

        let Some(task) = task else {
            debug!(worker_id, "task channel closed, worker exiting");
            return;
        };

        let result = execute_task(&worker_id, &task, &ctx).await;
        if result_tx.send(result).await.is_err() {
            warn!(worker_id, "result channel closed, worker exiting");
            return;
        }
    }
}

async fn execute_task(worker_id: &str, task: &CrawlTask, ctx: &WorkerContext) -> CrawlResult {
    let start = Utc::now();
    ctx.stats.record_request();

    let proxy = match ctx.proxies.get_proxy(None).await {
        Ok(handle) => handle,
        Err(e) => {
            ctx.stats.record_proxy_error();
            return CrawlResult::failure(task, worker_id, format!("proxy error: {e}"), start);
        }
    };

    let profile = match ctx.profiles.generate_profile(&task.url) {
        Ok(profile) => profile,
        Err(e) => {
            ctx.stats.record_profile_error();
            return CrawlResult::failure(task, worker_id, format!("profile error: {e}"), start);
        }
    };

    match fetch_once(&task.url, proxy.as_ref(), &profile).await {
        Ok(fetched) => {
            ctx.stats.record_success();
            let data = CrawlData {
                url: task.url.clone(),
                status_code: fetched.status_code,
                headers: fetched.headers,
                body: fetched.body,
                truncated: fetched.truncated,
                captured_bytes: fetched.captured_bytes,
                timestamp: Utc::now(),
                links: Vec::new(),
                images: Vec::new(),
                metadata: Default::default(),
            };
            CrawlResult::success(task, worker_id, data, start)
        }
        Err(e) => {
            ctx.stats.record_failure();
            let message = match e {
                FetchError::ClientBuild(err) => format!("client build error: {err}"),
                FetchError::Request(err) => format!("request error: {err}"),
            };
            CrawlResult::failure(task, worker_id, message, start)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scour_core::CrawlTask;
    use uuid::Uuid;

    fn ctx() -> WorkerContext {
        WorkerContext {
            proxies: Arc::new(ProxyPoolManager::new(true, "default")),
            profiles: Arc::new(ProfileFactory::default_disabled()),
            stats: Arc::new(Stats::default()),
        }
    }

    #[tokio::test]
    async fn proxy_acquisition_failure_short_circuits_before_fetch_and_is_counted() {
        let ctx = ctx();
        let task = CrawlTask::new(Uuid::new_v4(), "https://example.com");

        let result = execute_task("worker-0", &task, &ctx).await;

        assert!(!result.success);
        assert!(result.error.as_deref().unwrap_or_default().contains("proxy error"));
        let snap = ctx.stats.snapshot();
        assert_eq!(snap.proxy_errors, 1);
        assert_eq!(snap.profile_errors, 0);
    }

    #[tokio::test]
    async fn profile_acquisition_failure_short_circuits_before_fetch_and_is_counted() {
        let ctx = WorkerContext {
            proxies: Arc::new(ProxyPoolManager::new(false, "default")),
            profiles: Arc::new(ProfileFactory::default_disabled()),
            stats: Arc::new(Stats::default()),
        };
        let task = CrawlTask::new(Uuid::new_v4(), "http://169.254.169.254/latest/meta-data/");

        let result = execute_task("worker-0", &task, &ctx).await;

        assert!(!result.success);
        assert!(result.error.as_deref().unwrap_or_default().contains("profile error"));
        let snap = ctx.stats.snapshot();
        assert_eq!(snap.profile_errors, 1);
        assert_eq!(snap.proxy_errors, 0);
    }
}
