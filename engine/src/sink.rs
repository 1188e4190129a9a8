//! Drains the result channel: persists each result and its terminal task
//! status, then logs. Runs until the channel closes.

use std::sync::Arc;

use scour_core::CrawlResult;
use scour_store::{CrawlStore, ResultCache};
use tokio::sync::mpsc;
use tracing::{debug, warn};

pub struct SinkConfig {
    pub cache_ttl_secs: u64,
}

pub async fn run(
    mut result_rx: mpsc::Receiver<CrawlResult>,
    store: Arc<dyn CrawlStore>,
    cache: Arc<dyn ResultCache>,
    config: SinkConfig,
) {
    while let Some(result) = result_rx.recv().await {
        if let Err(e) = store.store_crawl_result(&result).await {
            warn!(task_id = %result.task_id, error = %e, "failed to persist result");
        }

        if let Err(e) = cache.set_result(&result, config.cache_ttl_secs).await {
            warn!(task_id = %result.task_id, error = %e, "failed to cache result");
        }

        if result.success {
            debug!(task_id = %result.task_id, url = %result.url, "task succeeded");
        } else {
            warn!(task_id = %result.task_id, url = %result.url, error = ?result.error, "task failed");
        }
    }
    debug!("result sink exiting: channel closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use scour_core::{CrawlData, CrawlSession, CrawlTask, SessionStats, TaskStatus};
    use scour_store::StoreError;
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Default)]
    struct RecordingStore {
        stored: Mutex<Vec<Uuid>>,
    }

    #[async_trait]
    impl CrawlStore for RecordingStore {
        async fn create_crawl_session(&self, _session: &CrawlSession) -> Result<(), StoreError> {
            unimplemented!("not exercised by this test")
        }

        async fn create_tasks(&self, _tasks: &[CrawlTask]) -> Result<(), StoreError> {
            unimplemented!("not exercised by this test")
        }

        async fn get_crawl_sessions(&self) -> Result<Vec<CrawlSession>, StoreError> {
            unimplemented!("not exercised by this test")
        }

        async fn get_crawl_session(&self, _id: Uuid) -> Result<Option<CrawlSession>, StoreError> {
            unimplemented!("not exercised by this test")
        }

        async fn update_session_stats(&self, _id: Uuid, _stats: &SessionStats) -> Result<(), StoreError> {
            unimplemented!("not exercised by this test")
        }

        async fn get_pending_tasks(&self, _limit: u32) -> Result<Vec<CrawlTask>, StoreError> {
            unimplemented!("not exercised by this test")
        }

        async fn mark_task_in_flight(&self, _task_id: Uuid) -> Result<(), StoreError> {
            unimplemented!("not exercised by this test")
        }

        async fn mark_task_terminal(&self, _task_id: Uuid, _status: TaskStatus) -> Result<(), StoreError> {
            unimplemented!("not exercised by this test")
        }

        async fn store_crawl_result(&self, result: &CrawlResult) -> Result<(), StoreError> {
            self.stored.lock().unwrap().push(result.task_id);
            Ok(())
        }

        async fn get_crawl_results(&self, _session_id: Uuid, _limit: u32) -> Result<Vec<CrawlResult>, StoreError> {
            unimplemented!("not exercised by this test")
        }

        async fn close(&self) -> Result<(), StoreError> {
            unimplemented!("not exercised by this test")
        }
    }

    #[derive(Default)]
    struct RecordingCache {
        cached: Mutex<Vec<(Uuid, u64)>>,
    }

    #[async_trait]
    impl ResultCache for RecordingCache {
        async fn set_result(&self, result: &CrawlResult, ttl_secs: u64) -> Result<(), StoreError> {
            self.cached.lock().unwrap().push((result.task_id, ttl_secs));
            Ok(())
        }

        async fn get_result(&self, _task_id: Uuid) -> Result<Option<CrawlResult>, StoreError> {
            unimplemented!("not exercised by this test")
        }
    }

    #[tokio::test]
    async fn drains_and_persists_every_result_then_exits_on_close() {
        let store = Arc::new(RecordingStore::default());
        let cache = Arc::new(RecordingCache::default());
        let (result_tx, result_rx) = mpsc::channel(4);

        let task_a = CrawlTask::new(Uuid::new_v4(), "https://a.example");
        let task_b = CrawlTask::new(Uuid::new_v4(), "https://b.example");
        let ok = CrawlResult::success(
            &task_a,
            "worker-0",
            CrawlData {
                url: task_a.url.clone(),
                status_code: 200,
                headers: Default::default(),
                body: vec![1, 2, 3],
                truncated: false,
                captured_bytes: 3,
                timestamp: chrono::Utc::now(),
                links: vec![],
                images: vec![],
                metadata: Default::default(),
            },
            chrono::Utc::now(),
        );
        let failed = CrawlResult::failure(&task_b, "worker-0", "request error", chrono::Utc::now());

        result_tx.send(ok.clone()).await.unwrap();
        result_tx.send(failed.clone()).await.unwrap();
        drop(result_tx);

        let sink_store: Arc<dyn CrawlStore> = store.clone();
        let sink_cache: Arc<dyn ResultCache> = cache.clone();
        run(result_rx, sink_store, sink_cache, SinkConfig { cache_ttl_secs: 60 }).await;

        let stored = store.stored.lock().unwrap();
        assert_eq!(stored.as_slice(), &[ok.task_id, failed.task_id]);

        let cached = cache.cached.lock().unwrap();
        assert_eq!(cached.as_slice(), &[(ok.task_id, 60), (failed.task_id, 60)]);
    }
}
