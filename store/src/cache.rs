//! Redis-backed hot-result cache: `result:<task_id>` holding the
//! JSON-serialized `CrawlResult`, expiring after a configurable TTL
//! (default one hour, per the spec's external-interfaces section).

use async_trait::async_trait;
use redis::AsyncCommands;
use scour_core::CrawlResult;
use uuid::Uuid;

use crate::error::StoreError;
use crate::traits::ResultCache;

pub struct RedisResultCache {
    client: redis::Client,
}

impl RedisResultCache {
    pub fn connect(redis_url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self { client })
    }

    fn key(task_id: Uuid) -> String {
        format!("result:{task_id}")
    }
}

#[async_trait]
impl ResultCache for RedisResultCache {
    async fn set_result(&self, result: &CrawlResult, ttl_secs: u64) -> Result<(), StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload = serde_json::to_string(result)?;
        conn.set_ex::<_, _, ()>(Self::key(result.task_id), payload, ttl_secs).await?;
        Ok(())
    }

    async fn get_result(&self, task_id: Uuid) -> Result<Option<CrawlResult>, StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let raw: Option<String> = conn.get(Self::key(task_id)).await?;
        raw.map(|s| serde_json::from_str(&s).map_err(StoreError::from)).transpose()
    }
}
