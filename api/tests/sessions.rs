use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum_test::TestServer;
use scour_api::{router, AppState};
use scour_core::CrawlResult;
use scour_engine::{Engine, EngineConfig};
use scour_profile::ProfileFactory;
use scour_proxy::ProxyPoolManager;
use scour_store::{CrawlStore, ResultCache, SqliteStore, StoreError};
use serde_json::json;
use uuid::Uuid;

struct NoopCache;

#[async_trait]
impl ResultCache for NoopCache {
    async fn set_result(&self, _result: &CrawlResult, _ttl_secs: u64) -> Result<(), StoreError> {
        Ok(())
    }

    async fn get_result(&self, _task_id: Uuid) -> Result<Option<CrawlResult>, StoreError> {
        Ok(None)
    }
}

async fn test_state() -> AppState {
    let store: Arc<dyn CrawlStore> = Arc::new(SqliteStore::connect("sqlite::memory:").await.unwrap());
    let cache: Arc<dyn ResultCache> = Arc::new(NoopCache);
    let proxies = Arc::new(ProxyPoolManager::new(false, "default"));
    let profiles = Arc::new(ProfileFactory::default_disabled());
    let engine = Arc::new(Engine::new(
        store.clone(),
        cache.clone(),
        proxies,
        profiles,
        EngineConfig { max_workers: 0, rate_limit: Duration::from_millis(0), ..Default::default() },
    ));

    AppState { engine, store, cache }
}

#[tokio::test]
async fn create_and_fetch_session() {
    let state = test_state().await;
    let server = TestServer::new(router(state)).unwrap();

    let response = server
        .post("/sessions")
        .json(&json!({
            "name": "test session",
            "seeds": ["https://example.com/1", "https://example.com/2"],
        }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["tasks_created"], 2);
    let session_id = body["session"]["id"].as_str().unwrap().to_string();

    let get = server.get(&format!("/sessions/{session_id}")).await;
    get.assert_status_ok();
}

#[tokio::test]
async fn create_session_rejects_empty_seeds() {
    let state = test_state().await;
    let server = TestServer::new(router(state)).unwrap();

    let response = server.post("/sessions").json(&json!({ "name": "x", "seeds": [] })).await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn unknown_session_returns_404() {
    let state = test_state().await;
    let server = TestServer::new(router(state)).unwrap();

    let response = server.get(&format!("/sessions/{}", Uuid::new_v4())).await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn stats_endpoint_reports_zero_at_startup() {
    let state = test_state().await;
    let server = TestServer::new(router(state)).unwrap();

    let response = server.get("/stats").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["total_requests"], 0);
}
