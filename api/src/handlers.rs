//! Thin HTTP handlers: deserialize, call into the engine/store, serialize
//! the response as JSON. No auth, rate limiting, or pagination beyond
//! `limit`.

use axum::extract::{Path, Query, State};
use axum::Json;
use scour_core::security::UrlValidator;
use scour_core::{CrawlSession, CrawlTask, SessionRules};
use scour_proxy::{probe_proxy, HealthCheckConfig, ProxyInfo, ProxyType};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub name: String,
    pub seeds: Vec<String>,
    #[serde(default)]
    pub rules: Option<SessionRules>,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session: CrawlSession,
    pub tasks_created: usize,
}

/// Persists the session row and its seed tasks before returning: the
/// scheduler is the only path by which a task reaches a worker.
///
/// Every seed is run through the shared SSRF guard before anything is
/// persisted — this is the point where untrusted URLs enter the system, so
/// it is also the only place that needs to reject them.
pub async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<Json<CreateSessionResponse>, ApiError> {
    if req.seeds.is_empty() {
        return Err(ApiError::BadRequest("seeds must not be empty".into()));
    }

    let validator = UrlValidator::default();
    for seed in &req.seeds {
        validator
            .validate_url(seed)
            .map_err(|e| ApiError::BadRequest(format!("seed '{seed}' rejected: {e}")))?;
    }

    let session = CrawlSession::new(req.name, req.seeds.clone(), req.rules.unwrap_or_default());
    state.store.create_crawl_session(&session).await?;

    let tasks: Vec<CrawlTask> = req
        .seeds
        .iter()
        .map(|seed| CrawlTask::new(session.id, seed.clone()))
        .collect();
    let tasks_created = tasks.len();
    state.store.create_tasks(&tasks).await?;

    Ok(Json(CreateSessionResponse { session, tasks_created }))
}

pub async fn list_sessions(State(state): State<AppState>) -> Result<Json<Vec<CrawlSession>>, ApiError> {
    Ok(Json(state.store.get_crawl_sessions().await?))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CrawlSession>, ApiError> {
    state
        .store
        .get_crawl_session(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("session {id} not found")))
}

#[derive(Debug, Serialize)]
pub struct StopSessionResponse {
    pub session_id: Uuid,
    pub note: &'static str,
}

/// The storage interface exposes no per-session cancellation primitive, so
/// this is advisory only: it confirms the session exists. Tasks already
/// admitted to a worker still run to completion.
pub async fn stop_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StopSessionResponse>, ApiError> {
    state
        .store
        .get_crawl_session(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("session {id} not found")))?;

    Ok(Json(StopSessionResponse {
        session_id: id,
        note: "stop is advisory: in-flight tasks complete, only future admission is affected",
    }))
}

#[derive(Debug, Deserialize)]
pub struct ResultsQuery {
    #[serde(default = "default_results_limit")]
    pub limit: u32,
}

fn default_results_limit() -> u32 {
    100
}

pub async fn get_session_results(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ResultsQuery>,
) -> Result<Json<Vec<scour_core::CrawlResult>>, ApiError> {
    Ok(Json(state.store.get_crawl_results(id, query.limit).await?))
}

pub async fn get_stats(State(state): State<AppState>) -> Json<scour_engine::StatsSnapshot> {
    Json(state.engine.stats())
}

pub async fn get_proxy_stats(State(state): State<AppState>) -> Json<scour_proxy::ProxyStats> {
    Json(state.engine.proxy_stats().await)
}

#[derive(Debug, Deserialize)]
pub struct ProxyTestRequest {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProxyTestResponse {
    pub healthy: bool,
}

pub async fn test_proxy(Json(req): Json<ProxyTestRequest>) -> Json<ProxyTestResponse> {
    let mut info = ProxyInfo::new(req.host, req.port, ProxyType::Datacenter, "unknown", "ad-hoc");
    if let (Some(user), Some(pass)) = (req.username, req.password) {
        info = info.with_credentials(user, pass);
    }

    let config = HealthCheckConfig {
        interval: Duration::from_secs(60),
        probe_timeout: Duration::from_secs(10),
        probe_url: "https://httpbin.org/ip".to_string(),
    };
    let healthy = probe_proxy(&info, &config).await;
    Json(ProxyTestResponse { healthy })
}
