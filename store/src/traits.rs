//! Interfaces the core orchestrator consumes from its persistence
//! collaborators, per the "External Interfaces" section of the spec.
//!
//! `CrawlStore` plays the role of both the relational store (sessions,
//! tasks) and the document store (full result payloads) — see
//! `SqliteStore`, which backs both with one SQLite database.

use async_trait::async_trait;
use scour_core::{CrawlResult, CrawlSession, CrawlTask, SessionStats, TaskStatus};
use uuid::Uuid;

use crate::error::StoreError;

#[async_trait]
pub trait CrawlStore: Send + Sync {
    async fn create_crawl_session(&self, session: &CrawlSession) -> Result<(), StoreError>;

    /// Persist the seed tasks for a session. Called once at session
    /// creation so the scheduler (the only path to the worker queue) can
    /// find them — see SPEC_FULL.md §9's ingest-linkage decision.
    async fn create_tasks(&self, tasks: &[CrawlTask]) -> Result<(), StoreError>;

    async fn get_crawl_sessions(&self) -> Result<Vec<CrawlSession>, StoreError>;

    async fn get_crawl_session(&self, id: Uuid) -> Result<Option<CrawlSession>, StoreError>;

    async fn update_session_stats(&self, id: Uuid, stats: &SessionStats) -> Result<(), StoreError>;

    /// At most `limit` tasks in status `pending`, ordered by
    /// `(priority desc, created_at asc)`. No locking is performed; callers
    /// must tolerate redelivery.
    async fn get_pending_tasks(&self, limit: u32) -> Result<Vec<CrawlTask>, StoreError>;

    /// Named explicitly per SPEC_FULL.md §9 (the distilled spec gestured at
    /// this operation without naming it).
    async fn mark_task_in_flight(&self, task_id: Uuid) -> Result<(), StoreError>;

    async fn mark_task_terminal(&self, task_id: Uuid, status: TaskStatus) -> Result<(), StoreError>;

    async fn store_crawl_result(&self, result: &CrawlResult) -> Result<(), StoreError>;

    /// Results for `session_id`, at most `limit`, sorted by `start_time`
    /// descending.
    async fn get_crawl_results(&self, session_id: Uuid, limit: u32) -> Result<Vec<CrawlResult>, StoreError>;

    async fn close(&self) -> Result<(), StoreError>;
}

/// Hot-result cache collaborator: `result:<task_id>` holding the
/// JSON-serialized `CrawlResult` with a TTL.
#[async_trait]
pub trait ResultCache: Send + Sync {
    async fn set_result(&self, result: &CrawlResult, ttl_secs: u64) -> Result<(), StoreError>;
    async fn get_result(&self, task_id: Uuid) -> Result<Option<CrawlResult>, StoreError>;
}
