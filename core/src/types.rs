//! Core data model: tasks, results, sessions.
//!
//! These types flow between the scheduler, workers, the sink and the store
//! collaborator. They carry no behavior beyond simple constructors; the
//! orchestration logic that mutates task status and aggregates stats lives
//! in `scour_engine`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a `CrawlTask`.
///
/// A task never reappears in the pending set once moved to a terminal
/// state (`Done` or `Failed`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InFlight,
    Done,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InFlight => "in_flight",
            TaskStatus::Done => "done",
            TaskStatus::Failed => "failed",
        }
    }
}

/// One URL to fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlTask {
    pub id: Uuid,
    pub session_id: Uuid,
    pub url: String,
    pub method: String,
    pub headers: HashMap<String, String>,
    /// Higher runs first.
    pub priority: i32,
    pub max_depth: u32,
    pub created_at: DateTime<Utc>,
    pub scheduled_not_before: Option<DateTime<Utc>>,
    pub status: TaskStatus,
}

impl CrawlTask {
    pub fn new(session_id: Uuid, url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            url: url.into(),
            method: "GET".to_string(),
            headers: HashMap::new(),
            priority: 0,
            max_depth: 0,
            created_at: Utc::now(),
            scheduled_not_before: None,
            status: TaskStatus::Pending,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }
}

/// Captured payload from a successful fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlData {
    pub url: String,
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    /// True when `body` was truncated at the configured cap; the original
    /// response was larger than `body.len()`.
    pub truncated: bool,
    /// Number of bytes actually captured into `body` (== body.len(), kept
    /// explicit so truncation is observable even if `body` is elided from
    /// a serialized view).
    pub captured_bytes: usize,
    pub timestamp: DateTime<Utc>,
    /// Populated only by downstream extractors; the core never fills these.
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// One outcome of a task execution.
///
/// Invariant: exactly one of `data`/`error` is `Some`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResult {
    pub task_id: Uuid,
    pub url: String,
    pub worker_id: String,
    pub success: bool,
    pub data: Option<CrawlData>,
    pub error: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_ms: i64,
}

impl CrawlResult {
    pub fn success(
        task: &CrawlTask,
        worker_id: impl Into<String>,
        data: CrawlData,
        start_time: DateTime<Utc>,
    ) -> Self {
        let end_time = Utc::now();
        Self {
            task_id: task.id,
            url: task.url.clone(),
            worker_id: worker_id.into(),
            success: true,
            data: Some(data),
            error: None,
            start_time,
            end_time,
            duration_ms: (end_time - start_time).num_milliseconds(),
        }
    }

    pub fn failure(
        task: &CrawlTask,
        worker_id: impl Into<String>,
        error: impl Into<String>,
        start_time: DateTime<Utc>,
    ) -> Self {
        let end_time = Utc::now();
        Self {
            task_id: task.id,
            url: task.url.clone(),
            worker_id: worker_id.into(),
            success: false,
            data: None,
            error: Some(error.into()),
            start_time,
            end_time,
            duration_ms: (end_time - start_time).num_milliseconds(),
        }
    }
}

/// Traversal rules attached to a session. The core reads these only insofar
/// as link-expansion (out of scope) would need them; it does not enforce
/// `respect_robots` itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRules {
    pub max_depth: u32,
    pub max_pages: u32,
    pub allow_domains: Vec<String>,
    pub block_domains: Vec<String>,
    pub url_patterns: Vec<String>,
    pub respect_robots: bool,
    pub per_task_delay_ms: u64,
}

impl Default for SessionRules {
    fn default() -> Self {
        Self {
            max_depth: 1,
            max_pages: 1000,
            allow_domains: Vec::new(),
            block_domains: Vec::new(),
            url_patterns: Vec::new(),
            respect_robots: false,
            per_task_delay_ms: 0,
        }
    }
}

/// Aggregated per-session counters, updated by `UpdateSessionStats`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_tasks: u64,
    pub pending_tasks: u64,
    pub in_flight_tasks: u64,
    pub done_tasks: u64,
    pub failed_tasks: u64,
}

/// A named set of seeds plus traversal rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSession {
    pub id: Uuid,
    pub name: String,
    pub seeds: Vec<String>,
    pub rules: SessionRules,
    pub stats: SessionStats,
    pub created_at: DateTime<Utc>,
}

impl CrawlSession {
    pub fn new(name: impl Into<String>, seeds: Vec<String>, rules: SessionRules) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            seeds,
            rules,
            stats: SessionStats::default(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_task_starts_pending_with_default_priority() {
        let task = CrawlTask::new(Uuid::new_v4(), "https://example.com");
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, 0);
        assert_eq!(task.method, "GET");
    }

    #[test]
    fn success_and_failure_are_mutually_exclusive_shapes() {
        let task = CrawlTask::new(Uuid::new_v4(), "https://example.com");
        let start = Utc::now();

        let ok = CrawlResult::success(
            &task,
            "worker-1",
            CrawlData {
                url: task.url.clone(),
                status_code: 200,
                headers: HashMap::new(),
                body: vec![1, 2, 3],
                truncated: false,
                captured_bytes: 3,
                timestamp: Utc::now(),
                links: vec![],
                images: vec![],
                metadata: HashMap::new(),
            },
            start,
        );
        assert!(ok.success);
        assert!(ok.data.is_some());
        assert!(ok.error.is_none());

        let err = CrawlResult::failure(&task, "worker-1", "no healthy proxy", start);
        assert!(!err.success);
        assert!(err.data.is_none());
        assert!(err.error.is_some());
    }

    #[test]
    fn terminal_status_classification() {
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::InFlight.is_terminal());
        assert!(TaskStatus::Done.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
    }
}
