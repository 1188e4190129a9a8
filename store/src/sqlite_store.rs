//! SQLite-backed implementation of `CrawlStore`.
//!
//! Plays the role of both the relational store (sessions/tasks, indexed on
//! `status` and `session_id`) and the document store (full result payload
//! keyed by `task_id`, retrievable sorted by `start_time` descending) named
//! in the spec's external-interfaces section. One database file is enough:
//! the core's correctness does not depend on these being physically
//! separate engines.

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scour_core::{CrawlData, CrawlResult, CrawlSession, CrawlTask, SessionRules, SessionStats, TaskStatus};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::error::StoreError;
use crate::traits::CrawlStore;

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn task_status_from_str(s: &str) -> TaskStatus {
    match s {
        "pending" => TaskStatus::Pending,
        "in_flight" => TaskStatus::InFlight,
        "done" => TaskStatus::Done,
        _ => TaskStatus::Failed,
    }
}

#[async_trait]
impl CrawlStore for SqliteStore {
    async fn create_crawl_session(&self, session: &CrawlSession) -> Result<(), StoreError> {
        let seeds = serde_json::to_string(&session.seeds)?;
        let rules = serde_json::to_string(&session.rules)?;
        let stats = serde_json::to_string(&session.stats)?;

        sqlx::query(
            "INSERT INTO sessions (id, name, seeds, rules, stats, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(session.id.to_string())
        .bind(&session.name)
        .bind(seeds)
        .bind(rules)
        .bind(stats)
        .bind(session.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn create_tasks(&self, tasks: &[CrawlTask]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        for task in tasks {
            let headers = serde_json::to_string(&task.headers)?;
            sqlx::query(
                "INSERT INTO tasks (id, session_id, url, method, headers, priority, max_depth, created_at, scheduled_not_before, status)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(task.id.to_string())
            .bind(task.session_id.to_string())
            .bind(&task.url)
            .bind(&task.method)
            .bind(headers)
            .bind(task.priority)
            .bind(task.max_depth as i64)
            .bind(task.created_at.to_rfc3339())
            .bind(task.scheduled_not_before.map(|t| t.to_rfc3339()))
            .bind(task.status.as_str())
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn get_crawl_sessions(&self) -> Result<Vec<CrawlSession>, StoreError> {
        let rows = sqlx::query("SELECT id, name, seeds, rules, stats, created_at FROM sessions")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_session).collect()
    }

    async fn get_crawl_session(&self, id: Uuid) -> Result<Option<CrawlSession>, StoreError> {
        let row = sqlx::query("SELECT id, name, seeds, rules, stats, created_at FROM sessions WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_session).transpose()
    }

    async fn update_session_stats(&self, id: Uuid, stats: &SessionStats) -> Result<(), StoreError> {
        let stats_json = serde_json::to_string(stats)?;
        sqlx::query("UPDATE sessions SET stats = ? WHERE id = ?")
            .bind(stats_json)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_pending_tasks(&self, limit: u32) -> Result<Vec<CrawlTask>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, session_id, url, method, headers, priority, max_depth, created_at, scheduled_not_before, status
             FROM tasks WHERE status = 'pending'
             ORDER BY priority DESC, created_at ASC
             LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_task).collect()
    }

    async fn mark_task_in_flight(&self, task_id: Uuid) -> Result<(), StoreError> {
        sqlx::query("UPDATE tasks SET status = 'in_flight' WHERE id = ?")
            .bind(task_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn mark_task_terminal(&self, task_id: Uuid, status: TaskStatus) -> Result<(), StoreError> {
        sqlx::query("UPDATE tasks SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(task_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn store_crawl_result(&self, result: &CrawlResult) -> Result<(), StoreError> {
        let data = result.data.as_ref().map(serde_json::to_string).transpose()?;

        sqlx::query(
            "INSERT INTO results (task_id, session_id, url, worker_id, success, data, error, start_time, end_time, duration_ms)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(task_id) DO UPDATE SET
                success = excluded.success, data = excluded.data, error = excluded.error,
                end_time = excluded.end_time, duration_ms = excluded.duration_ms",
        )
        .bind(result.task_id.to_string())
        .bind(session_id_for_task(&self.pool, result.task_id).await?.to_string())
        .bind(&result.url)
        .bind(&result.worker_id)
        .bind(result.success)
        .bind(data)
        .bind(&result.error)
        .bind(result.start_time.to_rfc3339())
        .bind(result.end_time.to_rfc3339())
        .bind(result.duration_ms)
        .execute(&self.pool)
        .await?;

        let terminal = if result.success { TaskStatus::Done } else { TaskStatus::Failed };
        self.mark_task_terminal(result.task_id, terminal).await?;

        Ok(())
    }

    async fn get_crawl_results(&self, session_id: Uuid, limit: u32) -> Result<Vec<CrawlResult>, StoreError> {
        let rows = sqlx::query(
            "SELECT task_id, url, worker_id, success, data, error, start_time, end_time, duration_ms
             FROM results WHERE session_id = ?
             ORDER BY start_time DESC
             LIMIT ?",
        )
        .bind(session_id.to_string())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_result).collect()
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.pool.close().await;
        Ok(())
    }
}

async fn session_id_for_task(pool: &SqlitePool, task_id: Uuid) -> Result<Uuid, StoreError> {
    let row = sqlx::query("SELECT session_id FROM tasks WHERE id = ?")
        .bind(task_id.to_string())
        .fetch_optional(pool)
        .await?;
    match row {
        Some(row) => {
            let raw: String = row.try_get("session_id")?;
            Uuid::from_str(&raw).map_err(|e| StoreError::Decode(e.to_string()))
        }
        None => Ok(Uuid::nil()),
    }
}

fn parse_uuid(raw: &str) -> Result<Uuid, StoreError> {
    Uuid::from_str(raw).map_err(|e| StoreError::Decode(e.to_string()))
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::Decode(e.to_string()))
}

fn row_to_session(row: &sqlx::sqlite::SqliteRow) -> Result<CrawlSession, StoreError> {
    let id: String = row.try_get("id")?;
    let name: String = row.try_get("name")?;
    let seeds_raw: String = row.try_get("seeds")?;
    let rules_raw: String = row.try_get("rules")?;
    let stats_raw: String = row.try_get("stats")?;
    let created_at_raw: String = row.try_get("created_at")?;

    Ok(CrawlSession {
        id: parse_uuid(&id)?,
        name,
        seeds: serde_json::from_str(&seeds_raw)?,
        rules: serde_json::from_str::<SessionRules>(&rules_raw)?,
        stats: serde_json::from_str::<SessionStats>(&stats_raw)?,
        created_at: parse_time(&created_at_raw)?,
    })
}

fn row_to_task(row: &sqlx::sqlite::SqliteRow) -> Result<CrawlTask, StoreError> {
    let id: String = row.try_get("id")?;
    let session_id: String = row.try_get("session_id")?;
    let url: String = row.try_get("url")?;
    let method: String = row.try_get("method")?;
    let headers_raw: String = row.try_get("headers")?;
    let priority: i64 = row.try_get("priority")?;
    let max_depth: i64 = row.try_get("max_depth")?;
    let created_at_raw: String = row.try_get("created_at")?;
    let scheduled_not_before_raw: Option<String> = row.try_get("scheduled_not_before")?;
    let status_raw: String = row.try_get("status")?;

    let headers: HashMap<String, String> = serde_json::from_str(&headers_raw)?;

    Ok(CrawlTask {
        id: parse_uuid(&id)?,
        session_id: parse_uuid(&session_id)?,
        url,
        method,
        headers,
        priority: priority as i32,
        max_depth: max_depth as u32,
        created_at: parse_time(&created_at_raw)?,
        scheduled_not_before: scheduled_not_before_raw.map(|s| parse_time(&s)).transpose()?,
        status: task_status_from_str(&status_raw),
    })
}

fn row_to_result(row: &sqlx::sqlite::SqliteRow) -> Result<CrawlResult, StoreError> {
    let task_id: String = row.try_get("task_id")?;
    let url: String = row.try_get("url")?;
    let worker_id: String = row.try_get("worker_id")?;
    let success: bool = row.try_get("success")?;
    let data_raw: Option<String> = row.try_get("data")?;
    let error: Option<String> = row.try_get("error")?;
    let start_time_raw: String = row.try_get("start_time")?;
    let end_time_raw: String = row.try_get("end_time")?;
    let duration_ms: i64 = row.try_get("duration_ms")?;

    let data: Option<CrawlData> = data_raw.map(|s| serde_json::from_str(&s)).transpose()?;

    Ok(CrawlResult {
        task_id: parse_uuid(&task_id)?,
        url,
        worker_id,
        success,
        data,
        error,
        start_time: parse_time(&start_time_raw)?,
        end_time: parse_time(&end_time_raw)?,
        duration_ms,
    })
}
