//! Shared types and primitives for the crawl orchestrator.
//!
//! This crate has no knowledge of tokio tasks, queues or stores; it only
//! defines the data model (tasks, results, sessions, proxies, profiles) and
//! the small amount of pure logic (domain extraction, URL validation) that
//! every other crate in the workspace builds on.

pub mod domain;
pub mod error;
pub mod security;
pub mod types;

pub use error::CoreError;
pub use types::{
    CrawlData, CrawlResult, CrawlSession, CrawlTask, SessionRules, SessionStats, TaskStatus,
};
