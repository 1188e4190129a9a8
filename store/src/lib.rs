//! Persistence collaborators: a relational/document store for sessions,
//! tasks and results, and a hot-result cache in front of it.

pub mod cache;
pub mod error;
pub mod sqlite_store;
pub mod traits;

pub use cache::RedisResultCache;
pub use error::StoreError;
pub use sqlite_store::SqliteStore;
pub use traits::{CrawlStore, ResultCache};
