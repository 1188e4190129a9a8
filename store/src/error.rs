use thiserror::Error;

/// Errors from persistence collaborators. Per §7, these are best-effort:
/// callers log and continue rather than aborting the run (the sole
/// exception is store construction at startup, which is an `InitFailure`).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("row decode error: {0}")]
    Decode(String),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}
