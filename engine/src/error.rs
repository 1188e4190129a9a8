use thiserror::Error;

/// Errors from the orchestrator itself, as opposed to per-task errors (which
/// travel inside `CrawlResult.error` and never unwind a worker).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("store error: {0}")]
    Store(#[from] scour_store::StoreError),

    #[error("proxy pool error: {0}")]
    Proxy(#[from] scour_proxy::ProxyError),

    #[error("engine already running")]
    AlreadyRunning,

    #[error("engine not running")]
    NotRunning,
}
