use thiserror::Error;

/// Errors produced by the shared data model / URL handling layer.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("URL has no host component: '{url}'")]
    NoHost { url: String },
}
