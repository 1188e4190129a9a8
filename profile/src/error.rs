//! Errors from profile generation.

use thiserror::Error;

/// `ProfileFactory` is otherwise infallible — the only way `generate_profile`
/// fails is a target URL rejected by the shared SSRF guard.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("refusing to generate a profile for an unsafe target: {0}")]
    UnsafeTarget(#[from] scour_core::security::SecurityError),
}
