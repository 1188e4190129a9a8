//! Proxy pool management and background health-checking.
//!
//! `ProxyPoolManager` owns every named `Pool`; `HealthChecker` is the sole
//! mutator of per-proxy health state, keeping that serialization invariant
//! in one place instead of spread across callers.

pub mod error;
pub mod health;
pub mod pool;
pub mod types;

pub use error::ProxyError;
pub use health::{probe_proxy, HealthCheckConfig, HealthChecker};
pub use pool::{Pool, ProxyPoolManager};
pub use types::{PoolStats, ProxyCredentials, ProxyHandle, ProxyInfo, ProxyStats, ProxyType, ProxyView};
