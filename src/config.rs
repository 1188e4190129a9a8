//! Typed configuration, loaded from a YAML file and layered with
//! environment overrides (prefix `SCOUR_`, double underscore nesting,
//! e.g. `SCOUR_CRAWLER__MAX_WORKERS`).
//!
//! The teacher crate declares the `config`/`dotenvy` dependencies without
//! ever loading anything through them; this is where that stack actually
//! gets used.

use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    pub max_workers: usize,
    pub queue_size: usize,
    pub rate_limit_ms: u64,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_workers: 1000,
            queue_size: 10_000,
            rate_limit_ms: 0,
            user_agent: "scour/0.1".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub pool_type: String,
    #[serde(default)]
    pub providers: Vec<String>,
    #[serde(default)]
    pub endpoints: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    pub enabled: bool,
    pub rotation_interval_secs: u64,
    pub health_check_interval_secs: u64,
    #[serde(default)]
    pub pools: Vec<PoolConfig>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            rotation_interval_secs: 300,
            health_check_interval_secs: 60,
            pools: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StealthConfig {
    pub enabled: bool,
    pub fingerprint_rotation: bool,
    pub canvas_noise: bool,
    pub webgl_spoofing: bool,
    pub user_agent_rotation: bool,
    #[serde(default)]
    pub fingerprint_seed: Option<u64>,
}

impl Default for StealthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            fingerprint_rotation: false,
            canvas_noise: false,
            webgl_spoofing: false,
            user_agent_rotation: false,
            fingerprint_seed: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub database_path: String,
    pub redis_url: String,
    pub cache_ttl_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite://scour.db".to_string(),
            redis_url: "redis://127.0.0.1:6379".to_string(),
            cache_ttl_secs: 3600,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind_addr: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { bind_addr: "0.0.0.0:8080".to_string() }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub stealth: StealthConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

impl AppConfig {
    /// `path` is read if it exists; a missing file falls back to defaults
    /// layered with environment overrides. A present-but-malformed file is
    /// an error (`InitFailure` at the caller).
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let mut builder = Config::builder();
        if path.exists() {
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(Environment::with_prefix("SCOUR").separator("__"));

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = AppConfig::load("/nonexistent/path/config.yaml").unwrap();
        assert_eq!(config.crawler.max_workers, 1000);
        assert_eq!(config.http.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn env_override_wins_over_default() {
        std::env::set_var("SCOUR_HTTP__BIND_ADDR", "127.0.0.1:9999");
        let config = AppConfig::load("/nonexistent/path/config.yaml").unwrap();
        assert_eq!(config.http.bind_addr, "127.0.0.1:9999");
        std::env::remove_var("SCOUR_HTTP__BIND_ADDR");
    }
}
