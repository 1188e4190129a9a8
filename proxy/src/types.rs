//! Proxy data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Usability threshold: a proxy is usable iff `healthy && fail_count < USABLE_FAIL_THRESHOLD`.
pub const USABLE_FAIL_THRESHOLD: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProxyType {
    Residential,
    Datacenter,
    Mobile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyCredentials {
    pub username: String,
    pub password: String,
}

/// Immutable identity of one upstream proxy. Mutable health state lives
/// alongside this in `ProxySlot`, guarded by a per-proxy lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyInfo {
    pub id: String,
    pub host: String,
    pub port: u16,
    pub proxy_type: ProxyType,
    pub country: String,
    pub provider: String,
    pub credentials: Option<ProxyCredentials>,
}

impl ProxyInfo {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        proxy_type: ProxyType,
        country: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        let host = host.into();
        let port_copy = port;
        Self {
            id: format!("{host}:{port_copy}"),
            host,
            port,
            proxy_type,
            country: country.into(),
            provider: provider.into(),
            credentials: None,
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(ProxyCredentials {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    /// The `scheme://[user:pass@]host:port` URL reqwest expects for a proxy transport.
    pub fn proxy_url(&self) -> String {
        match &self.credentials {
            Some(creds) => format!(
                "http://{}:{}@{}:{}",
                creds.username, creds.password, self.host, self.port
            ),
            None => format!("http://{}:{}", self.host, self.port),
        }
    }
}

/// Mutable health state of a proxy, serialized per-proxy.
#[derive(Debug, Clone)]
pub struct ProxyHealth {
    pub healthy: bool,
    pub fail_count: u32,
    pub last_used: Option<DateTime<Utc>>,
}

impl Default for ProxyHealth {
    fn default() -> Self {
        Self {
            healthy: true,
            fail_count: 0,
            last_used: None,
        }
    }
}

impl ProxyHealth {
    pub fn is_usable(&self) -> bool {
        self.healthy && self.fail_count < USABLE_FAIL_THRESHOLD
    }

    pub fn record_probe_success(&mut self) {
        self.healthy = true;
        self.fail_count = 0;
    }

    pub fn record_probe_failure(&mut self) {
        self.healthy = false;
        self.fail_count += 1;
    }

    pub fn record_use(&mut self) {
        self.last_used = Some(Utc::now());
    }
}

/// A point-in-time view of one proxy, for stats / control-API export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyView {
    pub info: ProxyInfo,
    pub healthy: bool,
    pub fail_count: u32,
    pub last_used: Option<DateTime<Utc>>,
}

/// A proxy handed out by `GetProxy`, ready to be used for exactly one fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyHandle {
    pub pool_name: String,
    pub info: ProxyInfo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoolStats {
    pub name: String,
    pub total: usize,
    pub healthy: usize,
    pub proxy_type: Option<ProxyType>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProxyStats {
    pub pools: Vec<PoolStats>,
}
