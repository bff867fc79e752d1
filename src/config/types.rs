//! Configuration data model.
//!
//! Struct definitions and their defaults only; source discovery and env
//! overrides live in sibling modules.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::defaults::{
    DEFAULT_BASE_DELAY_MS, DEFAULT_JITTER_RATIO, DEFAULT_MAX_RETRIES, DEFAULT_PAGE_URL,
    DEFAULT_TIMEOUT_SECS,
};
use crate::api::RetryPolicy;

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ConsoleConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub network: NetworkConfig,
    pub retry: RetryConfig,
}

/// Where the console is mounted.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// Location of the loaded console page.
    pub page_url: String,
    /// Explicit mount prefix; empty means derive it from `page_url`.
    pub base_path: String,
    /// Local development mode: the base path is always empty.
    pub development: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            page_url: DEFAULT_PAGE_URL.to_string(),
            base_path: String::new(),
            development: false,
        }
    }
}

/// Initial session values rendered into the page by the server.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct AuthConfig {
    pub org_id: String,
    pub csrf_token: String,
    /// Login URL for expired sessions; `%LOCATION%` receives the page URL.
    pub redirect_template: String,
}

/// Network/HTTP timeout policy.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct NetworkConfig {
    pub timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl NetworkConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Retry budget and backoff shape.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub jitter_ratio: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            jitter_ratio: DEFAULT_JITTER_RATIO,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.base_delay_ms),
            jitter_ratio: self.jitter_ratio,
        }
    }
}

/// Diagnostics captured while resolving runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDiagnostics {
    /// Non-fatal problems worth showing to the operator.
    pub warnings: Vec<String>,
}

/// Configuration payload plus load-time diagnostics.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: ConsoleConfig,
    pub diagnostics: ConfigDiagnostics,
}
