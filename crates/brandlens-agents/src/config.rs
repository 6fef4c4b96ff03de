//! Configuration for the remote agents service.

use std::time::Duration;

/// Where the agents service lives and how long to wait for it.
#[derive(Debug, Clone)]
pub struct AgentsConfig {
    /// Base URL of the agents service.
    pub base_url: String,
    /// Per-call timeout. Critique calls wait on model inference, so the
    /// default is generous.
    pub timeout: Duration,
    /// Value sent as the User-Agent header.
    pub user_agent: String,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        AgentsConfig {
            base_url: std::env::var("BRANDLENS_AGENTS_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8000".to_string()),
            timeout: Duration::from_secs(180),
            user_agent: concat!("brandlens/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl AgentsConfig {
    /// Create a config from environment variables.
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create a config for a specific service URL.
    pub fn new(base_url: &str) -> Self {
        AgentsConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..AgentsConfig::default()
        }
    }

    /// Set the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full URL of one agent endpoint.
    pub fn agent_url(&self, slug: &str) -> String {
        format!("{}/agents/{}", self.base_url.trim_end_matches('/'), slug)
    }
}
