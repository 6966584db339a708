use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::common::config::{
    env_override, load_config, normalize_base_url, BACKEND_URL_VAR, DEFAULT_BACKEND_URL,
};

/// Two 5 MiB images plus multipart framing.
pub const DEFAULT_MAX_BODY_BYTES: usize = 12 * 1024 * 1024;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub relay: RelayInfo,
    pub backend: BackendConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayInfo {
    pub listen_addr: String,
    pub static_dir: Option<String>,
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub url: String,
    pub health_timeout_secs: u64,
    pub forward_timeout_secs: u64,
}

impl Default for RelayInfo {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:3000".to_string(),
            static_dir: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_BACKEND_URL.to_string(),
            health_timeout_secs: 5,
            forward_timeout_secs: 30,
        }
    }
}

impl BackendConfig {
    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }

    pub fn forward_timeout(&self) -> Duration {
        Duration::from_secs(self.forward_timeout_secs)
    }
}

impl RelayConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        load_config(path)
    }

    /// Apply `BACKEND_URL` on top of the file settings.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = env_override(lookup, BACKEND_URL_VAR) {
            self.backend.url = url;
        }
        self.backend.url = normalize_base_url(&self.backend.url);
    }
}
