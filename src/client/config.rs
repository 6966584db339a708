use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::common::config::{env_override, load_config, normalize_base_url, PUBLIC_BACKEND_URL_VAR};

pub const DEFAULT_RELAY_URL: &str = "http://localhost:3000";

/// Client configuration loaded from TOML file.
///
/// # Example TOML
///
/// ```toml
/// target_url = "http://localhost:3000"
/// timeout_secs = 60
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Origin the client uploads to (the relay)
    pub target_url: String,
    /// Upper bound for the whole upload round trip
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            target_url: DEFAULT_RELAY_URL.to_string(),
            timeout_secs: 60,
        }
    }
}

impl ClientConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        load_config(path)
    }

    /// Apply `NEXT_PUBLIC_BACKEND_URL` on top of the file settings.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = env_override(lookup, PUBLIC_BACKEND_URL_VAR) {
            self.target_url = url;
        }
        self.target_url = normalize_base_url(&self.target_url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: ClientConfig = toml::from_str("").unwrap();
        assert_eq!(config.target_url, DEFAULT_RELAY_URL);
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn test_env_override() {
        let mut config = ClientConfig::default();
        config.apply_env(|var| {
            (var == PUBLIC_BACKEND_URL_VAR).then(|| "http://relay.internal:8080/".to_string())
        });
        assert_eq!(config.target_url, "http://relay.internal:8080");

        let mut config = ClientConfig::default();
        config.apply_env(|_| None);
        assert_eq!(config.target_url, DEFAULT_RELAY_URL);
    }
}
