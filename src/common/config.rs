//! # Configuration Utilities
//!
//! Shared configuration loading used by both the relay and the client.
//! Files are TOML; a handful of environment variables override what the
//! file says.

use anyhow::Result;
use serde::Deserialize;
use std::fs;

/// Backend origin used when nothing else is configured.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";

/// Relay-side override of the backend origin.
pub const BACKEND_URL_VAR: &str = "BACKEND_URL";

/// Client-side override of the origin the client talks to.
pub const PUBLIC_BACKEND_URL_VAR: &str = "NEXT_PUBLIC_BACKEND_URL";

/// Load a TOML configuration file and deserialize it into the specified type.
///
/// # Arguments
/// - `path`: Path to the TOML configuration file
///
/// # Returns
/// - `Ok(T)`: Successfully loaded and parsed configuration
/// - `Err`: File I/O or parsing error
///
/// # Example
/// ```ignore
/// let config: RelayConfig = load_config("config/relay.toml")?;
/// ```
pub fn load_config<T>(path: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let content = fs::read_to_string(path)?;
    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Read an environment override through `lookup`, ignoring unset and blank values.
///
/// Taking the lookup as a closure keeps tests away from the process environment.
pub fn env_override<F>(lookup: F, var: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Process-environment lookup for [`env_override`].
pub fn process_env(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

/// Strip trailing slashes so paths can be appended with a single `/`.
pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[derive(Debug, Deserialize)]
    struct Sample {
        url: String,
        retries: u32,
    }

    #[test]
    fn test_load_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "url = \"http://ocr:5000\"\nretries = 0").unwrap();

        let sample: Sample = load_config(file.path().to_str().unwrap()).unwrap();
        assert_eq!(sample.url, "http://ocr:5000");
        assert_eq!(sample.retries, 0);
    }

    #[test]
    fn test_load_config_missing_file() {
        assert!(load_config::<Sample>("/definitely/not/here.toml").is_err());
    }

    #[test]
    fn test_env_override_ignores_blank() {
        let lookup = |var: &str| match var {
            "SET" => Some(" http://ocr:5000 ".to_string()),
            "BLANK" => Some("   ".to_string()),
            _ => None,
        };
        assert_eq!(env_override(lookup, "SET").as_deref(), Some("http://ocr:5000"));
        assert_eq!(env_override(lookup, "BLANK"), None);
        assert_eq!(env_override(lookup, "UNSET"), None);
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("http://localhost:5000/"), "http://localhost:5000");
        assert_eq!(normalize_base_url("http://localhost:5000//"), "http://localhost:5000");
        assert_eq!(normalize_base_url("http://localhost:5000"), "http://localhost:5000");
    }
}
