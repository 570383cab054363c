//! Configuration for the inkpost client.
//!
//! Loaded from `~/.inkpost/config.json`, then overridden by `INKPOST_*`
//! environment variables. Every section falls back to its defaults when
//! absent, so an empty file (or no file) is a valid configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{InkpostError, Result};

/// Backend used when neither the config file nor the environment names one.
pub const DEFAULT_BASE_URL: &str = "https://blog-backend-new-three.vercel.app/api";

// ============================================================================
// Sections
// ============================================================================

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every request path is joined onto.
    pub base_url: String,
    /// Default per-request timeout in seconds.
    pub timeout_secs: u64,
    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            user_agent: format!("inkpost/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Response cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// When false every GET goes to the network and nothing is stored.
    pub enabled: bool,
    /// Age after which the sweep drops an entry.
    pub max_age_secs: u64,
    /// Interval between sweeps.
    pub sweep_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_age_secs: 300,
            sweep_interval_secs: 300,
        }
    }
}

impl CacheConfig {
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// Session persistence settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Session file location; `~/.inkpost/session.json` when unset.
    pub path: Option<PathBuf>,
}

impl SessionConfig {
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(crate::auth::SessionStore::default_path)
    }
}

// ============================================================================
// Config
// ============================================================================

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub cache: CacheConfig,
    pub session: SessionConfig,
}

impl Config {
    /// Directory holding config and session files (`~/.inkpost`).
    pub fn dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".inkpost")
    }

    /// Default config file location.
    pub fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load from the default path and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from_path(&Self::path())?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load a config file. A missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(InkpostError::Config(format!(
                    "Failed to read config at {:?}: {}",
                    path, e
                )))
            }
        };

        if data.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_json::from_str(&data).map_err(|e| {
            InkpostError::Config(format!("Failed to parse config at {:?}: {}", path, e))
        })
    }

    /// Apply `INKPOST_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup. Unparseable values are ignored.
    pub fn apply_env_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("INKPOST_API_URL").filter(|v| !v.trim().is_empty()) {
            self.api.base_url = url.trim().to_string();
        }
        if let Some(secs) = lookup("INKPOST_API_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.api.timeout_secs = secs;
        }
        if let Some(enabled) = lookup("INKPOST_CACHE_ENABLED").and_then(|v| parse_bool(&v)) {
            self.cache.enabled = enabled;
        }
        if let Some(secs) = lookup("INKPOST_CACHE_MAX_AGE_SECS").and_then(|v| v.parse().ok()) {
            self.cache.max_age_secs = secs;
        }
        if let Some(secs) = lookup("INKPOST_CACHE_SWEEP_SECS").and_then(|v| v.parse().ok()) {
            self.cache.sweep_interval_secs = secs;
        }
    }

    /// Reject configurations the client cannot run with.
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.api.base_url).map_err(|e| {
            InkpostError::Config(format!("Invalid api.base_url '{}': {}", self.api.base_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(InkpostError::Config(format!(
                "api.base_url must be http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.cache.sweep_interval_secs == 0 {
            return Err(InkpostError::Config(
                "cache.sweep_interval_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_config_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.api.timeout_secs, 30);
        assert!(cfg.cache.enabled);
        assert_eq!(cfg.cache.max_age(), Duration::from_secs(300));
        assert_eq!(cfg.cache.sweep_interval(), Duration::from_secs(300));
        assert!(cfg.session.path.is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_config_deserialize_partial() {
        let json = r#"{"api": {"base_url": "http://localhost:5000/api"}, "cache": {"enabled": false}}"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.api.base_url, "http://localhost:5000/api");
        assert_eq!(cfg.api.timeout_secs, 30); // default
        assert!(!cfg.cache.enabled);
        assert_eq!(cfg.cache.max_age_secs, 300); // default
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let cfg = Config::load_from_path(&tmp.path().join("nope.json")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn test_load_malformed_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, "{\"api\": ").unwrap();
        let err = Config::load_from_path(&path).unwrap_err();
        assert!(matches!(err, InkpostError::Config(_)));
    }

    #[test]
    fn test_env_overrides_beat_file_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"api": {"base_url": "http://file.example/api"}, "cache": {"max_age_secs": 60}}"#,
        )
        .unwrap();
        let mut cfg = Config::load_from_path(&path).unwrap();

        let env: HashMap<&str, &str> = [
            ("INKPOST_API_URL", "https://env.example/api"),
            ("INKPOST_CACHE_ENABLED", "off"),
            ("INKPOST_CACHE_SWEEP_SECS", "30"),
            ("INKPOST_API_TIMEOUT_SECS", "not-a-number"),
        ]
        .into_iter()
        .collect();
        cfg.apply_env_overrides_from(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.api.base_url, "https://env.example/api");
        assert!(!cfg.cache.enabled);
        assert_eq!(cfg.cache.sweep_interval_secs, 30);
        assert_eq!(cfg.cache.max_age_secs, 60); // file value survives
        assert_eq!(cfg.api.timeout_secs, 30); // garbage ignored
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let mut cfg = Config::default();
        cfg.api.base_url = "ftp://example.com".into();
        assert!(cfg.validate().is_err());
        cfg.api.base_url = "not a url".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_sweep_interval() {
        let mut cfg = Config::default();
        cfg.cache.sweep_interval_secs = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" 0 "), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
