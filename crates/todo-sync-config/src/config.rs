//! Client configuration.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Default service address (the gateway listens on port 8080).
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Delay between two job status queries.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Status queries per job before giving up (about one minute at the default interval).
pub const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 120;

/// Per-request HTTP timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Items requested by a fetch.
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

/// Largest page the service accepts.
pub const MAX_PAGE_LIMIT: u32 = 100;

const ENV_API_URL: &str = "TODO_SYNC_API_URL";
const ENV_LOG_LEVEL: &str = "TODO_SYNC_LOG_LEVEL";
const ENV_POLL_INTERVAL_MS: &str = "TODO_SYNC_POLL_INTERVAL_MS";
const ENV_POLL_MAX_ATTEMPTS: &str = "TODO_SYNC_POLL_MAX_ATTEMPTS";

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the todo service.
    pub api_url: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Delay between job status queries, in milliseconds.
    pub poll_interval_ms: u64,
    /// Status queries per job; `None` (`null` in the file) polls until the job
    /// terminates. Zero is rejected; the environment override maps `0` to `None`.
    pub poll_max_attempts: Option<u32>,
    /// HTTP request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Page size used by fetch.
    pub page_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            poll_max_attempts: Some(DEFAULT_POLL_MAX_ATTEMPTS),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl Config {
    /// Defaults overridden from the environment.
    pub fn new() -> ConfigResult<Self> {
        let mut config = Self::default();
        config.load_from_env()?;
        Ok(config)
    }

    /// `~/.config/todo-sync/config.json` (platform equivalent), if a config dir exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("todo-sync").join("config.json"))
    }

    /// Load from `path` when it exists, then apply environment overrides.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let mut config = if path.exists() {
            Self::load_from_file(path)?
        } else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            Self::default()
        };

        config.load_from_env()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn load_from_env(&mut self) -> ConfigResult<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup` (normally the process environment).
    ///
    /// A max-attempts value of `0` means "poll until the job terminates".
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api_url = api_url.trim().to_string();
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|v| !v.trim().is_empty()) {
            self.log_level = level.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_POLL_INTERVAL_MS) {
            self.poll_interval_ms = parse_env_number(ENV_POLL_INTERVAL_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_POLL_MAX_ATTEMPTS) {
            self.poll_max_attempts = match parse_env_number::<u32>(ENV_POLL_MAX_ATTEMPTS, &raw)? {
                0 => None,
                n => Some(n),
            };
        }
        self.validate()
    }

    /// Reject values the client cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.page_limit == 0 || self.page_limit > MAX_PAGE_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "page_limit must be between 1 and {}",
                MAX_PAGE_LIMIT
            )));
        }
        if self.poll_max_attempts == Some(0) {
            return Err(ConfigError::Invalid(
                "poll_max_attempts must be at least 1, or null to poll until the job ends"
                    .to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the API URL as a parsed URL.
    pub fn api_url(&self) -> ConfigResult<Url> {
        Url::parse(&self.api_url).map_err(ConfigError::from)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_env_number<T: std::str::FromStr>(key: &str, raw: &str) -> ConfigResult<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| ConfigError::Invalid(format!("{} is not a number: {:?}", key, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
        assert_eq!(config.poll_max_attempts, Some(120));
        assert_eq!(config.page_limit, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(env(&[
                ("TODO_SYNC_API_URL", " https://todos.example.com "),
                ("TODO_SYNC_LOG_LEVEL", "debug"),
                ("TODO_SYNC_POLL_INTERVAL_MS", "250"),
                ("TODO_SYNC_POLL_MAX_ATTEMPTS", "10"),
            ]))
            .unwrap();

        assert_eq!(config.api_url, "https://todos.example.com");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.poll_interval_ms, 250);
        assert_eq!(config.poll_max_attempts, Some(10));
    }

    #[test]
    fn test_zero_max_attempts_means_unbounded() {
        let mut config = Config::default();
        config
            .apply_overrides(env(&[("TODO_SYNC_POLL_MAX_ATTEMPTS", "0")]))
            .unwrap();
        assert_eq!(config.poll_max_attempts, None);
    }

    #[test]
    fn test_blank_api_url_is_ignored() {
        let mut config = Config::default();
        config
            .apply_overrides(env(&[("TODO_SYNC_API_URL", "   ")]))
            .unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_non_numeric_override_is_rejected() {
        let mut config = Config::default();
        let result = config.apply_overrides(env(&[("TODO_SYNC_POLL_INTERVAL_MS", "fast")]));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let config = Config {
            poll_interval_ms: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_page_limit_bounds() {
        let too_big = Config {
            page_limit: 101,
            ..Config::default()
        };
        assert!(too_big.validate().is_err());

        let empty = Config {
            page_limit: 0,
            ..Config::default()
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_config_load_from_file_fills_missing_fields() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(&config_path, r#"{ "api_url": "http://10.0.0.5:8080" }"#).unwrap();

        let config = Config::load_from_file(&config_path).unwrap();
        assert_eq!(config.api_url, "http://10.0.0.5:8080");
        assert_eq!(config.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
    }

    #[test]
    fn test_config_file_rejects_zero_max_attempts() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(&config_path, r#"{ "poll_max_attempts": 0 }"#).unwrap();

        let result = Config::load_from_file(&config_path);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_config_file_null_max_attempts_is_unbounded() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(&config_path, r#"{ "poll_max_attempts": null }"#).unwrap();

        let config = Config::load_from_file(&config_path).unwrap();
        assert_eq!(config.poll_max_attempts, None);
    }

    #[test]
    fn test_config_file_rejects_zero_request_timeout() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(&config_path, r#"{ "request_timeout_secs": 0 }"#).unwrap();

        let result = Config::load_from_file(&config_path);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_config_save_and_load_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nested").join("config.json");

        let config = Config {
            log_level: "trace".to_string(),
            poll_max_attempts: None,
            ..Config::default()
        };
        config.save(&config_path).unwrap();

        let loaded = Config::load_from_file(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_api_url_parse() {
        let config = Config::default();
        let url = config.api_url().unwrap();
        assert_eq!(url.scheme(), "http");
        assert_eq!(url.port(), Some(8080));

        let broken = Config {
            api_url: "not a valid url".to_string(),
            ..Config::default()
        };
        assert!(broken.api_url().is_err());
    }
}
