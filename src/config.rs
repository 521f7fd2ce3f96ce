//! # Configuration Module
//!
//! Runtime configuration read from environment variables. Secrets have no
//! defaults; everything else does.

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://www.dequa.it/api/address";
pub const DEFAULT_BASE_URL: &str = "https://www.dequa.it/";
pub const DEFAULT_SETTINGS_PATH: &str = "dequa-settings.json";
pub const DEFAULT_LOCALES_DIR: &str = "locales";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub telegram_token: String,
    pub api_token: String,
    pub api_url: String,
    pub base_url: String,
    pub settings_path: PathBuf,
    pub locales_dir: PathBuf,
    pub request_timeout: Duration,
    pub log_format: LogFormat,
}

impl BotConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name
    /// to its value
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let request_timeout = match get("DEQUA_TIMEOUT_SECS") {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::Invalid {
                    name: "DEQUA_TIMEOUT_SECS",
                    value,
                })?,
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let log_format = match get("LOG_FORMAT").map(|v| v.trim().to_lowercase()) {
            None => LogFormat::Text,
            Some(v) if v == "text" => LogFormat::Text,
            Some(v) if v == "json" => LogFormat::Json,
            Some(value) => {
                return Err(ConfigError::Invalid {
                    name: "LOG_FORMAT",
                    value,
                })
            }
        };

        Ok(Self {
            telegram_token: require("TELEGRAM_BOT_TOKEN")?,
            api_token: require("DEQUA_API_TOKEN")?,
            api_url: get("DEQUA_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            base_url: get("DEQUA_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            settings_path: get("SETTINGS_PATH")
                .unwrap_or_else(|| DEFAULT_SETTINGS_PATH.to_string())
                .into(),
            locales_dir: get("LOCALES_DIR")
                .unwrap_or_else(|| DEFAULT_LOCALES_DIR.to_string())
                .into(),
            request_timeout,
            log_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = BotConfig::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "bot-token"),
            ("DEQUA_API_TOKEN", "api-token"),
        ]))
        .unwrap();

        assert_eq!(config.telegram_token, "bot-token");
        assert_eq!(config.api_token, "api-token");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.settings_path, PathBuf::from(DEFAULT_SETTINGS_PATH));
        assert_eq!(config.locales_dir, PathBuf::from(DEFAULT_LOCALES_DIR));
        assert_eq!(config.request_timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_missing_tokens() {
        let err = BotConfig::from_lookup(lookup_from(&[("DEQUA_API_TOKEN", "x")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("TELEGRAM_BOT_TOKEN"));

        let err = BotConfig::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "x"),
            ("DEQUA_API_TOKEN", "   "),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::Missing("DEQUA_API_TOKEN"));
    }

    #[test]
    fn test_overrides() {
        let config = BotConfig::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "x"),
            ("DEQUA_API_TOKEN", "y"),
            ("DEQUA_API_URL", "http://localhost:8080/api/address"),
            ("DEQUA_TIMEOUT_SECS", "3"),
            ("LOG_FORMAT", "JSON"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "http://localhost:8080/api/address");
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_values() {
        let err = BotConfig::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "x"),
            ("DEQUA_API_TOKEN", "y"),
            ("DEQUA_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "DEQUA_TIMEOUT_SECS", .. }));

        let err = BotConfig::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "x"),
            ("DEQUA_API_TOKEN", "y"),
            ("LOG_FORMAT", "xml"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "LOG_FORMAT", .. }));
    }
}
