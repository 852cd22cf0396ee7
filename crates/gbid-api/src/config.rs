//! Service configuration from environment variables

use crate::error::{Result, ServerError};
use anthropic_messages::MessagesClient;
use freshness_cache::{CacheConfig, PersistenceMode};
use gsheets_csv::SheetsClient;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub claude_api_key: Option<String>,
    pub claude_model: String,
    pub persistence: PersistenceMode,
    pub cache_max_age_secs: u64,
    pub cache_sweep_interval_secs: u64,
    pub sheets_base_url: String,
    pub anthropic_base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            claude_api_key: None,
            claude_model: MessagesClient::DEFAULT_MODEL.to_string(),
            persistence: PersistenceMode::Memory,
            cache_max_age_secs: 24 * 60 * 60, // 24 hours
            cache_sweep_interval_secs: 60 * 60, // 1 hour
            sheets_base_url: SheetsClient::DEFAULT_BASE_URL.to_string(),
            anthropic_base_url: MessagesClient::DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl ServerConfig {
    /// Parse configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Parse configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = lookup("PORT")
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(defaults.port);

        let claude_api_key = lookup("CLAUDE_API_KEY").filter(|key| !key.trim().is_empty());

        let claude_model = lookup("CLAUDE_MODEL").unwrap_or(defaults.claude_model);

        let cache_path = lookup("CACHE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./cache/sheets.json"));

        let persistence = match lookup("CACHE_MODE").as_deref().map(str::trim) {
            None | Some("") | Some("memory") => PersistenceMode::Memory,
            Some("file") => PersistenceMode::File(cache_path),
            Some(other) => {
                return Err(ServerError::Config(format!(
                    "unknown CACHE_MODE '{}', expected 'memory' or 'file'",
                    other
                )))
            }
        };

        let cache_max_age_secs = lookup("CACHE_MAX_AGE_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(defaults.cache_max_age_secs);

        let cache_sweep_interval_secs = lookup("CACHE_SWEEP_INTERVAL_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(defaults.cache_sweep_interval_secs);

        let sheets_base_url = lookup("SHEETS_BASE_URL").unwrap_or(defaults.sheets_base_url);
        validate_url("SHEETS_BASE_URL", &sheets_base_url)?;

        let anthropic_base_url =
            lookup("ANTHROPIC_BASE_URL").unwrap_or(defaults.anthropic_base_url);
        validate_url("ANTHROPIC_BASE_URL", &anthropic_base_url)?;

        Ok(Self {
            port,
            claude_api_key,
            claude_model,
            persistence,
            cache_max_age_secs,
            cache_sweep_interval_secs,
            sheets_base_url,
            anthropic_base_url,
        })
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::from_secs(self.cache_max_age_secs, self.cache_sweep_interval_secs)
    }
}

fn validate_url(name: &str, value: &str) -> Result<()> {
    let parsed = url::Url::parse(value)
        .map_err(|e| ServerError::Config(format!("{} is not a valid URL: {}", name, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ServerError::Config(format!(
            "{} must use http or https, got '{}'",
            name, scheme
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.port, 3000);
        assert!(config.claude_api_key.is_none());
        assert_eq!(config.claude_model, "claude-sonnet-4-20250514");
        assert_eq!(config.persistence, PersistenceMode::Memory);
        assert_eq!(config.cache_max_age_secs, 86_400);
        assert_eq!(config.cache_sweep_interval_secs, 3_600);
        assert_eq!(config.sheets_base_url, "https://docs.google.com");
        assert_eq!(config.anthropic_base_url, "https://api.anthropic.com");
    }

    #[test]
    fn test_file_mode() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("CACHE_MODE", "file"),
            ("CACHE_PATH", "/var/cache/gbid.json"),
        ]))
        .unwrap();
        assert_eq!(
            config.persistence,
            PersistenceMode::File(PathBuf::from("/var/cache/gbid.json"))
        );
    }

    #[test]
    fn test_unknown_cache_mode() {
        let err = ServerConfig::from_lookup(lookup_from(&[("CACHE_MODE", "redis")])).unwrap_err();
        assert!(err.to_string().contains("unknown CACHE_MODE 'redis'"));
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("PORT", "8080"),
            ("CLAUDE_API_KEY", "sk-test"),
            ("CLAUDE_MODEL", "claude-test"),
            ("CACHE_MAX_AGE_SECS", "60"),
            ("CACHE_SWEEP_INTERVAL_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.claude_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.claude_model, "claude-test");

        let cache = config.cache_config();
        assert_eq!(cache.max_age, Duration::from_secs(60));
        assert_eq!(cache.sweep_interval, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("PORT", "not-a-port"),
            ("CLAUDE_API_KEY", "   "),
            ("CACHE_SWEEP_INTERVAL_SECS", "0"),
        ]))
        .unwrap();

        assert_eq!(config.port, 3000);
        assert!(config.claude_api_key.is_none());
        assert_eq!(config.cache_sweep_interval_secs, 3_600);
    }

    #[test]
    fn test_invalid_base_url() {
        let err = ServerConfig::from_lookup(lookup_from(&[("SHEETS_BASE_URL", "docs.google.com")]))
            .unwrap_err();
        assert!(err.to_string().contains("SHEETS_BASE_URL"));

        let err = ServerConfig::from_lookup(lookup_from(&[(
            "ANTHROPIC_BASE_URL",
            "ftp://api.anthropic.com",
        )]))
        .unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }
}
