//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `ROCKETSHOES_API_URL` - Base URL of the catalog/stock API (default: `http://localhost:3333`)
//! - `ROCKETSHOES_STORAGE_DIR` - Directory for the file-backed cart storage (default: `.rocketshoes`)
//! - `ROCKETSHOES_LOCALE` - Notification language, `pt-BR` or `en` (default: `pt-BR`)
//! - `ROCKETSHOES_HTTP_TIMEOUT_SECS` - Per-request timeout in seconds (default: 10)
//! - `ROCKETSHOES_CATALOG_CACHE_TTL_SECS` - Product cache TTL in seconds, 0 disables (default: 300)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::notify::Locale;

const DEFAULT_API_URL: &str = "http://localhost:3333";
const DEFAULT_STORAGE_DIR: &str = ".rocketshoes";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CATALOG_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart application configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Catalog/stock API configuration
    pub api: ApiConfig,
    /// Directory holding the persisted cart
    pub storage_dir: PathBuf,
    /// Language used for user-facing notifications
    pub locale: Locale,
}

/// Catalog/stock API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL; endpoints are `{base}/products/{id}` and `{base}/stock/{id}`
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
    /// How long product records stay cached (zero disables the cache)
    pub catalog_cache_ttl: Duration,
}

impl ApiConfig {
    /// API configuration with default timeout and cache settings.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            catalog_cache_ttl: Duration::from_secs(DEFAULT_CATALOG_CACHE_TTL_SECS),
        }
    }

    fn from_vars(vars: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = parse_base_url(
            "ROCKETSHOES_API_URL",
            &get_or_default(vars, "ROCKETSHOES_API_URL", DEFAULT_API_URL),
        )?;
        let timeout = get_secs(vars, "ROCKETSHOES_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?;
        if timeout.is_zero() {
            return Err(ConfigError::InvalidEnvVar(
                "ROCKETSHOES_HTTP_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        let catalog_cache_ttl = get_secs(
            vars,
            "ROCKETSHOES_CATALOG_CACHE_TTL_SECS",
            DEFAULT_CATALOG_CACHE_TTL_SECS,
        )?;

        Ok(Self {
            base_url,
            timeout,
            catalog_cache_ttl,
        })
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_vars(&|key: &str| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    fn from_vars(vars: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api = ApiConfig::from_vars(vars)?;
        let storage_dir = PathBuf::from(get_or_default(
            vars,
            "ROCKETSHOES_STORAGE_DIR",
            DEFAULT_STORAGE_DIR,
        ));
        let locale = match vars("ROCKETSHOES_LOCALE") {
            Some(value) => value.parse::<Locale>().map_err(|e| {
                ConfigError::InvalidEnvVar("ROCKETSHOES_LOCALE".to_string(), e.to_string())
            })?,
            None => Locale::default(),
        };

        Ok(Self {
            api,
            storage_dir,
            locale,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a variable with a default value.
fn get_or_default(vars: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    vars(key).unwrap_or_else(|| default.to_string())
}

/// Get a whole number of seconds.
fn get_secs(
    vars: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> Result<Duration, ConfigError> {
    vars(key).map_or(Ok(Duration::from_secs(default)), |value| {
        value
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Parse and validate an API base URL.
fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<CartConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        CartConfig::from_vars(&|key: &str| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.api.base_url.as_str(), "http://localhost:3333/");
        assert_eq!(config.api.timeout, Duration::from_secs(10));
        assert_eq!(config.api.catalog_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.storage_dir, PathBuf::from(".rocketshoes"));
        assert_eq!(config.locale, Locale::PtBr);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("ROCKETSHOES_API_URL", "https://shop.example.com/api/"),
            ("ROCKETSHOES_STORAGE_DIR", "/tmp/cart"),
            ("ROCKETSHOES_LOCALE", "en"),
            ("ROCKETSHOES_HTTP_TIMEOUT_SECS", "3"),
            ("ROCKETSHOES_CATALOG_CACHE_TTL_SECS", "0"),
        ])
        .unwrap();
        assert_eq!(config.api.base_url.as_str(), "https://shop.example.com/api/");
        assert_eq!(config.api.timeout, Duration::from_secs(3));
        assert!(config.api.catalog_cache_ttl.is_zero());
        assert_eq!(config.storage_dir, PathBuf::from("/tmp/cart"));
        assert_eq!(config.locale, Locale::En);
    }

    #[test]
    fn test_invalid_url() {
        let err = load(&[("ROCKETSHOES_API_URL", "not a url")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnvVar(ref key, _) if key == "ROCKETSHOES_API_URL"
        ));
    }

    #[test]
    fn test_unsupported_scheme() {
        let err = load(&[("ROCKETSHOES_API_URL", "ftp://example.com")]).unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[test]
    fn test_invalid_timeout() {
        assert!(load(&[("ROCKETSHOES_HTTP_TIMEOUT_SECS", "soon")]).is_err());
        assert!(load(&[("ROCKETSHOES_HTTP_TIMEOUT_SECS", "0")]).is_err());
    }

    #[test]
    fn test_invalid_locale() {
        let err = load(&[("ROCKETSHOES_LOCALE", "fr")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnvVar(ref key, _) if key == "ROCKETSHOES_LOCALE"
        ));
    }
}
