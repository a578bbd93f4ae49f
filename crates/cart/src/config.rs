//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ROCKETSHOES_API_URL` - Base URL of the catalog/stock API
//!
//! ## Optional
//! - `ROCKETSHOES_CART_FILE` - File backing the persistent store (default: rocketshoes-cart.json)
//! - `ROCKETSHOES_STORAGE_KEY` - Key the cart is stored under (default: @RocketShoes:cart)
//! - `ROCKETSHOES_CATALOG_CACHE_SECS` - Product record cache TTL in seconds (default: 300, max: 30 days)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::storage::DEFAULT_CART_KEY;

const DEFAULT_CART_FILE: &str = "rocketshoes-cart.json";
const DEFAULT_CATALOG_CACHE_SECS: &str = "300";
const MAX_CATALOG_CACHE_SECS: u64 = 30 * 24 * 60 * 60;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Base URL of the catalog/stock API
    pub api_url: Url,
    /// File backing the persistent store
    pub cart_file: PathBuf,
    /// Storage key holding the serialized cart
    pub storage_key: String,
    /// How long product records are served from cache
    pub catalog_cache_ttl: Duration,
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup("ROCKETSHOES_API_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("ROCKETSHOES_API_URL".to_string()))?;
        let api_url = Url::parse(&api_url).map_err(|e| {
            ConfigError::InvalidEnvVar("ROCKETSHOES_API_URL".to_string(), e.to_string())
        })?;
        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                "ROCKETSHOES_API_URL".to_string(),
                format!("unsupported scheme {}", api_url.scheme()),
            ));
        }

        let cart_file = PathBuf::from(
            lookup("ROCKETSHOES_CART_FILE").unwrap_or_else(|| DEFAULT_CART_FILE.to_string()),
        );

        let storage_key =
            lookup("ROCKETSHOES_STORAGE_KEY").unwrap_or_else(|| DEFAULT_CART_KEY.to_string());
        if storage_key.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "ROCKETSHOES_STORAGE_KEY".to_string(),
                "must not be empty".to_string(),
            ));
        }

        let cache_secs = lookup("ROCKETSHOES_CATALOG_CACHE_SECS")
            .unwrap_or_else(|| DEFAULT_CATALOG_CACHE_SECS.to_string())
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar(
                    "ROCKETSHOES_CATALOG_CACHE_SECS".to_string(),
                    e.to_string(),
                )
            })?;
        if cache_secs > MAX_CATALOG_CACHE_SECS {
            return Err(ConfigError::InvalidEnvVar(
                "ROCKETSHOES_CATALOG_CACHE_SECS".to_string(),
                format!("must be at most {MAX_CATALOG_CACHE_SECS}"),
            ));
        }

        Ok(Self {
            api_url,
            cart_file,
            storage_key,
            catalog_cache_ttl: Duration::from_secs(cache_secs),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            CartConfig::from_lookup(lookup_from(&[("ROCKETSHOES_API_URL", "http://localhost:3333")]))
                .unwrap();

        assert_eq!(config.api_url.as_str(), "http://localhost:3333/");
        assert_eq!(config.cart_file, PathBuf::from("rocketshoes-cart.json"));
        assert_eq!(config.storage_key, "@RocketShoes:cart");
        assert_eq!(config.catalog_cache_ttl, Duration::from_secs(300));
    }

    #[test]
    fn test_overrides() {
        let config = CartConfig::from_lookup(lookup_from(&[
            ("ROCKETSHOES_API_URL", "https://api.rocketshoes.test"),
            ("ROCKETSHOES_CART_FILE", "/tmp/cart.json"),
            ("ROCKETSHOES_STORAGE_KEY", "@Test:cart"),
            ("ROCKETSHOES_CATALOG_CACHE_SECS", "0"),
        ]))
        .unwrap();

        assert_eq!(config.cart_file, PathBuf::from("/tmp/cart.json"));
        assert_eq!(config.storage_key, "@Test:cart");
        assert_eq!(config.catalog_cache_ttl, Duration::ZERO);
    }

    #[test]
    fn test_missing_api_url() {
        let err = CartConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "ROCKETSHOES_API_URL"));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            CartConfig::from_lookup(lookup_from(&[("ROCKETSHOES_API_URL", "not a url")])),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(matches!(
            CartConfig::from_lookup(lookup_from(&[("ROCKETSHOES_API_URL", "ftp://files.test")])),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(matches!(
            CartConfig::from_lookup(lookup_from(&[
                ("ROCKETSHOES_API_URL", "http://localhost:3333"),
                ("ROCKETSHOES_CATALOG_CACHE_SECS", "five"),
            ])),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(matches!(
            CartConfig::from_lookup(lookup_from(&[
                ("ROCKETSHOES_API_URL", "http://localhost:3333"),
                ("ROCKETSHOES_CATALOG_CACHE_SECS", "99999999999"),
            ])),
            Err(ConfigError::InvalidEnvVar(ref key, _)) if key == "ROCKETSHOES_CATALOG_CACHE_SECS"
        ));
        assert!(matches!(
            CartConfig::from_lookup(lookup_from(&[
                ("ROCKETSHOES_API_URL", "http://localhost:3333"),
                ("ROCKETSHOES_STORAGE_KEY", "  "),
            ])),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_longest_cache_ttl_builds_client() {
        let config = CartConfig::from_lookup(lookup_from(&[
            ("ROCKETSHOES_API_URL", "http://localhost:3333"),
            ("ROCKETSHOES_CATALOG_CACHE_SECS", "2592000"),
        ]))
        .unwrap();

        assert_eq!(config.catalog_cache_ttl, Duration::from_secs(2_592_000));
        let client = crate::ApiClient::from_config(&config);
        assert_eq!(client.base_url().as_str(), "http://localhost:3333/");
    }

    #[test]
    fn test_error_display() {
        let err = ConfigError::MissingEnvVar("ROCKETSHOES_API_URL".to_string());
        assert_eq!(
            err.to_string(),
            "Missing environment variable: ROCKETSHOES_API_URL"
        );
    }
}
