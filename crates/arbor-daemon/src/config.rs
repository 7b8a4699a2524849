//! Configuration for arbor-daemon

use arbor_resolver::{CacheConfig, PersistedDocumentsConfig};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Main daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Persisted-document resolution configuration
    #[serde(default)]
    pub persisted_documents: PersistedDocumentsSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DaemonConfig {
    /// Load configuration from an optional TOML file merged with
    /// `ARBOR_`-prefixed environment variables
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        }
        builder = builder.add_source(config::Environment::with_prefix("ARBOR").separator("__"));
        builder.build()?.try_deserialize()
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    pub listen_addr: SocketAddr,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            enable_cors: true,
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    ([127, 0, 0, 1], 8080).into()
}

/// Persisted-document resolution settings; see
/// [`PersistedDocumentsConfig`] for semantics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedDocumentsSettings {
    /// CDN base URL
    #[serde(default)]
    pub endpoint: String,

    /// CDN access credential
    #[serde(default)]
    pub access_key: String,

    /// When false or unset, resolution is fully bypassed
    #[serde(default)]
    pub enabled: bool,

    /// Per-fetch timeout in seconds
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,

    /// Maximum cache entry count
    #[serde(default = "default_cache_entries")]
    pub cache_max_entries: usize,

    /// TTL for resolved documents, in seconds
    #[serde(default = "default_positive_ttl")]
    pub cache_positive_ttl_secs: u64,

    /// TTL for not-found results, in seconds
    #[serde(default = "default_negative_ttl")]
    pub cache_negative_ttl_secs: u64,
}

impl Default for PersistedDocumentsSettings {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            access_key: String::new(),
            enabled: false,
            timeout_secs: default_fetch_timeout(),
            cache_max_entries: default_cache_entries(),
            cache_positive_ttl_secs: default_positive_ttl(),
            cache_negative_ttl_secs: default_negative_ttl(),
        }
    }
}

impl From<PersistedDocumentsSettings> for PersistedDocumentsConfig {
    fn from(settings: PersistedDocumentsSettings) -> Self {
        PersistedDocumentsConfig {
            endpoint: settings.endpoint,
            access_key: settings.access_key,
            enabled: settings.enabled,
            timeout: Duration::from_secs(settings.timeout_secs),
            cache: CacheConfig {
                max_entries: settings.cache_max_entries,
                positive_ttl: Duration::from_secs(settings.cache_positive_ttl_secs),
                negative_ttl: Duration::from_secs(settings.cache_negative_ttl_secs),
            },
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON-formatted logs
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_fetch_timeout() -> u64 {
    10
}

fn default_cache_entries() -> usize {
    1000
}

fn default_positive_ttl() -> u64 {
    15 * 60
}

fn default_negative_ttl() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_disable_persisted_documents() {
        let config = DaemonConfig::default();
        assert!(!config.persisted_documents.enabled);
        assert_eq!(config.server.listen_addr.port(), 8080);
    }

    #[test]
    fn test_settings_convert_to_resolver_config() {
        let settings = PersistedDocumentsSettings {
            endpoint: "http://cdn.local".into(),
            access_key: "foo".into(),
            enabled: true,
            timeout_secs: 5,
            ..PersistedDocumentsSettings::default()
        };
        let config: PersistedDocumentsConfig = settings.into();
        assert!(config.enabled);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.cache.negative_ttl, Duration::from_secs(30));
    }
}
