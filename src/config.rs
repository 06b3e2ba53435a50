//! Service configuration
//!
//! Loaded once at startup from a JSON file and shared read-only from then
//! on. Only `api_key` is mandatory:
//!
//! ```json
//! {
//!     "api_key": "change-me",
//!     "owner_id": "owner-1",
//!     "webhook_url": "https://hooks.example.com/cards",
//!     "webhook_secret": "hook-secret",
//!     "local_dir": "/tmp/temp_storage",
//!     "remote": { "kind": "directory", "root": "./remote_store" },
//!     "http": { "port": 5000 }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http_server::HttpServerConfig;
use crate::notify::Webhook;
use crate::store::DEFAULT_PREFIX;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {reason}")]
    Read { path: String, reason: String },

    #[error("Invalid config JSON: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Where the durable copy of each record lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RemoteConfig {
    /// A local directory laid out like a bucket
    Directory { root: PathBuf },
    /// An S3 bucket (requires the `s3` feature)
    S3 { bucket: String },
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig::Directory {
            root: PathBuf::from("./remote_store"),
        }
    }
}

/// Complete service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Listener settings
    #[serde(default)]
    pub http: HttpServerConfig,

    /// Shared secret expected in the `Authorization` header
    pub api_key: String,

    /// Customer id stamped on webhook messages
    #[serde(default)]
    pub owner_id: String,

    /// Webhook target; notifications are dropped when unset
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Secret stamped on webhook messages
    #[serde(default)]
    pub webhook_secret: String,

    /// Upper bound for mirror uploads and webhook calls
    #[serde(default = "default_async_timeout_secs")]
    pub async_timeout_secs: u64,

    /// Local record directory
    #[serde(default = "default_local_dir")]
    pub local_dir: PathBuf,

    /// Schema directory; the built-in schemas are used when unset
    #[serde(default)]
    pub schema_dir: Option<PathBuf>,

    #[serde(default)]
    pub remote: RemoteConfig,

    /// Namespace for remote objects
    #[serde(default = "default_remote_prefix")]
    pub remote_prefix: String,

    /// Image URL returned for every card
    #[serde(default = "default_card_image_url")]
    pub card_image_url: String,
}

fn default_async_timeout_secs() -> u64 {
    10
}
fn default_local_dir() -> PathBuf {
    PathBuf::from("/tmp/temp_storage")
}
fn default_remote_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}
fn default_card_image_url() -> String {
    "https://assets.example.com/cards/virtual_card.png".to_string()
}

impl ServiceConfig {
    /// Minimal configuration with every optional field at its default
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: HttpServerConfig::default(),
            api_key: api_key.into(),
            owner_id: String::new(),
            webhook_url: None,
            webhook_secret: String::new(),
            async_timeout_secs: default_async_timeout_secs(),
            local_dir: default_local_dir(),
            schema_dir: None,
            remote: RemoteConfig::default(),
            remote_prefix: default_remote_prefix(),
            card_image_url: default_card_image_url(),
        }
    }

    /// Load configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate configuration JSON
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: ServiceConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::Invalid("api_key must not be empty".into()));
        }

        if self.async_timeout_secs == 0 {
            return Err(ConfigError::Invalid("async_timeout_secs must be > 0".into()));
        }

        if let Some(url) = &self.webhook_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Invalid(format!(
                    "webhook_url must be an http(s) URL, got '{}'",
                    url
                )));
            }
        }

        if let RemoteConfig::S3 { bucket } = &self.remote {
            if bucket.is_empty() {
                return Err(ConfigError::Invalid("remote.bucket must not be empty".into()));
            }
            if !cfg!(feature = "s3") {
                return Err(ConfigError::Invalid(
                    "remote kind 's3' needs a build with the 's3' feature".into(),
                ));
            }
        }

        Ok(())
    }

    pub fn async_timeout(&self) -> Duration {
        Duration::from_secs(self.async_timeout_secs)
    }

    /// Webhook settings, if a URL is configured
    pub fn webhook(&self) -> Option<Webhook> {
        self.webhook_url.as_ref().map(|url| Webhook {
            url: url.clone(),
            owner_id: self.owner_id.clone(),
            secret: self.webhook_secret.clone(),
            timeout: self.async_timeout(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_minimal_config_defaults() {
        let config = ServiceConfig::from_json(r#"{"api_key": "k"}"#).unwrap();
        assert_eq!(config.async_timeout(), Duration::from_secs(10));
        assert_eq!(config.local_dir, PathBuf::from("/tmp/temp_storage"));
        assert_eq!(config.remote_prefix, "staging_cards");
        assert_eq!(config.remote, RemoteConfig::default());
        assert!(config.webhook().is_none());
        assert_eq!(config.http.port, 5000);
    }

    #[test]
    fn test_missing_api_key() {
        assert!(matches!(
            ServiceConfig::from_json("{}"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            ServiceConfig::from_json(r#"{"api_key": "  "}"#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = ServiceConfig::from_json(r#"{"api_key": "k", "async_timeout_secs": 0}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_webhook_from_config() {
        let config = ServiceConfig::from_json(
            r#"{
                "api_key": "k",
                "owner_id": "owner-1",
                "webhook_url": "https://hooks.test/cards",
                "webhook_secret": "s",
                "async_timeout_secs": 3
            }"#,
        )
        .unwrap();

        let webhook = config.webhook().unwrap();
        assert_eq!(webhook.url, "https://hooks.test/cards");
        assert_eq!(webhook.owner_id, "owner-1");
        assert_eq!(webhook.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_bad_webhook_url() {
        let result = ServiceConfig::from_json(r#"{"api_key": "k", "webhook_url": "hooks.test"}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_remote_kinds_parse() {
        let config = ServiceConfig::from_json(
            r#"{"api_key": "k", "remote": {"kind": "directory", "root": "/srv/bucket"}}"#,
        )
        .unwrap();
        assert_eq!(
            config.remote,
            RemoteConfig::Directory {
                root: PathBuf::from("/srv/bucket")
            }
        );

        let result = ServiceConfig::from_json(
            r#"{"api_key": "k", "remote": {"kind": "s3", "bucket": "cards"}}"#,
        );
        assert_eq!(result.is_ok(), cfg!(feature = "s3"));
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("cardstub.json");
        fs::write(&path, r#"{"api_key": "k"}"#).unwrap();
        assert_eq!(ServiceConfig::load(&path).unwrap().api_key, "k");

        let missing = ServiceConfig::load(&temp.path().join("absent.json"));
        assert!(matches!(missing, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_new_round_trips_through_json() {
        let config = ServiceConfig::new("k");
        let json = serde_json::to_string(&config).unwrap();
        let parsed = ServiceConfig::from_json(&json).unwrap();
        assert_eq!(parsed.api_key, "k");
        assert_eq!(parsed.card_image_url, config.card_image_url);
    }
}
