//! Configuration schema types
//!
//! This module defines the configuration structure for Porter. The struct
//! is built once at process start, validated, and passed down immutably;
//! nothing reads the environment after the consumption loop starts.

use crate::config::SecretString;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

/// Object storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Development backend: logs the artifact and returns a placeholder link
    #[default]
    Local,
    /// S3-compatible object store (AWS S3, MinIO, ...)
    S3,
    /// Google Cloud Storage via the S3-interoperability endpoint
    Gcs,
}

/// Main Porter configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PorterConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Message bus consumer configuration
    pub kafka: KafkaConfig,

    /// Relational store configuration
    pub database: DatabaseConfig,

    /// Object storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PorterConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.kafka.validate()?;
        self.database.validate()?;
        self.storage.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Message bus consumer configuration
///
/// The consumer group subscribes to exactly one topic; offsets are
/// committed manually after each message is fully processed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KafkaConfig {
    /// Broker bootstrap list, comma separated
    pub brokers: String,

    /// Topic carrying export requests
    #[serde(default = "default_topic")]
    pub topic: String,

    /// Consumer group identifier
    #[serde(default = "default_group_id")]
    pub group_id: String,

    /// How long one poll waits for a message before checking for shutdown
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,

    /// Max processing time per message before the group evicts the consumer
    #[serde(default = "default_max_poll_interval_ms")]
    pub max_poll_interval_ms: u64,

    /// Heartbeat session timeout
    #[serde(default = "default_session_timeout_ms")]
    pub session_timeout_ms: u64,

    /// Whether a message whose export failed is still committed
    ///
    /// `true` records Failed and moves on; `false` leaves the offset
    /// uncommitted so the host redelivers the message.
    #[serde(default = "default_commit_failed_messages")]
    pub commit_failed_messages: bool,
}

impl KafkaConfig {
    fn validate(&self) -> Result<(), String> {
        if self.brokers.trim().is_empty() {
            return Err("kafka.brokers must not be empty".to_string());
        }
        if self.topic.trim().is_empty() {
            return Err("kafka.topic must not be empty".to_string());
        }
        if self.group_id.trim().is_empty() {
            return Err("kafka.group_id must not be empty".to_string());
        }
        if self.max_poll_interval_ms < self.session_timeout_ms {
            return Err(
                "kafka.max_poll_interval_ms must be >= kafka.session_timeout_ms".to_string(),
            );
        }
        Ok(())
    }
}

/// Relational store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string
    pub connection_string: String,

    /// Connection pool size
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    /// Timeout for acquiring a pooled connection, in seconds
    #[serde(default = "default_connection_timeout_seconds")]
    pub connection_timeout_seconds: u64,

    /// Per-statement timeout, in seconds
    #[serde(default = "default_statement_timeout_seconds")]
    pub statement_timeout_seconds: u64,
}

impl DatabaseConfig {
    fn validate(&self) -> Result<(), String> {
        if self.connection_string.trim().is_empty() {
            return Err("database.connection_string must not be empty".to_string());
        }
        if !self.connection_string.starts_with("postgres://")
            && !self.connection_string.starts_with("postgresql://")
        {
            return Err(
                "database.connection_string must be a postgres:// or postgresql:// URL"
                    .to_string(),
            );
        }
        if self.max_connections == 0 {
            return Err("database.max_connections must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Object storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Which backend persists artifacts
    #[serde(default)]
    pub backend: StorageBackend,

    /// Validity of generated artifact links, in hours
    #[serde(default = "default_link_expiry_hours")]
    pub link_expiry_hours: u64,

    /// S3 backend settings (required if backend = s3)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3: Option<S3Config>,

    /// GCS backend settings (required if backend = gcs)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gcs: Option<GcsConfig>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            link_expiry_hours: default_link_expiry_hours(),
            s3: None,
            gcs: None,
        }
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<(), String> {
        if self.link_expiry_hours == 0 {
            return Err("storage.link_expiry_hours must be at least 1".to_string());
        }
        // Both backend sections may be present; only the selected one is validated
        match self.backend {
            StorageBackend::Local => Ok(()),
            StorageBackend::S3 => match &self.s3 {
                Some(s3) => s3.validate(),
                None => Err("storage.s3 configuration is required when backend = 's3'".to_string()),
            },
            StorageBackend::Gcs => match &self.gcs {
                Some(gcs) => gcs.validate(),
                None => {
                    Err("storage.gcs configuration is required when backend = 'gcs'".to_string())
                }
            },
        }
    }
}

/// S3-compatible backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    /// Target bucket; created on first save when absent
    pub bucket: String,

    /// Endpoint host, e.g. `s3.amazonaws.com` or `minio:9000`
    pub host: String,

    /// Access key id
    pub access_key: SecretString,

    /// Secret access key
    pub secret_key: SecretString,

    /// Whether to address the endpoint over TLS
    #[serde(default = "default_true")]
    pub ssl_enabled: bool,

    /// Region passed to the SDK; S3-compatible stores ignore it
    #[serde(default = "default_region")]
    pub region: String,
}

impl S3Config {
    fn validate(&self) -> Result<(), String> {
        if self.bucket.trim().is_empty() {
            return Err("storage.s3.bucket must not be empty".to_string());
        }
        if self.host.trim().is_empty() {
            return Err("storage.s3.host must not be empty".to_string());
        }
        if self.access_key.expose_secret().is_empty() {
            return Err("storage.s3.access_key must not be empty".to_string());
        }
        if self.secret_key.expose_secret().is_empty() {
            return Err("storage.s3.secret_key must not be empty".to_string());
        }
        Ok(())
    }

    /// Endpoint URL derived from host and TLS setting
    pub fn endpoint_url(&self) -> String {
        let scheme = if self.ssl_enabled { "https" } else { "http" };
        format!("{}://{}", scheme, self.host)
    }
}

/// Google Cloud Storage backend settings
///
/// Addressed through the S3-interoperability endpoint with HMAC keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GcsConfig {
    /// Target bucket
    pub bucket: String,

    /// Interoperability endpoint
    #[serde(default = "default_gcs_endpoint")]
    pub endpoint: String,

    /// HMAC access id
    pub access_key: SecretString,

    /// HMAC secret
    pub secret_key: SecretString,
}

impl GcsConfig {
    fn validate(&self) -> Result<(), String> {
        if self.bucket.trim().is_empty() {
            return Err("storage.gcs.bucket must not be empty".to_string());
        }
        if self.endpoint.trim().is_empty() {
            return Err("storage.gcs.endpoint must not be empty".to_string());
        }
        if self.access_key.expose_secret().is_empty() {
            return Err("storage.gcs.access_key must not be empty".to_string());
        }
        if self.secret_key.expose_secret().is_empty() {
            return Err("storage.gcs.secret_key must not be empty".to_string());
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Whether to write JSON logs to rotating local files
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory receiving log files
    #[serde(default = "default_log_path")]
    pub local_path: String,

    /// Rotation policy: daily or hourly
    #[serde(default = "default_rotation")]
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_log_path(),
            local_rotation: default_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        if !["daily", "hourly"].contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be 'daily' or 'hourly'",
                self.local_rotation
            ));
        }
        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_topic() -> String {
    "exports".to_string()
}

fn default_group_id() -> String {
    "exporter".to_string()
}

fn default_poll_timeout_ms() -> u64 {
    1000
}

fn default_max_poll_interval_ms() -> u64 {
    // 10min processing time max
    600_000
}

fn default_session_timeout_ms() -> u64 {
    // 30s heartbeat
    30_000
}

fn default_commit_failed_messages() -> bool {
    true
}

fn default_max_connections() -> usize {
    4
}

fn default_connection_timeout_seconds() -> u64 {
    30
}

fn default_statement_timeout_seconds() -> u64 {
    300
}

fn default_link_expiry_hours() -> u64 {
    7
}

fn default_true() -> bool {
    true
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_gcs_endpoint() -> String {
    "https://storage.googleapis.com".to_string()
}

fn default_log_path() -> String {
    "logs".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret::secret_string;

    fn base_config() -> PorterConfig {
        PorterConfig {
            application: ApplicationConfig::default(),
            kafka: KafkaConfig {
                brokers: "localhost:9092".to_string(),
                topic: default_topic(),
                group_id: default_group_id(),
                poll_timeout_ms: default_poll_timeout_ms(),
                max_poll_interval_ms: default_max_poll_interval_ms(),
                session_timeout_ms: default_session_timeout_ms(),
                commit_failed_messages: true,
            },
            database: DatabaseConfig {
                connection_string: "postgres://porter@localhost/surveys".to_string(),
                max_connections: default_max_connections(),
                connection_timeout_seconds: default_connection_timeout_seconds(),
                statement_timeout_seconds: default_statement_timeout_seconds(),
            },
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut config = base_config();
        config.application.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_brokers_rejected() {
        let mut config = base_config();
        config.kafka.brokers = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_postgres_connection_string_rejected() {
        let mut config = base_config();
        config.database.connection_string = "mysql://nope".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_s3_backend_requires_section() {
        let mut config = base_config();
        config.storage.backend = StorageBackend::S3;
        assert!(config.validate().is_err());

        config.storage.s3 = Some(S3Config {
            bucket: "exports".to_string(),
            host: "minio:9000".to_string(),
            access_key: secret_string("ak".to_string()),
            secret_key: secret_string("sk".to_string()),
            ssl_enabled: false,
            region: default_region(),
        });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_gcs_backend_requires_section() {
        let mut config = base_config();
        config.storage.backend = StorageBackend::Gcs;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_s3_endpoint_url_scheme() {
        let s3 = S3Config {
            bucket: "exports".to_string(),
            host: "minio:9000".to_string(),
            access_key: secret_string("ak".to_string()),
            secret_key: secret_string("sk".to_string()),
            ssl_enabled: false,
            region: default_region(),
        };
        assert_eq!(s3.endpoint_url(), "http://minio:9000");
    }
}
