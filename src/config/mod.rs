//! Configuration management for Porter.
//!
//! This module provides TOML-based configuration loading, parsing, and
//! validation. The configuration is loaded once at process start, before
//! the consumption loop, and is immutable afterwards.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use porter::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("porter.toml")?;
//!
//! println!("Topic: {}", config.kafka.topic);
//! println!("Backend: {:?}", config.storage.backend);
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [kafka]
//! brokers = "kafka:9092"
//! topic = "exports"
//! group_id = "exporter"
//!
//! [database]
//! connection_string = "${DATABASE_URL}"
//!
//! [storage]
//! backend = "s3"
//!
//! [storage.s3]
//! bucket = "survey-exports"
//! host = "minio:9000"
//! access_key = "${S3_ACCESS_KEY}"
//! secret_key = "${S3_SECRET_KEY}"
//! ssl_enabled = false
//! ```
//!
//! # Environment Variables
//!
//! `${VAR_NAME}` placeholders are substituted at load time, and
//! `PORTER_<SECTION>_<KEY>` variables override parsed values (the bare
//! `DATABASE_URL` is honored for the connection string).

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, DatabaseConfig, GcsConfig, KafkaConfig, LoggingConfig, PorterConfig,
    S3Config, StorageBackend, StorageConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
