//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Porter configuration file.

use crate::config::{load_config, StorageBackend};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config parses, applies overrides and validates
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Kafka Brokers: {}", config.kafka.brokers);
        println!("  Topic: {}", config.kafka.topic);
        println!("  Group ID: {}", config.kafka.group_id);
        println!(
            "  Database: {}",
            config
                .database
                .connection_string
                .split('@')
                .next_back()
                .unwrap_or("***")
        );

        match config.storage.backend {
            StorageBackend::Local => {
                println!("  Storage Backend: local (development)");
            }
            StorageBackend::S3 => {
                println!("  Storage Backend: s3");
                if let Some(ref s3) = config.storage.s3 {
                    println!("  S3 Bucket: {}", s3.bucket);
                    println!("  S3 Host: {}", s3.host);
                }
            }
            StorageBackend::Gcs => {
                println!("  Storage Backend: gcs");
                if let Some(ref gcs) = config.storage.gcs {
                    println!("  GCS Bucket: {}", gcs.bucket);
                    println!("  GCS Endpoint: {}", gcs.endpoint);
                }
            }
        }
        println!("  Link Expiry: {} hours", config.storage.link_expiry_hours);

        Ok(0)
    }
}
