//! Artifact sink factory
//!
//! This module creates the configured storage backend for one export's
//! artifact path.

use crate::adapters::storage::gcs::GcsBackend;
use crate::adapters::storage::local::LocalBackend;
use crate::adapters::storage::s3::S3Backend;
use crate::adapters::storage::traits::ArtifactSink;
use crate::config::{StorageBackend, StorageConfig};
use crate::domain::{PorterError, Result};

/// Create an artifact sink for the given path based on configuration
///
/// # Arguments
///
/// * `config` - Storage configuration
/// * `file_path` - Backend-resolved artifact path, e.g. `exports/{survey}.csv`
///
/// # Errors
///
/// Returns a configuration error if the selected backend's section is
/// missing (already rejected at startup validation; kept here so the
/// factory stands alone).
pub fn create_artifact_sink(
    config: &StorageConfig,
    file_path: &str,
) -> Result<Box<dyn ArtifactSink>> {
    match config.backend {
        StorageBackend::Local => Ok(Box::new(LocalBackend::new(file_path))),
        StorageBackend::S3 => {
            let s3 = config.s3.as_ref().ok_or_else(|| {
                PorterError::Configuration(
                    "storage.s3 configuration is required when backend = 's3'".to_string(),
                )
            })?;
            Ok(Box::new(S3Backend::new(
                s3,
                config.link_expiry_hours,
                file_path,
            )))
        }
        StorageBackend::Gcs => {
            let gcs = config.gcs.as_ref().ok_or_else(|| {
                PorterError::Configuration(
                    "storage.gcs configuration is required when backend = 'gcs'".to_string(),
                )
            })?;
            Ok(Box::new(GcsBackend::new(
                gcs,
                config.link_expiry_hours,
                file_path,
            )))
        }
    }
}
