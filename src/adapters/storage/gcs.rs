//! Google Cloud Storage backend
//!
//! Addresses GCS through its S3-interoperability endpoint with HMAC
//! credentials, reusing the S3 sink for the save/link mechanics.

use crate::adapters::storage::s3::S3Backend;
use crate::adapters::storage::traits::ArtifactSink;
use crate::config::GcsConfig;
use crate::domain::table::TabularDataset;
use crate::domain::Result;
use async_trait::async_trait;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::Client;
use secrecy::ExposeSecret;

/// GCS artifact sink over the interoperability API
pub struct GcsBackend {
    inner: S3Backend,
}

impl GcsBackend {
    /// Create a sink for the given artifact path
    pub fn new(config: &GcsConfig, link_expiry_hours: u64, file_path: impl Into<String>) -> Self {
        let credentials = Credentials::new(
            config.access_key.expose_secret().as_ref(),
            config.secret_key.expose_secret().as_ref(),
            None,
            None,
            "porter-storage",
        );

        // The interop endpoint speaks the S3 XML API; region is ignored
        let s3_config = aws_sdk_s3::Config::builder()
            .credentials_provider(credentials)
            .region(Region::new("auto"))
            .endpoint_url(config.endpoint.clone())
            .force_path_style(true)
            .build();

        Self {
            inner: S3Backend::from_client(
                Client::from_conf(s3_config),
                config.bucket.clone(),
                link_expiry_hours,
                file_path.into(),
            ),
        }
    }
}

#[async_trait]
impl ArtifactSink for GcsBackend {
    async fn save(&self, table: &TabularDataset) -> Result<()> {
        self.inner.save(table).await
    }

    async fn link(&self) -> Result<String> {
        self.inner.link().await
    }
}
