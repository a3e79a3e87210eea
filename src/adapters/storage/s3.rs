//! S3-compatible object-store backend
//!
//! Uploads the serialized artifact and issues a time-bounded presigned
//! link. Works against AWS S3 and S3-compatible stores such as MinIO via
//! the configured endpoint.

use crate::adapters::storage::traits::ArtifactSink;
use crate::config::S3Config;
use crate::domain::table::TabularDataset;
use crate::domain::{Result, StorageError};
use async_trait::async_trait;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use secrecy::ExposeSecret;
use std::time::Duration;

/// S3-compatible artifact sink
pub struct S3Backend {
    client: Client,
    bucket: String,
    file_path: String,
    link_expiry: Duration,
}

impl S3Backend {
    /// Create a sink for the given artifact path
    pub fn new(config: &S3Config, link_expiry_hours: u64, file_path: impl Into<String>) -> Self {
        let credentials = Credentials::new(
            config.access_key.expose_secret().as_ref(),
            config.secret_key.expose_secret().as_ref(),
            None,
            None,
            "porter-storage",
        );

        let s3_config = aws_sdk_s3::Config::builder()
            .credentials_provider(credentials)
            .region(Region::new(config.region.clone()))
            .endpoint_url(config.endpoint_url())
            .force_path_style(true)
            .build();

        Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
            file_path: file_path.into(),
            link_expiry: Duration::from_secs(link_expiry_hours * 3600),
        }
    }

    /// Build a sink from an already-configured client
    ///
    /// Used by the GCS backend, which differs only in endpoint and
    /// credential sourcing.
    pub(crate) fn from_client(
        client: Client,
        bucket: String,
        link_expiry_hours: u64,
        file_path: String,
    ) -> Self {
        Self {
            client,
            bucket,
            file_path,
            link_expiry: Duration::from_secs(link_expiry_hours * 3600),
        }
    }

    async fn ensure_bucket(&self) -> Result<()> {
        let exists = self
            .client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .is_ok();
        if exists {
            return Ok(());
        }

        match self.client.create_bucket().bucket(&self.bucket).send().await {
            Ok(_) => {
                tracing::info!(bucket = %self.bucket, "Created bucket");
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                // Another writer may have created it between head and create
                if message.contains("BucketAlreadyOwnedByYou")
                    || message.contains("BucketAlreadyExists")
                {
                    Ok(())
                } else {
                    Err(StorageError::BucketCreationFailed {
                        bucket: self.bucket.clone(),
                        message,
                    }
                    .into())
                }
            }
        }
    }
}

#[async_trait]
impl ArtifactSink for S3Backend {
    async fn save(&self, table: &TabularDataset) -> Result<()> {
        self.ensure_bucket().await?;

        let csv = table.to_csv()?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&self.file_path)
            .content_type("text/csv")
            .body(ByteStream::from(csv.into_bytes()))
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed {
                key: self.file_path.clone(),
                message: e.to_string(),
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %self.file_path,
            rows = table.num_rows(),
            "Artifact uploaded"
        );
        Ok(())
    }

    async fn link(&self) -> Result<String> {
        let presigning_config =
            PresigningConfig::expires_in(self.link_expiry).map_err(|e| StorageError::LinkFailed {
                key: self.file_path.clone(),
                message: e.to_string(),
            })?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&self.file_path)
            .presigned(presigning_config)
            .await
            .map_err(|e| StorageError::LinkFailed {
                key: self.file_path.clone(),
                message: e.to_string(),
            })?;

        Ok(presigned.uri().to_string())
    }
}
