//! Local development backend
//!
//! Logs the rendered artifact instead of persisting it. Used when no
//! object store is configured.

use crate::adapters::storage::traits::ArtifactSink;
use crate::domain::table::TabularDataset;
use crate::domain::Result;
use async_trait::async_trait;

/// Development backend: prints and discards
pub struct LocalBackend {
    file_path: String,
}

impl LocalBackend {
    /// Create a local backend for the given artifact path
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }
}

#[async_trait]
impl ArtifactSink for LocalBackend {
    async fn save(&self, table: &TabularDataset) -> Result<()> {
        let csv = table.to_csv()?;
        tracing::info!(
            file_path = %self.file_path,
            rows = table.num_rows(),
            "Local backend only prints:\n{}",
            csv
        );
        Ok(())
    }

    async fn link(&self) -> Result<String> {
        Ok(format!("local://{}", self.file_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_backend_saves_and_links() {
        let backend = LocalBackend::new("exports/demo.csv");
        let table = TabularDataset::new(vec!["userid".to_string()]);

        backend.save(&table).await.unwrap();
        assert_eq!(backend.link().await.unwrap(), "local://exports/demo.csv");
    }
}
