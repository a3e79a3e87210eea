//! Artifact sink abstraction
//!
//! A sink persists one export's tabular artifact and produces a
//! retrievable link for it. Saving and status recording are not
//! transactional: an artifact can exist even if the status update that
//! follows it fails.

use crate::domain::table::TabularDataset;
use crate::domain::Result;
use async_trait::async_trait;

/// Destination for one export artifact
///
/// A sink is constructed per request with the artifact path already
/// resolved, so redelivery of the same request writes to the same path.
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Persist the serialized table at this sink's path
    ///
    /// # Errors
    ///
    /// Returns a storage error if the upload fails; a partial object may
    /// remain, and no cleanup is guaranteed.
    async fn save(&self, table: &TabularDataset) -> Result<()>;

    /// Produce a retrievable link for the saved artifact
    ///
    /// # Errors
    ///
    /// Returns a storage error if the link cannot be generated.
    async fn link(&self) -> Result<String>;
}
