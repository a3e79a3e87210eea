//! PostgreSQL status store
//!
//! Updates the `export_status` row of one export. The row is created by an
//! upstream collaborator when the export is requested; this adapter only
//! ever updates it.

use crate::adapters::database::client::PostgresClient;
use crate::adapters::database::traits::StatusStore;
use crate::domain::status::ExportStatus;
use crate::domain::{PorterError, Result};
use async_trait::async_trait;
use std::sync::Arc;

const UPDATE_STATUS: &str = "
    UPDATE export_status
    SET status = $1,
        export_link = $2
    WHERE id = $3
";

/// PostgreSQL-backed status store
pub struct PostgresStatusStore {
    client: Arc<PostgresClient>,
}

impl PostgresStatusStore {
    /// Create a new status store over a pooled client
    pub fn new(client: Arc<PostgresClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StatusStore for PostgresStatusStore {
    async fn mark(
        &self,
        export_id: &str,
        status: ExportStatus,
        link: Option<&str>,
    ) -> Result<()> {
        let affected = self
            .client
            .execute(UPDATE_STATUS, &[&status.as_str(), &link, &export_id])
            .await
            .map_err(|e| PorterError::Status(e.to_string()))?;

        // The row must have been pre-created by the requester; updating
        // nothing means the contract was violated.
        if affected == 0 {
            return Err(PorterError::Status(format!(
                "no export_status row exists for export '{export_id}'"
            )));
        }

        tracing::debug!(
            export_id = %export_id,
            status = %status,
            "Export status updated"
        );
        Ok(())
    }
}
