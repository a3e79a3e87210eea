//! Database abstraction traits
//!
//! This module defines the traits the worker depends on for reading
//! export data and recording export status. The worker only sees these
//! traits, so the state machine is testable without a live database.

use crate::domain::request::ChatLogExportOptions;
use crate::domain::status::ExportStatus;
use crate::domain::table::TabularDataset;
use crate::domain::Result;
use async_trait::async_trait;

/// Read access to the survey data behind an export
///
/// All queries scope strictly to the given user and survey; rows never
/// leak across surveys or users, and parameters are always bound, never
/// concatenated into query text.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetch the response rows of a survey
    ///
    /// Ordered by (user id, timestamp, question reference).
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable or the query fails.
    async fn fetch_responses(&self, user: &str, survey: &str) -> Result<TabularDataset>;

    /// Fetch the form metadata for every version of a survey
    ///
    /// Ordered by (shortcode, creation timestamp); the version number is
    /// assigned per shortcode by recency of creation.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable or the query fails.
    async fn fetch_form_data(&self, user: &str, survey: &str) -> Result<TabularDataset>;

    /// Fetch the chat log of a survey
    ///
    /// Optional columns are appended only when the corresponding option is
    /// set. Rows are distinct and ordered by (user id, timestamp).
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable or the query fails.
    async fn fetch_chat_log(
        &self,
        user: &str,
        survey: &str,
        options: &ChatLogExportOptions,
    ) -> Result<TabularDataset>;
}

/// Write access to the export status row
///
/// The row for an export is created by an upstream collaborator before the
/// worker ever sees the request; this trait only updates it.
#[async_trait]
pub trait StatusStore: Send + Sync {
    /// Update the status row matching `export_id`
    ///
    /// Never inserts. Each call commits immediately, so a crash
    /// mid-pipeline leaves the last written status visible to pollers.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails or no row matches, which is a
    /// collaborator contract violation and fatal for the request.
    async fn mark(
        &self,
        export_id: &str,
        status: ExportStatus,
        link: Option<&str>,
    ) -> Result<()>;
}
