//! Export worker - the message-consumption loop and per-request state machine
//!
//! One request is fully processed (fetch, transform, save, status update,
//! acknowledge) before the next is pulled. The offset of a message is
//! committed only after its pipeline has completed, success or handled
//! failure, which gives at-least-once semantics: a crash before the commit
//! redelivers the request, and redelivery is safe because status updates
//! are idempotent overwrites and the artifact path is derived from the
//! request.

use crate::adapters::database::traits::{DataSource, StatusStore};
use crate::adapters::messaging::traits::{DeliveredMessage, MessageSource};
use crate::adapters::storage::create_artifact_sink;
use crate::config::{PorterConfig, StorageConfig};
use crate::core::pipeline::TransformPipeline;
use crate::domain::request::{ExportRequest, ExportSource};
use crate::domain::status::ExportStatus;
use crate::domain::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// The export pipeline worker
///
/// Owns the consumption loop and drives each request through
/// `Started → {Finished, Failed}`. A single request's failure never halts
/// consumption of subsequent requests.
pub struct ExportWorker {
    source: Box<dyn MessageSource>,
    data_source: Arc<dyn DataSource>,
    status_store: Arc<dyn StatusStore>,
    storage: StorageConfig,
    poll_timeout: Duration,
    commit_failed_messages: bool,
}

impl ExportWorker {
    /// Create a worker over its collaborators
    pub fn new(
        source: Box<dyn MessageSource>,
        data_source: Arc<dyn DataSource>,
        status_store: Arc<dyn StatusStore>,
        config: &PorterConfig,
    ) -> Self {
        Self {
            source,
            data_source,
            status_store,
            storage: config.storage.clone(),
            poll_timeout: Duration::from_millis(config.kafka.poll_timeout_ms),
            commit_failed_messages: config.kafka.commit_failed_messages,
        }
    }

    /// Run the consumption loop until the shutdown signal fires
    ///
    /// The poll is bounded so the loop can check for shutdown between
    /// messages; in-flight processing of one message always completes
    /// before shutdown does.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        tracing::info!("ready to start receiving messages");

        loop {
            if *shutdown.borrow() {
                break;
            }

            let message = tokio::select! {
                _ = shutdown.changed() => continue,
                polled = self.source.poll(self.poll_timeout) => match polled {
                    Ok(Some(message)) => message,
                    Ok(None) => continue,
                    Err(e) => {
                        tracing::error!(error = %e, "Consumer error");
                        continue;
                    }
                },
            };

            if self.handle_message(&message).await {
                if let Err(e) = self.source.commit(&message).await {
                    tracing::error!(
                        topic = %message.topic,
                        partition = message.partition,
                        offset = message.offset,
                        error = %e,
                        "Failed to commit message offset"
                    );
                }
            }
        }

        tracing::info!("shutdown signal received, stopping consumption");
        Ok(())
    }

    /// Handle one delivered message; returns whether to commit its offset
    ///
    /// A payload that cannot be parsed is dropped and committed - it will
    /// never parse on redelivery. A parsed request that fails is committed
    /// or left for redelivery per the failed-message commit policy.
    async fn handle_message(&self, message: &DeliveredMessage) -> bool {
        let request = match ExportRequest::from_payload(&message.payload) {
            Ok(request) => request,
            Err(e) => {
                tracing::error!(error = %e, "Error parsing export request, dropping message");
                return true;
            }
        };

        match self.process(&request).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(
                    export_id = %request.export_id,
                    survey = %request.survey,
                    error = %e,
                    "Export failed"
                );
                self.commit_failed_messages
            }
        }
    }

    /// Drive one export through its status state machine
    ///
    /// Marks `Started` before any work, then resolves to `Finished` with
    /// the artifact link or `Failed` without one. The failure is returned
    /// to the caller after the status write so the loop can log it and
    /// apply the commit policy.
    pub async fn process(&self, request: &ExportRequest) -> Result<()> {
        tracing::info!(
            export_id = %request.export_id,
            survey = %request.survey,
            source = ?request.source,
            event = %request.event,
            "processing export"
        );

        self.status_store
            .mark(&request.export_id, ExportStatus::Started, None)
            .await?;

        match self.run_pipeline(request).await {
            Ok(link) => {
                self.status_store
                    .mark(&request.export_id, ExportStatus::Finished, Some(&link))
                    .await?;
                tracing::info!(
                    export_id = %request.export_id,
                    survey = %request.survey,
                    "finished export"
                );
                Ok(())
            }
            Err(e) => {
                // The status store itself may be down; that can only be
                // reported through the process logs.
                if let Err(status_err) = self
                    .status_store
                    .mark(&request.export_id, ExportStatus::Failed, None)
                    .await
                {
                    tracing::error!(
                        export_id = %request.export_id,
                        error = %status_err,
                        "Failed to record Failed status"
                    );
                }
                Err(e)
            }
        }
    }

    /// Fetch, transform and persist one export; returns the artifact link
    ///
    /// The responses pipeline is validated before any fetch, so a
    /// misconfigured pipeline fails with zero database or storage side
    /// effects. An empty chat log is still a valid artifact.
    async fn run_pipeline(&self, request: &ExportRequest) -> Result<String> {
        let table = match request.source {
            ExportSource::Responses => {
                let pipeline = TransformPipeline::build(&request.options)?;
                let responses = self
                    .data_source
                    .fetch_responses(&request.user, &request.survey)
                    .await?;
                let form_data = self
                    .data_source
                    .fetch_form_data(&request.user, &request.survey)
                    .await?;
                pipeline.execute(responses, &form_data)?
            }
            ExportSource::ChatLog => {
                self.data_source
                    .fetch_chat_log(&request.user, &request.survey, &request.chat_log_options)
                    .await?
            }
        };

        let sink = create_artifact_sink(&self.storage, &request.artifact_path())?;
        sink.save(&table).await?;
        sink.link().await
    }
}
