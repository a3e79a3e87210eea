//! Run command implementation
//!
//! This module implements the `run` command: it wires the adapters
//! together and starts the consumption loop.

use crate::adapters::database::{PostgresClient, PostgresDataSource, PostgresStatusStore};
use crate::adapters::messaging::KafkaSource;
use crate::config::PorterConfig;
use crate::core::worker::ExportWorker;
use clap::Args;
use std::sync::Arc;
use tokio::sync::watch;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Override the export topic
    #[arg(long)]
    pub topic: Option<String>,

    /// Override the consumer group id
    #[arg(long)]
    pub group_id: Option<String>,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(
        &self,
        mut config: PorterConfig,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        // Apply CLI overrides
        if let Some(topic) = &self.topic {
            tracing::info!(topic = %topic, "Overriding export topic from CLI");
            config.kafka.topic = topic.clone();
        }
        if let Some(group_id) = &self.group_id {
            tracing::info!(group_id = %group_id, "Overriding consumer group from CLI");
            config.kafka.group_id = group_id.clone();
        }

        tracing::info!("setting up database connection");
        let client = Arc::new(PostgresClient::new(config.database.clone()).await?);
        client.test_connection().await?;

        let data_source = Arc::new(PostgresDataSource::new(client.clone()));
        let status_store = Arc::new(PostgresStatusStore::new(client));

        let source = Box::new(KafkaSource::new(&config.kafka)?);

        let worker = ExportWorker::new(source, data_source, status_store, &config);
        worker.run(shutdown_signal).await?;

        Ok(0)
    }
}
