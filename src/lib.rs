// Porter - Survey Data Export Worker
// Copyright (c) 2025 Porter Contributors
// Licensed under the MIT License

//! # Porter - Survey Data Export Worker
//!
//! Porter is a message-triggered worker that exports survey data as
//! tabular artifacts. It consumes export requests from a Kafka topic,
//! pulls the matching relational records, runs them through a
//! configurable transformation pipeline, writes the result as CSV to
//! pluggable object storage, and records a status transition so callers
//! can poll for completion.
//!
//! ## Overview
//!
//! One request flows through the worker as:
//!
//! 1. **Parse** the inbound payload into an [`domain::ExportRequest`]
//! 2. **Mark** the export `Started` in the status store
//! 3. **Fetch** responses+forms or the chat log from PostgreSQL
//! 4. **Transform** responses through the option-driven stage pipeline
//! 5. **Persist** the artifact and resolve its retrievable link
//! 6. **Mark** `Finished` (with link) or `Failed`
//! 7. **Acknowledge** the message, only after all of the above
//!
//! ## Architecture
//!
//! Porter follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (transform pipeline, export worker)
//! - [`adapters`] - External integrations (Kafka, PostgreSQL, object storage)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use porter::adapters::database::{PostgresClient, PostgresDataSource, PostgresStatusStore};
//! use porter::adapters::messaging::KafkaSource;
//! use porter::config::load_config;
//! use porter::core::ExportWorker;
//! use std::sync::Arc;
//! use tokio::sync::watch;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("porter.toml")?;
//!
//!     let client = Arc::new(PostgresClient::new(config.database.clone()).await?);
//!     let worker = ExportWorker::new(
//!         Box::new(KafkaSource::new(&config.kafka)?),
//!         Arc::new(PostgresDataSource::new(client.clone())),
//!         Arc::new(PostgresStatusStore::new(client)),
//!         &config,
//!     );
//!
//!     let (_shutdown_tx, shutdown_rx) = watch::channel(false);
//!     worker.run(shutdown_rx).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Delivery Semantics
//!
//! Offsets are committed manually, after the full pipeline completes for a
//! message - at-least-once delivery. Redelivery is safe: status updates
//! are idempotent overwrites and the artifact path is derived from the
//! request, so reprocessing converges on the same terminal state.
//!
//! ## Error Handling
//!
//! Porter uses the [`domain::PorterError`] type for all errors:
//!
//! ```rust,no_run
//! use porter::domain::PorterError;
//!
//! fn example() -> Result<(), PorterError> {
//!     // Errors are automatically converted using the ? operator
//!     let config = porter::config::load_config("porter.toml")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! Porter uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn, error};
//!
//! info!("Starting worker");
//! warn!(survey = "my-survey", "No rows found");
//! error!(export_id = "abc-123", "Export failed");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
