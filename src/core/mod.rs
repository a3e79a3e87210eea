//! Business logic
//!
//! The transform pipeline and the export worker that orchestrates one
//! request at a time across the adapters.

pub mod pipeline;
pub mod worker;

pub use pipeline::{Stage, TransformPipeline};
pub use worker::ExportWorker;
