//! Relational store adapters
//!
//! Pooled PostgreSQL access plus the data-source and status-store
//! implementations the worker consumes through traits.

pub mod client;
pub mod datasource;
pub mod status;
pub mod traits;

pub use client::PostgresClient;
pub use datasource::PostgresDataSource;
pub use status::PostgresStatusStore;
pub use traits::{DataSource, StatusStore};
