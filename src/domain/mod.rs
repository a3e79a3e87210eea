//! Domain models and types for Porter.
//!
//! This module contains the core domain models, types, and business rules.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Request model** ([`ExportRequest`], [`ExportOptions`], [`ChatLogExportOptions`])
//! - **Status lifecycle** ([`ExportStatus`])
//! - **Tabular data** ([`TabularDataset`], [`Cell`])
//! - **Error types** ([`PorterError`], [`StorageError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, PorterError>`]:
//!
//! ```rust
//! use porter::domain::{ExportRequest, Result};
//!
//! fn example(payload: &[u8]) -> Result<ExportRequest> {
//!     // Errors are automatically converted using the ? operator
//!     let request = ExportRequest::from_payload(payload)?;
//!     Ok(request)
//! }
//! ```

pub mod errors;
pub mod request;
pub mod result;
pub mod status;
pub mod table;

// Re-export commonly used types for convenience
pub use errors::{PorterError, StorageError};
pub use request::{ChatLogExportOptions, ExportOptions, ExportRequest, ExportSource};
pub use result::Result;
pub use status::ExportStatus;
pub use table::{Cell, TabularDataset};
