//! Object storage adapters
//!
//! The artifact sink abstraction and its backends: a local development
//! sink, an S3-compatible sink, and a GCS sink over the S3 interop API.

pub mod factory;
pub mod gcs;
pub mod local;
pub mod s3;
pub mod traits;

pub use factory::create_artifact_sink;
pub use gcs::GcsBackend;
pub use local::LocalBackend;
pub use s3::S3Backend;
pub use traits::ArtifactSink;
