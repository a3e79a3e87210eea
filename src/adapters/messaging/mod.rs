//! Message bus adapters
//!
//! The consumer-group abstraction the worker polls, and its Kafka binding.

pub mod kafka;
pub mod traits;

pub use kafka::KafkaSource;
pub use traits::{DeliveredMessage, MessageSource};
