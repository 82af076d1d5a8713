//! Durable, retryable sync queue

pub mod ports;
mod service;

pub use service::{retry_delay_minutes, QueueService, QueueSettings};
