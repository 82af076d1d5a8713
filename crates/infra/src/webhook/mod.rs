//! Inbound Evosus webhook endpoint

pub mod server;

pub use server::{router, WebhookServer, WebhookState};
