//! Inbound Evosus webhook: authentication and effects

mod auth;
mod handler;

pub use auth::{WebhookAuth, WebhookRejection};
pub use handler::{parse_event, WebhookHandler};
