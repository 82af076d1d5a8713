//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Evosync
///
/// Expected business outcomes (validation issues, customer not matched,
/// Evosus rejecting an order) are modelled as result values in
/// [`crate::types`]; this enum covers faults that abort an operation.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum EvosyncError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Remote error ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Customer resolution failed: {0}")]
    Resolution(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl EvosyncError {
    /// Whether retrying the same call could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Remote { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Message suitable for an operator-facing failure note.
    ///
    /// Remote rejections and resolution failures are surfaced verbatim.
    pub fn user_message(&self) -> String {
        match self {
            Self::Remote { message, .. } | Self::Resolution(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for Evosync operations
pub type Result<T> = std::result::Result<T, EvosyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification_follows_status() {
        assert!(EvosyncError::Network("timeout".into()).is_transient());
        assert!(EvosyncError::Remote { status: 503, message: "busy".into() }.is_transient());
        assert!(!EvosyncError::Remote { status: 400, message: "bad".into() }.is_transient());
        assert!(!EvosyncError::Config("missing ticket".into()).is_transient());
    }

    #[test]
    fn remote_user_message_is_verbatim() {
        let err = EvosyncError::Remote { status: 200, message: "Invalid ItemCode".into() };
        assert_eq!(err.user_message(), "Invalid ItemCode");
        assert_eq!(err.to_string(), "Remote error (200): Invalid ItemCode");
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_value(EvosyncError::NotFound("order 7".into())).unwrap();
        assert_eq!(json["type"], "NotFound");
        assert_eq!(json["message"], "order 7");
    }
}
