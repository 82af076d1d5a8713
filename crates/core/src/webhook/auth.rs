//! Shared-secret check for webhook requests

use evosync_domain::WebhookConfig;
use tracing::warn;

/// Why a webhook request was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookRejection {
    Disabled,
    /// No secret configured and `require_secret` is on.
    SecretNotConfigured,
    InvalidSecret,
}

impl WebhookRejection {
    pub const fn message(self) -> &'static str {
        match self {
            Self::Disabled => "Webhooks are not enabled",
            Self::SecretNotConfigured => "Webhook secret not configured",
            Self::InvalidSecret => "Invalid webhook secret",
        }
    }
}

#[derive(Debug, Clone)]
pub struct WebhookAuth {
    enabled: bool,
    secret: Option<String>,
    require_secret: bool,
}

impl WebhookAuth {
    pub fn new(enabled: bool, secret: Option<String>, require_secret: bool) -> Self {
        let secret = secret.filter(|s| !s.is_empty());
        Self { enabled, secret, require_secret }
    }

    pub fn from_config(config: &WebhookConfig) -> Self {
        Self::new(config.enabled, config.secret.clone(), config.require_secret)
    }

    /// Check the secret header value.
    ///
    /// With no secret configured requests are accepted (and a warning is
    /// traced) unless `require_secret` is set.
    ///
    /// # Errors
    /// The reason the request must be refused.
    pub fn authorize(&self, provided: Option<&str>) -> Result<(), WebhookRejection> {
        if !self.enabled {
            return Err(WebhookRejection::Disabled);
        }
        let Some(expected) = self.secret.as_deref() else {
            if self.require_secret {
                return Err(WebhookRejection::SecretNotConfigured);
            }
            warn!("webhook secret not configured, accepting unauthenticated request");
            return Ok(());
        };
        match provided {
            Some(value) if value.as_bytes() == expected.as_bytes() => Ok(()),
            _ => {
                warn!("invalid webhook secret provided");
                Err(WebhookRejection::InvalidSecret)
            }
        }
    }
}
