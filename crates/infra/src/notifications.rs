//! Bundled [`SyncObserver`]s
//!
//! Both observers share [`NotificationPolicy`]: nothing is emitted when
//! notifications are disabled, and success events only when
//! `notify_success` is set. Failures and review requests always pass.

use std::sync::Arc;

use async_trait::async_trait;
use evosync_core::{AuditLogger, SyncEvent, SyncObserver};
use evosync_domain::NotificationConfig;
use serde_json::json;
use tracing::{info, warn};

/// Which events are worth telling an operator about
#[derive(Debug, Clone)]
pub struct NotificationPolicy {
    enabled: bool,
    notify_success: bool,
    recipient: Option<String>,
}

impl NotificationPolicy {
    pub fn from_config(config: &NotificationConfig) -> Self {
        Self {
            enabled: config.enabled,
            notify_success: config.notify_success,
            recipient: config.email.clone().filter(|email| !email.trim().is_empty()),
        }
    }

    pub const fn should_notify(&self, event: &SyncEvent) -> bool {
        if !self.enabled {
            return false;
        }
        match event {
            SyncEvent::SyncSucceeded { .. } => self.notify_success,
            SyncEvent::NeedsReview { .. } | SyncEvent::SyncFailed { .. } => true,
        }
    }

    pub fn recipient(&self) -> Option<&str> {
        self.recipient.as_deref()
    }
}

/// One-line headline for an event.
pub fn subject(event: &SyncEvent) -> String {
    match event {
        SyncEvent::SyncSucceeded { order_number, .. } => format!("Order Synced - Order #{order_number}"),
        SyncEvent::NeedsReview { order_number, .. } => format!("Order Needs Review - Order #{order_number}"),
        SyncEvent::SyncFailed { order_number, .. } => format!("Evosus Sync Failed - Order #{order_number}"),
    }
}

/// Emits notifications as tracing events.
pub struct TracingNotifier {
    policy: NotificationPolicy,
}

impl TracingNotifier {
    pub const fn new(policy: NotificationPolicy) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl SyncObserver for TracingNotifier {
    async fn on_event(&self, event: &SyncEvent) {
        if !self.policy.should_notify(event) {
            return;
        }
        let subject = subject(event);
        match event {
            SyncEvent::SyncSucceeded { order_id, evosus_order_id, .. } => {
                info!(order_id, evosus_order_id = %evosus_order_id, "{subject}");
            }
            SyncEvent::NeedsReview { order_id, issues, .. } => {
                warn!(order_id, issues = issues.len(), "{subject}");
            }
            SyncEvent::SyncFailed { order_id, message, .. } => {
                warn!(order_id, error = %message, "{subject}");
            }
        }
    }
}

/// Records each notification in the audit trail, addressed to the
/// configured recipient.
pub struct AuditNotifier {
    policy: NotificationPolicy,
    audit: Arc<AuditLogger>,
}

impl AuditNotifier {
    pub const fn new(policy: NotificationPolicy, audit: Arc<AuditLogger>) -> Self {
        Self { policy, audit }
    }
}

#[async_trait]
impl SyncObserver for AuditNotifier {
    async fn on_event(&self, event: &SyncEvent) {
        if !self.policy.should_notify(event) {
            return;
        }
        let details = match event {
            SyncEvent::SyncSucceeded { evosus_order_id, .. } => json!({ "evosus_order_id": evosus_order_id }),
            SyncEvent::NeedsReview { issues, .. } => json!({
                "issues": issues.iter().map(|issue| issue.message.as_str()).collect::<Vec<_>>(),
            }),
            SyncEvent::SyncFailed { message, .. } => json!({ "error": message }),
        };
        let context = json!({
            "event": event.kind(),
            "recipient": self.policy.recipient(),
            "details": details,
        });
        self.audit
            .log_info(&format!("Notification: {}", subject(event)), Some(&context), Some(event.order_id()))
            .await;
    }
}
