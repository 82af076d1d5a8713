//! Sync metadata, validation issues and use-case outcomes

use serde::{Deserialize, Serialize};

/// Per-order sync metadata
///
/// `synced` and `needs_review` are mutually exclusive; the mutators below
/// keep them that way.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncRecord {
    pub synced: bool,
    pub evosus_order_id: Option<String>,
    /// Unix seconds.
    pub sync_date: Option<i64>,
    pub needs_review: bool,
    pub review_issues: Vec<Issue>,
    /// Unix seconds.
    pub review_date: Option<i64>,
}

impl SyncRecord {
    pub fn mark_synced(&mut self, evosus_order_id: impl Into<String>, now: i64) {
        self.synced = true;
        self.evosus_order_id = Some(evosus_order_id.into());
        self.sync_date = Some(now);
        self.clear_review();
    }

    pub fn mark_for_review(&mut self, issues: Vec<Issue>, now: i64) {
        self.synced = false;
        self.needs_review = true;
        self.review_issues = issues;
        self.review_date = Some(now);
    }

    pub fn clear_review(&mut self) {
        self.needs_review = false;
        self.review_issues.clear();
        self.review_date = None;
    }
}

/// Kind of problem found on an order line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    MissingSku,
    SkuNotFound,
    Discontinued,
    InsufficientStock,
}

crate::impl_domain_status_conversions!(IssueType {
    MissingSku => "missing_sku",
    SkuNotFound => "sku_not_found",
    Discontinued => "discontinued",
    InsufficientStock => "insufficient_stock",
});

/// `Error` blocks sync; `Warning` is informational
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Error,
    Warning,
}

crate::impl_domain_status_conversions!(IssueSeverity {
    Error => "error",
    Warning => "warning",
});

/// Existing Evosus item offered as a replacement for an unknown SKU
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuSuggestion {
    pub sku: String,
    pub description: String,
}

/// A validation finding for one line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub severity: IssueSeverity,
    pub item_id: i64,
    pub product_name: String,
    #[serde(default)]
    pub sku: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<SkuSuggestion>,
}

impl Issue {
    pub fn missing_sku(item_id: i64, product_name: &str) -> Self {
        Self {
            issue_type: IssueType::MissingSku,
            severity: IssueSeverity::Error,
            item_id,
            product_name: product_name.to_string(),
            sku: String::new(),
            message: format!("Product \"{product_name}\" has no SKU"),
            suggestions: Vec::new(),
        }
    }

    pub fn sku_not_found(
        item_id: i64,
        product_name: &str,
        sku: &str,
        suggestions: Vec<SkuSuggestion>,
    ) -> Self {
        Self {
            issue_type: IssueType::SkuNotFound,
            severity: IssueSeverity::Error,
            item_id,
            product_name: product_name.to_string(),
            sku: sku.to_string(),
            message: format!("SKU \"{sku}\" not found in Evosus"),
            suggestions,
        }
    }

    pub fn discontinued(item_id: i64, product_name: &str, sku: &str) -> Self {
        Self {
            issue_type: IssueType::Discontinued,
            severity: IssueSeverity::Warning,
            item_id,
            product_name: product_name.to_string(),
            sku: sku.to_string(),
            message: format!("SKU \"{sku}\" is discontinued in Evosus"),
            suggestions: Vec::new(),
        }
    }

    pub fn insufficient_stock(
        item_id: i64,
        product_name: &str,
        sku: &str,
        available: f64,
        requested: i64,
    ) -> Self {
        Self {
            issue_type: IssueType::InsufficientStock,
            severity: IssueSeverity::Warning,
            item_id,
            product_name: product_name.to_string(),
            sku: sku.to_string(),
            message: format!(
                "Insufficient stock for \"{sku}\": {available} available, {requested} requested"
            ),
            suggestions: Vec::new(),
        }
    }

    pub fn is_blocking(&self) -> bool {
        self.severity == IssueSeverity::Error
    }
}

/// Result of validating an order against Evosus inventory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    pub fn from_issues(issues: Vec<Issue>) -> Self {
        let valid = !issues.iter().any(Issue::is_blocking);
        Self { valid, issues }
    }

    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|issue| issue.is_blocking())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|issue| !issue.is_blocking())
    }
}

/// Evosus customer and locations chosen for an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerResolution {
    pub customer_id: String,
    pub bill_to_location_id: String,
    pub ship_to_location_id: String,
    pub is_new: bool,
}

/// Evosus accepted the order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub evosus_order_id: String,
    pub order_number: String,
    pub message: String,
}

/// Terminal outcome of one sync attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncOutcome {
    Synced { evosus_order_id: String, customer_id: String, customer_created: bool },
    NeedsReview { issues: Vec<Issue> },
    /// `retryable` is false when another attempt cannot succeed without
    /// operator action (missing address data, rejected payload).
    Failed { message: String, retryable: bool },
    /// Refused by the caller guard; nothing was sent.
    AlreadySynced { evosus_order_id: Option<String> },
}

impl SyncOutcome {
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Synced { .. })
    }

    /// Whether the queue should try this order again later.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Failed { retryable: true, .. })
    }

    pub fn message(&self) -> String {
        match self {
            Self::Synced { evosus_order_id, .. } => {
                format!("Order synced to Evosus (Evosus Order ID: {evosus_order_id})")
            }
            Self::NeedsReview { issues } => {
                format!("Order needs review before syncing ({} issue(s))", issues.len())
            }
            Self::Failed { message, .. } => message.clone(),
            Self::AlreadySynced { evosus_order_id } => match evosus_order_id {
                Some(id) => format!("Order already synced (Evosus Order ID: {id})"),
                None => "Order already synced".to_string(),
            },
        }
    }
}

/// Comparison of the local order number with the Evosus PO number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossReference {
    pub verified: bool,
    pub evosus_po_number: String,
    pub order_number: String,
    pub evosus_order_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerificationOutcome {
    NotSynced,
    RemoteNotFound { evosus_order_id: String },
    Checked(CrossReference),
}

/// Row of the "synced orders" report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncedOrderSummary {
    pub order_id: i64,
    pub order_number: String,
    pub evosus_order_id: String,
    pub sync_date: i64,
    pub customer_name: String,
    pub total: f64,
    pub created_at: i64,
}

/// Row of the "needs review" report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub order_id: i64,
    pub order_number: String,
    pub customer_name: String,
    pub total: f64,
    pub review_date: Option<i64>,
    pub issues: Vec<Issue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_is_valid_with_only_warnings() {
        let report = ValidationReport::from_issues(vec![
            Issue::discontinued(1, "Pump", "PUMP-1"),
            Issue::insufficient_stock(2, "Filter", "FLT-2", 1.0, 4),
        ]);
        assert!(report.valid);
        assert_eq!(report.warnings().count(), 2);
        assert_eq!(report.errors().count(), 0);
    }

    #[test]
    fn any_error_invalidates_report() {
        let report = ValidationReport::from_issues(vec![
            Issue::discontinued(1, "Pump", "PUMP-1"),
            Issue::missing_sku(2, "Mystery box"),
        ]);
        assert!(!report.valid);
        assert_eq!(report.errors().count(), 1);
    }

    #[test]
    fn synced_and_review_are_exclusive() {
        let mut record = SyncRecord::default();
        record.mark_for_review(vec![Issue::missing_sku(1, "X")], 100);
        assert!(record.needs_review);
        assert!(!record.synced);

        record.mark_synced("EV-1", 200);
        assert!(record.synced);
        assert!(!record.needs_review);
        assert!(record.review_issues.is_empty());
        assert_eq!(record.review_date, None);
        assert_eq!(record.sync_date, Some(200));
    }

    #[test]
    fn issue_serializes_type_field() {
        let json = serde_json::to_value(Issue::missing_sku(4, "Hose")).unwrap();
        assert_eq!(json["type"], "missing_sku");
        assert_eq!(json["severity"], "error");
        assert!(json.get("suggestions").is_none());
    }

    #[test]
    fn only_transient_failures_are_retryable() {
        assert!(SyncOutcome::Failed { message: "timeout".into(), retryable: true }.is_retryable());
        assert!(!SyncOutcome::Failed { message: "no addresses".into(), retryable: false }.is_retryable());
        assert!(!SyncOutcome::NeedsReview { issues: vec![] }.is_retryable());
    }
}
