//! Validator behaviour against a scripted inventory

mod support;

use evosync_domain::{IssueSeverity, IssueType, LineItem};

use support::erp::FakeErp;
use support::{item, order, Harness};

#[tokio::test]
async fn unknown_sku_offers_existing_variants() {
    let h = Harness::new(FakeErp::default().with_item("ABC-123", 4.0, false).with_item("abc123", 1.0, false));
    let report = h.validator.validate(&order(1, vec![item(1, "abc-123", 1, 5.0)])).await.unwrap();

    assert!(!report.valid);
    let issue = &report.issues[0];
    assert_eq!(issue.issue_type, IssueType::SkuNotFound);
    let suggested: Vec<_> = issue.suggestions.iter().map(|s| s.sku.as_str()).collect();
    assert_eq!(suggested, ["ABC-123", "abc123"]);
    assert_eq!(issue.suggestions[0].description, "ABC-123 description");

    let lookups = h.erp.inventory_lookups.lock().unwrap().clone();
    assert!(!lookups[1..].contains(&"abc-123".to_string()));
}

#[tokio::test]
async fn mapped_sku_is_checked_instead_of_raw() {
    let h = Harness::new(FakeErp::default().with_item("EV-PUMP", 10.0, false));
    h.mapper.add_mapping("pump-small", "EV-PUMP", None).await.unwrap();

    let report = h.validator.validate(&order(2, vec![item(1, "pump-small", 2, 5.0)])).await.unwrap();

    assert!(report.valid);
    assert!(report.issues.is_empty());
    assert_eq!(*h.erp.inventory_lookups.lock().unwrap(), ["EV-PUMP"]);
}

#[tokio::test]
async fn short_stock_is_a_warning() {
    let h = Harness::new(FakeErp::default().with_item("LOW-1", 2.0, false));

    let report = h.validator.validate(&order(3, vec![item(1, "LOW-1", 5, 50.0)])).await.unwrap();

    assert!(report.valid);
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].issue_type, IssueType::InsufficientStock);
    assert_eq!(report.issues[0].severity, IssueSeverity::Warning);
}

#[tokio::test]
async fn deleted_products_are_skipped() {
    let h = Harness::new(FakeErp::default());
    let orphan = LineItem { product_id: None, ..item(1, "", 1, 5.0) };

    let report = h.validator.validate(&order(4, vec![orphan])).await.unwrap();

    assert!(report.valid);
    assert!(h.erp.inventory_lookups.lock().unwrap().is_empty());
}

#[tokio::test]
async fn missing_sku_is_not_looked_up() {
    let h = Harness::new(FakeErp::default());

    let report = h.validator.validate(&order(5, vec![item(1, "  ", 1, 5.0)])).await.unwrap();

    assert_eq!(report.issues[0].issue_type, IssueType::MissingSku);
    assert!(h.erp.inventory_lookups.lock().unwrap().is_empty());
}
