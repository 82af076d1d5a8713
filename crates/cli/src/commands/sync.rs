//! Order sync, validation and verification commands

use anyhow::{bail, Result};
use evosync_core::{ErpClient, OrderStore};
use evosync_domain::{CustomerQuery, Issue, IssueSeverity, SyncOutcome, VerificationOutcome};

use crate::context::AppContext;
use crate::output::{format_timestamp, Table};

pub async fn sync_one(ctx: &AppContext, order_id: i64, skip_validation: bool) -> Result<()> {
    println!("Syncing order #{order_id}...");
    match ctx.sync.sync_order(order_id, skip_validation).await? {
        SyncOutcome::Synced { evosus_order_id, .. } => {
            println!("Success: Order synced successfully! Evosus Order ID: {evosus_order_id}");
        }
        SyncOutcome::NeedsReview { issues } => {
            println!("Warning: Order needs review. Issues found:");
            print_issue_messages(&issues);
        }
        outcome @ SyncOutcome::AlreadySynced { .. } => println!("{}", outcome.message()),
        SyncOutcome::Failed { message, .. } => bail!("Sync failed: {message}"),
    }
    Ok(())
}

pub async fn sync_all(ctx: &AppContext, status: &str, limit: u32, use_queue: bool) -> Result<()> {
    let order_ids = ctx.orders.list_order_ids(Some(status), limit, true).await?;
    if order_ids.is_empty() {
        println!("No orders found to sync");
        return Ok(());
    }
    println!("Found {} orders to sync", order_ids.len());

    if use_queue {
        for order_id in &order_ids {
            ctx.queue.add_job(*order_id).await?;
        }
        println!("Success: Added {} orders to queue", order_ids.len());
        return Ok(());
    }

    let (mut synced, mut review, mut failed) = (0_u32, 0_u32, 0_u32);
    for order_id in order_ids {
        match ctx.sync.sync_order(order_id, false).await {
            Ok(SyncOutcome::Synced { .. }) => synced += 1,
            Ok(SyncOutcome::NeedsReview { .. }) => review += 1,
            Ok(SyncOutcome::AlreadySynced { .. }) => {}
            Ok(SyncOutcome::Failed { message, .. }) => {
                eprintln!("  order #{order_id}: {message}");
                failed += 1;
            }
            Err(err) => {
                eprintln!("  order #{order_id}: {}", err.user_message());
                failed += 1;
            }
        }
    }

    println!("Success: Sync complete:");
    println!("  - Success: {synced}");
    println!("  - Needs Review: {review}");
    println!("  - Failed: {failed}");
    Ok(())
}

pub async fn validate(ctx: &AppContext, order_id: i64) -> Result<()> {
    println!("Validating order #{order_id}...");
    let report = ctx.sync.validate_order(order_id).await?;
    if report.valid && report.issues.is_empty() {
        println!("Success: Order validated successfully - ready to sync");
        return Ok(());
    }
    if report.valid {
        println!("Success: Order can sync, with warnings:");
    } else {
        println!("Warning: Validation issues found:");
    }
    for issue in &report.issues {
        println!("  {}", describe_issue(issue));
    }
    Ok(())
}

pub async fn approve(ctx: &AppContext, order_id: i64) -> Result<()> {
    match ctx.sync.approve_order_for_sync(order_id).await? {
        SyncOutcome::Synced { evosus_order_id, .. } => {
            println!("Success: Order approved and synced. Evosus Order ID: {evosus_order_id}");
        }
        SyncOutcome::NeedsReview { issues } => {
            println!("Warning: Order still has validation errors:");
            print_issue_messages(&issues);
        }
        outcome @ SyncOutcome::AlreadySynced { .. } => println!("{}", outcome.message()),
        SyncOutcome::Failed { message, .. } => bail!("Sync failed: {message}"),
    }
    Ok(())
}

pub async fn verify(ctx: &AppContext, order_id: i64) -> Result<()> {
    match ctx.sync.verify_cross_reference(order_id).await? {
        VerificationOutcome::NotSynced => bail!("Order #{order_id} has not been synced to Evosus"),
        VerificationOutcome::RemoteNotFound { evosus_order_id } => {
            bail!("Evosus order {evosus_order_id} could not be found")
        }
        VerificationOutcome::Checked(reference) => {
            let mut table = Table::new(["Field", "Value"]);
            table.row(["Order Number", reference.order_number.as_str()]);
            table.row(["Evosus Order ID", reference.evosus_order_id.as_str()]);
            table.row(["Evosus PO Number", reference.evosus_po_number.as_str()]);
            println!("{}", table.render());
            if reference.verified {
                println!("Success: Cross-reference verified");
            } else {
                bail!("Cross-reference mismatch");
            }
        }
    }
    Ok(())
}

pub async fn set_sku(ctx: &AppContext, order_id: i64, item_id: i64, sku: &str) -> Result<()> {
    ctx.sync.update_order_item_sku(order_id, item_id, sku).await?;
    println!("Success: Item {item_id} of order #{order_id} will use Evosus SKU {}", sku.trim());
    Ok(())
}

pub async fn test_connection(ctx: &AppContext) -> Result<()> {
    println!("Testing API connection...");
    match ctx.erp.search_customer(&CustomerQuery::Email("test@example.com".into())).await {
        Ok(_) => {
            println!("Success: API connection successful!");
            Ok(())
        }
        Err(err) => bail!("API connection failed: {}", err.user_message()),
    }
}

pub async fn stats(ctx: &AppContext, log_days: u32) -> Result<()> {
    let report = ctx.reporter.stats(log_days).await?;

    let mut table = Table::new(["Metric", "Count"]);
    table.row(["Synced today".to_string(), report.synced_today.to_string()]);
    table.row(["Synced this week".to_string(), report.synced_this_week.to_string()]);
    table.row(["Needing review".to_string(), report.needing_review.to_string()]);
    table.row(["Queue pending".to_string(), report.queue.pending.to_string()]);
    table.row(["Queue processing".to_string(), report.queue.processing.to_string()]);
    table.row(["Queue completed".to_string(), report.queue.completed.to_string()]);
    table.row(["Queue failed".to_string(), report.queue.failed.to_string()]);
    for (log_type, count) in &report.logs_by_type {
        table.row([format!("Logs: {log_type} ({log_days}d)"), count.to_string()]);
    }
    println!("{}", table.render());

    let review = ctx.reporter.needing_review().await?;
    if !review.is_empty() {
        let mut table = Table::new(["Order", "Customer", "Issues", "Flagged"]);
        for row in &review {
            table.row([
                row.order_number.clone(),
                row.customer_name.clone(),
                row.issues.len().to_string(),
                row.review_date.map(format_timestamp).unwrap_or_default(),
            ]);
        }
        println!();
        println!("Orders needing review:");
        println!("{}", table.render());
    }
    Ok(())
}

fn print_issue_messages(issues: &[Issue]) {
    for issue in issues {
        println!("  - {}", issue.message);
    }
}

fn describe_issue(issue: &Issue) -> String {
    let (icon, label) = match issue.severity {
        IssueSeverity::Error => ('✗', "error"),
        IssueSeverity::Warning => ('⚠', "warning"),
    };
    let mut line = format!("{icon} [{label}] {}", issue.message);
    if !issue.suggestions.is_empty() {
        let codes: Vec<&str> = issue.suggestions.iter().map(|s| s.sku.as_str()).collect();
        line.push_str(&format!(" (did you mean: {})", codes.join(", ")));
    }
    line
}
