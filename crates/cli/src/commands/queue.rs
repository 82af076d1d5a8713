//! Queue inspection and manual processing

use anyhow::Result;
use evosync_domain::JobStatus;

use crate::context::AppContext;
use crate::output::{format_timestamp, Table};

const RECENT_FAILURES: u32 = 10;

pub async fn status(ctx: &AppContext) -> Result<()> {
    let stats = ctx.queue.get_stats().await?;
    println!("Queue Status:");
    println!("-------------------");
    println!("Pending: {}", stats.pending);
    println!("Processing: {}", stats.processing);
    println!("Completed: {}", stats.completed);
    println!("Failed: {}", stats.failed);

    let failed = ctx.queue.get_jobs(Some(JobStatus::Failed), RECENT_FAILURES).await?;
    if !failed.is_empty() {
        let mut table = Table::new(["Job", "Order", "Attempts", "Next attempt", "Error"]);
        for job in &failed {
            table.row([
                job.id.to_string(),
                job.order_id.to_string(),
                job.attempts.to_string(),
                format_timestamp(job.scheduled_at),
                job.error_message.clone().unwrap_or_default(),
            ]);
        }
        println!();
        println!("{}", table.render());
    }
    Ok(())
}

pub async fn process(ctx: &AppContext) -> Result<()> {
    println!("Processing queue...");
    let summary = ctx.queue.process_queue().await?;
    println!(
        "Success: Queue processed ({} processed, {} completed, {} failed, {} rescheduled)",
        summary.processed, summary.completed, summary.failed, summary.rescheduled
    );
    Ok(())
}
