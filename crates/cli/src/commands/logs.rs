//! Audit log viewing and retention

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use evosync_domain::LogFilter;

use crate::cli::{LogsArgs, OutputFormat};
use crate::context::AppContext;
use crate::output::{logs_table, write_logs_csv};

pub async fn show(ctx: &AppContext, args: &LogsArgs) -> Result<()> {
    let filter = LogFilter {
        log_type: args.log_type,
        severity: args.severity,
        order_id: args.order,
        limit: args.limit,
        ..LogFilter::default()
    };
    let entries = ctx.audit.get_logs(&filter).await?;

    if entries.is_empty() && args.format == OutputFormat::Table {
        println!("No logs found");
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => println!("{}", logs_table(&entries)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Csv => write_logs_csv(io::stdout().lock(), &entries)?,
    }
    Ok(())
}

pub async fn cleanup(ctx: &AppContext, days: u32, yes: bool) -> Result<()> {
    if !yes && !confirm(&format!("Delete logs older than {days} days?"))? {
        println!("Aborted");
        return Ok(());
    }
    let deleted = ctx.audit.cleanup_old_logs(days).await?;
    println!("Success: Deleted {deleted} log entries");
    Ok(())
}

fn confirm(question: &str) -> Result<bool> {
    print!("{question} [y/n] ");
    io::stdout().flush().context("flushing prompt")?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer).context("reading confirmation")?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
