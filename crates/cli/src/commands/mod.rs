//! Subcommand implementations

mod logs;
mod orders;
mod queue;
mod serve;
mod sku;
mod sync;

use anyhow::{bail, Result};

use crate::cli::Command;
use crate::context::AppContext;

pub async fn run(ctx: &AppContext, command: Command) -> Result<()> {
    match command {
        Command::Sync { order_id, skip_validation } => {
            require_api(ctx)?;
            sync::sync_one(ctx, order_id, skip_validation).await
        }
        Command::SyncAll { status, limit, use_queue } => {
            if !use_queue {
                require_api(ctx)?;
            }
            sync::sync_all(ctx, &status, limit, use_queue).await
        }
        Command::Validate { order_id } => {
            require_api(ctx)?;
            sync::validate(ctx, order_id).await
        }
        Command::Approve { order_id } => {
            require_api(ctx)?;
            sync::approve(ctx, order_id).await
        }
        Command::Verify { order_id } => {
            require_api(ctx)?;
            sync::verify(ctx, order_id).await
        }
        Command::SetSku { order_id, item_id, sku } => sync::set_sku(ctx, order_id, item_id, &sku).await,
        Command::TestConnection => {
            require_api(ctx)?;
            sync::test_connection(ctx).await
        }
        Command::Stats { log_days } => sync::stats(ctx, log_days).await,
        Command::QueueStatus => queue::status(ctx).await,
        Command::ProcessQueue => queue::process(ctx).await,
        Command::Logs(args) => logs::show(ctx, &args).await,
        Command::CleanupLogs { days, yes } => logs::cleanup(ctx, days, yes).await,
        Command::SkuMappings(command) => sku::run(ctx, command).await,
        Command::Orders(command) => orders::run(ctx, command).await,
        Command::Serve => serve::run(ctx).await,
    }
}

fn require_api(ctx: &AppContext) -> Result<()> {
    if !ctx.config.evosus.is_usable() {
        bail!("Evosus API credentials not configured");
    }
    Ok(())
}
