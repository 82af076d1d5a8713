//! Long-running mode: webhook endpoint plus queue scheduler

use anyhow::{Context, Result};
use evosync_infra::{QueueScheduler, WebhookServer};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::context::AppContext;

pub async fn run(ctx: &AppContext) -> Result<()> {
    if !ctx.config.evosus.is_usable() {
        warn!("Evosus credentials missing; queued jobs will fail until they are configured");
    }

    let cancel = CancellationToken::new();
    let server = if ctx.config.webhook.enabled {
        Some(WebhookServer::start(&ctx.config.webhook.bind, ctx.webhook_state(), cancel.clone()).await?)
    } else {
        info!("webhooks disabled; not binding a listener");
        None
    };

    let mut scheduler = QueueScheduler::new(ctx.scheduler_config(), ctx.queue_worker());
    scheduler.start().await.context("starting queue scheduler")?;

    tokio::signal::ctrl_c().await.context("waiting for Ctrl-C")?;
    info!("shutdown requested");

    scheduler.stop().await.context("stopping queue scheduler")?;
    if let Some(server) = server {
        server.shutdown().await?;
    }
    info!("stopped");
    Ok(())
}
