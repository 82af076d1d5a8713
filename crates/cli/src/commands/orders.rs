//! Local order mirror

use anyhow::{Context, Result};

use crate::cli::OrdersCommand;
use crate::context::AppContext;

pub async fn run(ctx: &AppContext, command: OrdersCommand) -> Result<()> {
    match command {
        OrdersCommand::Import { path } => {
            let json = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            let summary = ctx.orders.import_json(&json).await?;
            println!(
                "Success: Imported {} order(s), {} line item(s), {} product(s)",
                summary.orders, summary.items, summary.products
            );
        }
    }
    Ok(())
}
