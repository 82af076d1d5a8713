//! SKU mapping management

use std::fs::File;
use std::io::{BufReader, BufWriter};

use anyhow::{bail, Context, Result};
use evosync_core::sku::ensure_csv_path;

use crate::cli::SkuCommand;
use crate::context::AppContext;
use crate::output::{format_timestamp, Table};

pub async fn run(ctx: &AppContext, command: SkuCommand) -> Result<()> {
    match command {
        SkuCommand::List { search, limit, offset } => {
            let mappings = match search.as_deref() {
                Some(term) => ctx.mapper.search(term, Some(limit)).await?,
                None => ctx.mapper.get_all(limit, offset).await?,
            };
            if mappings.is_empty() {
                println!("No SKU mappings found");
                return Ok(());
            }
            let mut table = Table::new(["ID", "WooCommerce SKU", "Evosus SKU", "Product ID", "Created"]);
            for mapping in &mappings {
                table.row([
                    mapping.id.to_string(),
                    mapping.wc_sku.clone(),
                    mapping.evosus_sku.clone(),
                    mapping.product_id.map(|id| id.to_string()).unwrap_or_default(),
                    format_timestamp(mapping.created_at),
                ]);
            }
            println!("{}", table.render());
            println!("{} of {} mapping(s)", mappings.len(), ctx.mapper.count().await?);
        }
        SkuCommand::Add { wc_sku, evosus_sku, product_id } => {
            let mapping = ctx.mapper.add_mapping(&wc_sku, &evosus_sku, product_id).await?;
            println!("Success: {} -> {}", mapping.wc_sku, mapping.evosus_sku);
        }
        SkuCommand::Delete { wc_sku } => {
            if !ctx.mapper.delete_mapping(&wc_sku).await? {
                bail!("No mapping for SKU {wc_sku}");
            }
            println!("Success: Mapping for {wc_sku} deleted");
        }
        SkuCommand::Import { path } => {
            ensure_csv_path(&path)?;
            let file = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
            let report = ctx.mapper.import_csv(BufReader::new(file)).await?;
            println!("Success: Imported {} mapping(s), skipped {}", report.imported, report.skipped);
            for error in &report.errors {
                eprintln!("  {error}");
            }
        }
        SkuCommand::Export { path } => {
            ensure_csv_path(&path)?;
            let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
            let rows = ctx.mapper.export_csv(BufWriter::new(file)).await?;
            println!("Success: Exported {rows} mapping(s) to {}", path.display());
        }
    }
    Ok(())
}
