//! Command-line surface

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use evosync_domain::{LogSeverity, LogType};

#[derive(Debug, Parser)]
#[command(name = "evosync", version, about = "Sync storefront orders into Evosus")]
pub struct Cli {
    /// Config file (TOML or JSON); overrides EVOSYNC_CONFIG and probing.
    #[arg(long, short, global = true, env = "EVOSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sync one order to Evosus.
    Sync {
        order_id: i64,
        /// Submit without re-validating line items.
        #[arg(long)]
        skip_validation: bool,
    },
    /// Sync every unsynced order with the given status.
    SyncAll {
        #[arg(long, default_value = "processing")]
        status: String,
        #[arg(long, default_value_t = 50)]
        limit: u32,
        /// Enqueue the orders instead of syncing them inline.
        #[arg(long)]
        use_queue: bool,
    },
    /// Validate an order against Evosus inventory without submitting it.
    Validate { order_id: i64 },
    /// Re-validate a flagged order and sync it when it passes.
    Approve { order_id: i64 },
    /// Check that the Evosus PO number matches the local order number.
    Verify { order_id: i64 },
    /// Set the Evosus item code for one order line.
    SetSku { order_id: i64, item_id: i64, sku: String },
    /// Show job counts per status.
    QueueStatus,
    /// Run one queue pass now.
    ProcessQueue,
    /// Show recent audit entries.
    Logs(LogsArgs),
    /// Delete audit entries older than the given age.
    CleanupLogs {
        #[arg(long, default_value_t = 90)]
        days: u32,
        /// Do not ask for confirmation.
        #[arg(long, short)]
        yes: bool,
    },
    /// Check Evosus credentials with a customer search.
    TestConnection,
    /// Manage SKU mappings.
    #[command(subcommand)]
    SkuMappings(SkuCommand),
    /// Manage the local order mirror.
    #[command(subcommand)]
    Orders(OrdersCommand),
    /// Sync counters, queue state and audit volume.
    Stats {
        /// Window for audit counts.
        #[arg(long, default_value_t = 7)]
        log_days: u32,
    },
    /// Run the webhook endpoint and the queue scheduler until Ctrl-C.
    Serve,
}

#[derive(Debug, Args)]
pub struct LogsArgs {
    #[arg(long)]
    pub severity: Option<LogSeverity>,
    #[arg(long = "type")]
    pub log_type: Option<LogType>,
    #[arg(long)]
    pub order: Option<i64>,
    #[arg(long, default_value_t = 20)]
    pub limit: u32,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Subcommand)]
pub enum SkuCommand {
    List {
        /// Substring match on either SKU.
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 50)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    Add {
        wc_sku: String,
        evosus_sku: String,
        #[arg(long)]
        product_id: Option<i64>,
    },
    Delete { wc_sku: String },
    /// Import `wc_sku,evosus_sku[,product_id]` rows (header row required).
    Import { path: PathBuf },
    Export { path: PathBuf },
}

#[derive(Debug, Subcommand)]
pub enum OrdersCommand {
    /// Load a storefront JSON export into the local mirror.
    Import { path: PathBuf },
}
