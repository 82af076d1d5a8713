//! `evosync` - operator CLI for the storefront to Evosus order sync.
//!
//! Command output goes to stdout with `println!`; diagnostics go through
//! `tracing` to stderr.

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;
mod commands;
mod context;
mod output;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use crate::cli::Cli;
use crate::context::AppContext;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = evosync_infra::config::load(cli.config).context("loading configuration")?;

    evosync_infra::init_tracing(&config.logging)?;

    let ctx = AppContext::build(config).context("initialising services")?;
    commands::run(&ctx, cli.command).await
}
