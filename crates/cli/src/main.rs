// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! rflow - inspect and prune a dataflow session's cache and run history.

mod color;
mod commands;
mod filter;
mod render;
mod table;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{clean, log};
use rflow_core::RuntimeConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rflow", version, about = "Inspect and prune a dataflow session's cache and history")]
struct Cli {
    /// Load runtime tunables from a TOML config file instead of the defaults.
    #[arg(short = 'c', long = "config", global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print cached task records, selected by run name, session id, or `last`.
    Log(log::LogArgs),
    /// Remove cached work directories for selected runs.
    Clean(clean::CleanArgs),
    /// Print the run history table.
    History,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        let msg = format_error(&e);
        eprintln!("Error: {msg}");
        std::process::exit(1);
    }
}

/// Format an anyhow error, deduplicating the chain: if every source
/// message already appears in the top-level text, skip the "Caused by"
/// section (common when thiserror variants use `#[from]`).
fn format_error(err: &anyhow::Error) -> String {
    let top = err.to_string();
    let chain_redundant = err.chain().skip(1).all(|cause| top.contains(&cause.to_string()));
    if chain_redundant {
        return top;
    }
    let mut buf = top;
    for (i, cause) in err.chain().skip(1).enumerate() {
        buf.push_str(&format!("\n\nCaused by:\n    {i}: {cause}"));
    }
    buf
}

async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => RuntimeConfig::from_toml_str(&std::fs::read_to_string(path)?)?,
        None => RuntimeConfig::default(),
    };

    match cli.command {
        Commands::Log(args) => log::run(args, &config),
        Commands::Clean(args) => clean::run(args, &config).await,
        Commands::History => commands::history::run(&config),
    }
}
