// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Peppol Gateway CLI
//!
//! The `peppol` binary gives operators direct access to the gateway's
//! routing and trust primitives.
//!
//! ## Commands
//!
//! - `peppol directory search` - Participant discovery (live or test directory)
//! - `peppol send` - Transmit a UBL document over AS4
//! - `peppol cert expiry` - Inspect a stored AS4 certificate
//! - `peppol migration token` - Fetch an SMP migration token
//! - `peppol policy network|smp` - Evaluate network and registration policy
//! - `peppol config show|validate|generate` - Configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use peppol_gateway::commands::{
    self, CertCommand, ConfigCommand, DirectoryCommand, MigrationCommand, PolicyCommand, SendArgs,
};
use peppol_gateway::logging::LogSettings;
use peppol_gateway_core::domain::gateway_config::GatewayConfigManifest;

/// Peppol Gateway - network routing, trust and transmission
#[derive(Parser)]
#[command(name = "peppol")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "PEPPOL_GATEWAY_CONFIG",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error) [default: config, then warn]
    #[arg(long, global = true, env = "PEPPOL_LOG_LEVEL")]
    log_level: Option<String>,

    /// Emit logs as JSON (also enabled by `format: json` in the config)
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Peppol Directory lookups
    #[command(name = "directory")]
    Directory {
        #[command(subcommand)]
        command: DirectoryCommand,
    },

    /// Send a document over AS4
    #[command(name = "send")]
    Send(SendArgs),

    /// AS4 certificate inspection
    #[command(name = "cert")]
    Cert {
        #[command(subcommand)]
        command: CertCommand,
    },

    /// SMP participant migration
    #[command(name = "migration")]
    Migration {
        #[command(subcommand)]
        command: MigrationCommand,
    },

    /// Evaluate routing and registration policy
    #[command(name = "policy")]
    Policy {
        #[command(subcommand)]
        command: PolicyCommand,
    },

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is normal
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Logging is not up yet; a broken config is reported again by the command
    let config = GatewayConfigManifest::load_or_default(cli.config.clone()).ok();
    let settings = LogSettings::resolve(cli.log_level.as_deref(), cli.json_logs, config.as_ref());
    init_logging(&settings.level, settings.json)?;

    match cli.command {
        Commands::Directory { command } => commands::directory::handle_command(command, cli.config).await,
        Commands::Send(args) => commands::send::handle_command(args, cli.config).await,
        Commands::Cert { command } => commands::cert::handle_command(command, cli.config).await,
        Commands::Migration { command } => commands::migration::handle_command(command, cli.config).await,
        Commands::Policy { command } => commands::policy::handle_command(command).await,
        Commands::Config { command } => commands::config::handle_command(command, cli.config).await,
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if json {
        builder.json().init();
    } else {
        builder.compact().init();
    }

    Ok(())
}
