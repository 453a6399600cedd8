// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! SMP migration commands

use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::PathBuf;

use peppol_gateway_core::domain::gateway_config::MigrationConfig;
use peppol_gateway_core::domain::migration::MigrationToken;
use peppol_gateway_core::domain::network::should_interact_with_peppol_network;
use peppol_gateway_core::domain::participant::ParticipantId;
use peppol_gateway_core::infrastructure::MigrationTokenRetriever;

use super::{load_config, NetworkArgs};

#[derive(Subcommand)]
pub enum MigrationCommand {
    /// Fetch a one-time migration token for a participant
    Token {
        /// Participant ID (scheme:value)
        participant: String,

        #[command(flatten)]
        network: NetworkArgs,
    },
}

pub async fn handle_command(command: MigrationCommand, config_path: Option<PathBuf>) -> Result<()> {
    match command {
        MigrationCommand::Token {
            participant,
            network,
        } => {
            let config = load_config(config_path)?;
            let token = fetch_token(&config.spec.migration, &participant, network).await?;

            // Only the token goes to stdout so it can be piped
            println!("{}", token.as_str());
            Ok(())
        }
    }
}

pub async fn fetch_token(
    config: &MigrationConfig,
    participant: &str,
    network: NetworkArgs,
) -> Result<MigrationToken> {
    let participant = ParticipantId::parse(participant).context("Invalid participant ID")?;

    if !should_interact_with_peppol_network(&network.context()) {
        anyhow::bail!("Playground is isolated from the Peppol network; no migration token requested");
    }

    let token = MigrationTokenRetriever::new(config)
        .get_migration_token(&participant)
        .await?;
    Ok(token)
}
