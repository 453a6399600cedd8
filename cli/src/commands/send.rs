// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! AS4 send command

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use peppol_gateway_core::application::{DocumentTransmissionService, TransmissionOutcome};
use peppol_gateway_core::domain::gateway_config::GatewayConfig;
use peppol_gateway_core::domain::network::should_interact_with_peppol_network;
use peppol_gateway_core::domain::participant::ParticipantId;
use peppol_gateway_core::domain::transmission::As4TransmissionRequest;
use peppol_gateway_core::infrastructure::{As4Client, DirectoryClient};

use super::{load_config, NetworkArgs};

#[derive(Args)]
pub struct SendArgs {
    /// Sender participant ID (scheme:value)
    #[arg(long)]
    pub sender: String,

    /// Receiver participant ID (scheme:value)
    #[arg(long)]
    pub receiver: String,

    /// Peppol document type identifier
    #[arg(long)]
    pub doc_type: String,

    /// Peppol process identifier
    #[arg(long)]
    pub process: String,

    /// Sender country code (C1), e.g. BE
    #[arg(long)]
    pub country: String,

    /// UBL document to send
    #[arg(long, value_name = "XML")]
    pub file: PathBuf,

    /// Check the receiver in the directory before sending
    #[arg(long)]
    pub verify_recipient: bool,

    #[command(flatten)]
    pub network: NetworkArgs,
}

pub async fn handle_command(args: SendArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    let request = build_request(&args)?;

    let outcome = send(&config.spec, &request, args.verify_recipient).await?;

    match outcome {
        TransmissionOutcome::Sent(response) => {
            println!(
                "{}",
                format!(
                    "✓ Document accepted by the {} access point (HTTP {})",
                    request.network_context.environment(),
                    response.status
                )
                .green()
            );
            if !response.body.trim().is_empty() {
                println!("{}", response.body.trim());
            }
        }
        TransmissionOutcome::Suppressed => {
            println!(
                "{}",
                "Playground is isolated from the Peppol network; nothing was sent.".yellow()
            );
        }
    }

    Ok(())
}

pub fn build_request(args: &SendArgs) -> Result<As4TransmissionRequest> {
    let sender_id = ParticipantId::parse(&args.sender).context("Invalid --sender")?;
    let receiver_id = ParticipantId::parse(&args.receiver).context("Invalid --receiver")?;
    let body = read_document(&args.file)?;

    Ok(As4TransmissionRequest {
        sender_id,
        receiver_id,
        doc_type_id: args.doc_type.trim().to_string(),
        process_id: args.process.trim().to_string(),
        country_c1: args.country.trim().to_ascii_uppercase(),
        body,
        network_context: args.network.context(),
    })
}

fn read_document(path: &Path) -> Result<String> {
    let body = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read document {:?}", path))?;
    if body.trim().is_empty() {
        anyhow::bail!("Document {:?} is empty", path);
    }
    Ok(body)
}

pub async fn send(
    config: &GatewayConfig,
    request: &As4TransmissionRequest,
    verify_recipient: bool,
) -> Result<TransmissionOutcome> {
    // Isolated playgrounds need no endpoint or credentials
    if !should_interact_with_peppol_network(&request.network_context) {
        debug!(receiver = %request.receiver_id, "Send suppressed for isolated playground");
        return Ok(TransmissionOutcome::Suppressed);
    }

    let access_points = config
        .access_point
        .resolve()
        .context("Failed to resolve access-point credentials")?;

    let environment = request.network_context.environment();
    if access_points.select(environment).endpoint.is_empty() {
        anyhow::bail!("No {} access-point endpoint configured", environment);
    }

    debug!(
        sender = %request.sender_id,
        receiver = %request.receiver_id,
        network = %environment,
        verify_recipient,
        "Sending document"
    );

    let service = DocumentTransmissionService::new(Arc::new(As4Client::new(access_points)))
        .with_directory(Arc::new(DirectoryClient::new(config.directory.clone())));

    service
        .send(request, verify_recipient)
        .await
        .context("Delivery failed")
}
