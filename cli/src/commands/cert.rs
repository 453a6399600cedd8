// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! AS4 certificate commands

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use peppol_gateway_core::domain::certificate::{to_iso8601, CertificateStatus};
use peppol_gateway_core::infrastructure::CertificateTrustCache;

use super::load_config;

#[derive(Subcommand)]
pub enum CertCommand {
    /// Report when a stored AS4 certificate expires
    Expiry {
        /// Base64 DER certificate, or @path to a file containing one
        input: String,

        /// Print the assessment as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn handle_command(command: CertCommand, config_path: Option<PathBuf>) -> Result<()> {
    match command {
        CertCommand::Expiry { input, json } => {
            let config = load_config(config_path)?;
            let certificate = read_certificate_input(&input)?;

            let cache = CertificateTrustCache::new();
            let status = cache.assess(
                &certificate,
                Utc::now(),
                config.spec.certificates.warning_window(),
            );

            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                print_status(&status);
            }
            Ok(())
        }
    }
}

/// Resolve the `input` argument: inline Base64, or `@file`.
pub fn read_certificate_input(input: &str) -> Result<String> {
    match input.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read certificate file {}", path)),
        None => Ok(input.to_string()),
    }
}

fn print_status(status: &CertificateStatus) {
    match status {
        CertificateStatus::Valid { expires_at } => {
            println!("{} expires {}", "✓ Valid".green(), to_iso8601(expires_at));
        }
        CertificateStatus::ExpiringSoon {
            expires_at,
            days_remaining,
        } => {
            println!(
                "{} expires {} ({} day(s) left)",
                "⚠ Expiring soon".yellow(),
                to_iso8601(expires_at),
                days_remaining
            );
        }
        CertificateStatus::Expired { expires_at } => {
            println!("{} since {}", "✗ Expired".red(), to_iso8601(expires_at));
        }
        CertificateStatus::Unparseable => {
            println!("{}", "✗ Not a readable X.509 certificate".red());
        }
    }
}
