// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Policy evaluation commands
//!
//! Commands: network, smp

use anyhow::Result;
use clap::{Subcommand, ValueEnum};
use colored::Colorize;
use serde_json::json;

use peppol_gateway_core::domain::network::should_interact_with_peppol_network;
use peppol_gateway_core::domain::registration::{should_register_with_smp, VerificationRequirement};

use super::NetworkArgs;

#[derive(Subcommand)]
pub enum PolicyCommand {
    /// Whether a team may talk to the Peppol network, and which one
    Network {
        #[command(flatten)]
        network: NetworkArgs,
    },

    /// Whether a participant should be published in the SMP
    Smp {
        #[command(flatten)]
        network: NetworkArgs,

        /// The participant receives documents through this access point
        #[arg(long)]
        recipient: bool,

        /// The team passed verification
        #[arg(long)]
        verified: bool,

        /// Verification requirement of the team
        #[arg(long, value_enum, default_value_t = RequirementArg::Lax)]
        requirement: RequirementArg,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RequirementArg {
    Lax,
    Strict,
}

impl From<RequirementArg> for VerificationRequirement {
    fn from(value: RequirementArg) -> Self {
        match value {
            RequirementArg::Lax => VerificationRequirement::Lax,
            RequirementArg::Strict => VerificationRequirement::Strict,
        }
    }
}

pub async fn handle_command(command: PolicyCommand) -> Result<()> {
    let decision = evaluate(&command);
    println!("{}", serde_json::to_string_pretty(&decision)?);

    let allowed = decision["allowed"].as_bool().unwrap_or(false);
    let verdict = if allowed { "allowed".green() } else { "denied".red() };
    eprintln!("{}", verdict.bold());
    Ok(())
}

/// Evaluate a policy command into a JSON decision record.
pub fn evaluate(command: &PolicyCommand) -> serde_json::Value {
    match command {
        PolicyCommand::Network { network } => {
            let ctx = network.context();
            let allowed = should_interact_with_peppol_network(&ctx);
            json!({
                "policy": "network",
                "allowed": allowed,
                "network": allowed.then(|| ctx.environment().as_str()),
            })
        }
        PolicyCommand::Smp {
            network,
            recipient,
            verified,
            requirement,
        } => {
            let ctx = network.context();
            let requirement = VerificationRequirement::from(*requirement);
            let allowed = should_register_with_smp(&ctx, *recipient, *verified, requirement);
            json!({
                "policy": "smp",
                "allowed": allowed,
                "network": ctx.environment().as_str(),
                "requirement": requirement.as_str(),
            })
        }
    }
}
