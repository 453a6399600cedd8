// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the Peppol gateway CLI

pub mod cert;
pub mod config;
pub mod directory;
pub mod migration;
pub mod policy;
pub mod send;

pub use self::cert::CertCommand;
pub use self::config::ConfigCommand;
pub use self::directory::DirectoryCommand;
pub use self::migration::MigrationCommand;
pub use self::policy::PolicyCommand;
pub use self::send::SendArgs;

use anyhow::{Context, Result};
use clap::Args;
use peppol_gateway_core::domain::gateway_config::GatewayConfigManifest;
use peppol_gateway_core::domain::network::NetworkContext;
use std::path::PathBuf;

/// Load the gateway configuration (explicit path, discovery, or defaults).
pub(crate) fn load_config(config_path: Option<PathBuf>) -> Result<GatewayConfigManifest> {
    GatewayConfigManifest::load_or_default(config_path).context("Failed to load configuration")
}

/// Team network flags shared by commands that may touch the network.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct NetworkArgs {
    /// Act as a playground team
    #[arg(long)]
    pub playground: bool,

    /// Let the playground use the Peppol test network
    #[arg(long)]
    pub test_network: bool,
}

impl NetworkArgs {
    pub fn context(&self) -> NetworkContext {
        NetworkContext::new(self.playground, self.test_network)
    }
}
