// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Log level and format selection for the CLI
//!
//! Command-line flags win, then `spec.observability.logging` from the
//! gateway configuration, then the built-in default. `RUST_LOG` still
//! overrides the level filter when set.

use peppol_gateway_core::domain::gateway_config::GatewayConfigManifest;

pub const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: String,
    pub json: bool,
}

impl LogSettings {
    pub fn resolve(
        cli_level: Option<&str>,
        cli_json: bool,
        config: Option<&GatewayConfigManifest>,
    ) -> Self {
        let logging = config
            .and_then(|c| c.spec.observability.as_ref())
            .and_then(|o| o.logging.as_ref());

        let level = cli_level
            .map(str::to_string)
            .or_else(|| logging.map(|l| l.level.clone()))
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        let json = cli_json || logging.is_some_and(|l| l.format.eq_ignore_ascii_case("json"));

        Self { level, json }
    }
}
