// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use peppol_gateway_core::domain::gateway_config::{AccessPointEndpoint, GatewayConfigManifest};

use super::load_config;

const MINIMAL_TEMPLATE: &str = include_str!("../../templates/config-minimal.yaml");

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path
        #[arg(short, long, default_value = "./peppol-gateway.yaml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate { output, force } => generate(output, force).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let config = load_config(config_override.clone())?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!("  2. ./peppol-gateway.yaml");
        println!("  3. ~/.peppol-gateway/config.yaml");
        println!("  4. /etc/peppol-gateway/config.yaml");
        println!();
    }

    println!("{}", "Current configuration:".bold());
    println!("  Name: {}", config.metadata.name);
    println!();

    let spec = &config.spec;
    println!("{}", "Access points:".bold());
    print_access_point("live", &spec.access_point.live);
    print_access_point("test", &spec.access_point.test);
    println!();

    println!("{}", "Directory:".bold());
    println!("  live: {}", spec.directory.live_endpoint);
    println!("  test: {}", spec.directory.test_endpoint);
    println!();

    println!("{}", "Migration utility:".bold());
    println!("  Command: {} {}", spec.migration.command, spec.migration.args.join(" "));
    println!("  Timeout: {}s", spec.migration.timeout_seconds);
    println!();

    println!("{}", "Certificates:".bold());
    println!("  Expiry warning: {} day(s)", spec.certificates.expiry_warning_days);

    Ok(())
}

fn print_access_point(label: &str, endpoint: &AccessPointEndpoint) {
    let url = if endpoint.endpoint.is_empty() {
        "(not set)".dimmed().to_string()
    } else {
        endpoint.endpoint.clone()
    };
    println!("  {}: {}", label, url);
    println!("    Token: {}", describe_token(endpoint.token.as_deref()));
}

/// Token values are never printed; `env:` references are shown by name.
fn describe_token(token: Option<&str>) -> String {
    match token {
        None => "(not set)".to_string(),
        Some(t) if t.starts_with("env:") => t.to_string(),
        Some(_) => "***".to_string(),
    }
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = load_config(config_path)?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

async fn generate(output: PathBuf, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", output.display());
    }

    std::fs::write(&output, MINIMAL_TEMPLATE)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_is_valid() {
        let manifest = GatewayConfigManifest::from_yaml_str(MINIMAL_TEMPLATE).unwrap();
        manifest.validate().unwrap();
        assert_eq!(manifest.spec.migration.timeout_seconds, 30);
        assert_eq!(
            manifest.spec.access_point.live.token.as_deref(),
            Some("env:PEPPOL_AP_TOKEN")
        );
    }

    #[test]
    fn test_token_is_masked() {
        assert_eq!(describe_token(Some("secret")), "***");
        assert_eq!(describe_token(Some("env:PEPPOL_AP_TOKEN")), "env:PEPPOL_AP_TOKEN");
        assert_eq!(describe_token(None), "(not set)");
    }

    #[tokio::test]
    async fn test_generate_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("peppol-gateway.yaml");

        generate(path.clone(), false).await.unwrap();
        assert!(generate(path.clone(), false).await.is_err());
        generate(path.clone(), true).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, MINIMAL_TEMPLATE);
    }

    #[tokio::test]
    async fn test_validate_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(
            &path,
            "apiVersion: peppol-gateway/v1\nkind: GatewayConfig\nmetadata:\n  name: n\nspec: {}\n",
        )
        .unwrap();

        let err = validate(Some(path)).await.unwrap_err();
        assert!(format!("{err:#}").contains("access_point.live.endpoint"));
    }
}
