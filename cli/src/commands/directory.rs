// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Peppol Directory commands
//!
//! Commands: search

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use peppol_gateway_core::domain::directory::DirectorySearchResult;
use peppol_gateway_core::domain::gateway_config::DirectoryConfig;
use peppol_gateway_core::infrastructure::DirectoryClient;

use super::load_config;

#[derive(Subcommand)]
pub enum DirectoryCommand {
    /// Free-text participant search
    Search {
        /// Name, participant ID or other search text
        query: String,

        /// Query the test directory instead of the live one
        #[arg(long)]
        test: bool,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn handle_command(command: DirectoryCommand, config_path: Option<PathBuf>) -> Result<()> {
    match command {
        DirectoryCommand::Search { query, test, json } => {
            let config = load_config(config_path)?;
            let results = search(&config.spec.directory, &query, test).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                print_results(&results, test);
            }
            Ok(())
        }
    }
}

pub async fn search(
    config: &DirectoryConfig,
    query: &str,
    use_test_network: bool,
) -> Result<Vec<DirectorySearchResult>> {
    let client = DirectoryClient::new(config.clone());
    client
        .search_peppol_directory(query, use_test_network)
        .await
        .context("Directory search failed")
}

fn print_results(results: &[DirectorySearchResult], test: bool) {
    let network = if test { "test" } else { "live" };

    if results.is_empty() {
        println!("{}", format!("No participants found on the {} directory", network).yellow());
        return;
    }

    println!("{}", format!("{} participant(s) on the {} directory:", results.len(), network).bold());
    for result in results {
        let name = if result.name.is_empty() {
            "(unnamed)".dimmed().to_string()
        } else {
            result.name.clone()
        };
        println!("  {}  {}", result.peppol_address.bold(), name);
        for doc_type in &result.supported_document_types {
            println!("      - {}", doc_type);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_search_against_configured_directory() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search/1.0/json")
            .match_query(Matcher::UrlEncoded("q".into(), "acme".into()))
            .with_status(200)
            .with_body(r#"{"matches":[{"participantID":{"value":"0208:123"},"entities":[],"docTypes":[]}]}"#)
            .create_async()
            .await;

        let config = DirectoryConfig {
            live_endpoint: "http://127.0.0.1:9".to_string(),
            test_endpoint: server.url(),
        };
        let results = search(&config, "acme", true).await.unwrap();

        mock.assert_async().await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].peppol_address, "0208:123");
        assert_eq!(results[0].name, "");
    }
}
