// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Peppol Directory Client
//!
//! Free-text participant search against the live or test Peppol Directory.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Participant discovery and capability lookup
//! - **Integration:** `GET {host}/search/1.0/json?q=...` → typed results
//!
//! Directory data is filled in by third parties and is often incomplete, so
//! every nested field decodes with a default instead of failing the search.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::directory::{DirectorySearchResult, ParticipantDirectory};
use crate::domain::gateway_config::DirectoryConfig;
use crate::domain::network::{NetworkEnvironment, PeppolNetworkError};

// ============================================================================
// Wire Format
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    matches: Vec<Match>,
}

#[derive(Debug, Default, Deserialize)]
struct Match {
    #[serde(rename = "participantID", default)]
    participant_id: IdentifierValue,
    #[serde(default)]
    entities: Vec<Entity>,
    #[serde(rename = "docTypes", default)]
    doc_types: Vec<IdentifierValue>,
}

#[derive(Debug, Default, Deserialize)]
struct IdentifierValue {
    #[serde(default)]
    value: String,
}

#[derive(Debug, Default, Deserialize)]
struct Entity {
    #[serde(default)]
    name: Vec<EntityName>,
}

#[derive(Debug, Default, Deserialize)]
struct EntityName {
    #[serde(default)]
    name: String,
}

impl From<Match> for DirectorySearchResult {
    fn from(m: Match) -> Self {
        let name = m
            .entities
            .into_iter()
            .next()
            .and_then(|entity| entity.name.into_iter().next())
            .map(|n| n.name)
            .unwrap_or_default();

        Self {
            peppol_address: m.participant_id.value,
            name,
            supported_document_types: m.doc_types.into_iter().map(|dt| dt.value).collect(),
        }
    }
}

// ============================================================================
// Client Implementation
// ============================================================================

pub struct DirectoryClient {
    client: Client,
    config: DirectoryConfig,
}

impl DirectoryClient {
    pub fn new(config: DirectoryConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: DirectoryConfig) -> Self {
        Self { client, config }
    }

    fn search_url(&self, environment: NetworkEnvironment, query: &str) -> Result<url::Url, PeppolNetworkError> {
        let base = self.config.endpoint(environment).trim_end_matches('/');
        let mut url = url::Url::parse(&format!("{}/search/1.0/json", base))
            .map_err(|e| PeppolNetworkError::Transport(format!("Invalid directory endpoint '{}': {}", base, e)))?;
        url.query_pairs_mut().append_pair("q", query);
        Ok(url)
    }

    /// Search the directory and normalize the matches.
    pub async fn search_peppol_directory(
        &self,
        query: &str,
        use_test_network: bool,
    ) -> Result<Vec<DirectorySearchResult>, PeppolNetworkError> {
        let environment = NetworkEnvironment::from_test_flag(use_test_network);
        let url = self.search_url(environment, query)?;

        debug!(network = %environment, query = %query, "Searching Peppol directory");

        let result = self.fetch(url).await;
        let outcome = if result.is_ok() { "success" } else { "error" };
        metrics::counter!(
            "peppol_directory_search_total",
            "network" => environment.as_str(),
            "outcome" => outcome
        )
        .increment(1);

        match &result {
            Ok(results) => debug!(network = %environment, matches = results.len(), "Directory search completed"),
            Err(e) => warn!(network = %environment, error = %e, "Directory search failed"),
        }

        result
    }

    async fn fetch(&self, url: url::Url) -> Result<Vec<DirectorySearchResult>, PeppolNetworkError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(PeppolNetworkError::Protocol {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SearchResponse = serde_json::from_str(&body)
            .map_err(|e| PeppolNetworkError::MalformedResponse(format!("directory search: {}", e)))?;

        Ok(parsed.matches.into_iter().map(DirectorySearchResult::from).collect())
    }
}

#[async_trait]
impl ParticipantDirectory for DirectoryClient {
    async fn search(
        &self,
        query: &str,
        use_test_network: bool,
    ) -> Result<Vec<DirectorySearchResult>, PeppolNetworkError> {
        self.search_peppol_directory(query, use_test_network).await
    }
}

// ============================================================================
// Tests
// ============================================================================
