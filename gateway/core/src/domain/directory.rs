// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Participant directory port
//!
//! Implemented by `infrastructure::directory_client`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::network::PeppolNetworkError;

/// A participant returned by a directory search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorySearchResult {
    /// Participant ID (`scheme:value`)
    pub peppol_address: String,
    /// First registered business entity name, empty when unknown
    pub name: String,
    /// Document type identifiers the participant accepts, in directory order
    pub supported_document_types: Vec<String>,
}

impl DirectorySearchResult {
    pub fn supports_document_type(&self, doc_type_id: &str) -> bool {
        self.supported_document_types
            .iter()
            .any(|dt| dt == doc_type_id || strip_doctype_scheme(dt) == strip_doctype_scheme(doc_type_id))
    }
}

/// Directory entries may carry the `busdox-docid-qns::` scheme prefix.
fn strip_doctype_scheme(doc_type_id: &str) -> &str {
    doc_type_id
        .strip_prefix("busdox-docid-qns::")
        .unwrap_or(doc_type_id)
}

#[async_trait]
pub trait ParticipantDirectory: Send + Sync {
    /// Free-text search against the live or test directory.
    async fn search(
        &self,
        query: &str,
        use_test_network: bool,
    ) -> Result<Vec<DirectorySearchResult>, PeppolNetworkError>;
}
