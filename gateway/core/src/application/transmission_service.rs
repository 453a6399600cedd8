// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Document Transmission Service
//!
//! Sequences one outbound document: network-mode gate, optional recipient
//! capability check against the directory, then a single AS4 send.
//!
//! An isolated playground never reaches the directory or either access
//! point; the send is suppressed before any client is invoked.

use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::directory::ParticipantDirectory;
use crate::domain::network::{should_interact_with_peppol_network, NetworkEnvironment, PeppolNetworkError};
use crate::domain::participant::ParticipantId;
use crate::domain::transmission::{As4Response, As4Transport, As4TransmissionRequest};

/// Result of a transmission request that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransmissionOutcome {
    /// The access point accepted the document
    Sent(As4Response),
    /// The team's context forbids network traffic; nothing left the system
    Suppressed,
}

#[derive(Debug, Error)]
pub enum TransmissionError {
    #[error("Recipient {receiver} does not accept document type {doc_type_id} on the {network} network")]
    RecipientNotCapable {
        receiver: String,
        doc_type_id: String,
        network: NetworkEnvironment,
    },

    #[error("Recipient verification requested but no directory is configured")]
    DirectoryUnavailable,

    #[error("Directory search failed: {0}")]
    Directory(#[source] PeppolNetworkError),

    #[error("Delivery failed: {0}")]
    Delivery(#[source] PeppolNetworkError),
}

pub struct DocumentTransmissionService {
    transport: Arc<dyn As4Transport>,
    directory: Option<Arc<dyn ParticipantDirectory>>,
}

impl DocumentTransmissionService {
    pub fn new(transport: Arc<dyn As4Transport>) -> Self {
        Self {
            transport,
            directory: None,
        }
    }

    pub fn with_directory(mut self, directory: Arc<dyn ParticipantDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Send one document, honoring the team's network mode.
    ///
    /// With `verify_recipient` the receiver must be listed in the directory
    /// with the request's document type before the AS4 send is attempted.
    pub async fn send(
        &self,
        request: &As4TransmissionRequest,
        verify_recipient: bool,
    ) -> Result<TransmissionOutcome, TransmissionError> {
        let ctx = &request.network_context;

        if !should_interact_with_peppol_network(ctx) {
            info!(
                receiver = %request.receiver_id,
                "Playground is isolated from the Peppol network; send suppressed"
            );
            return Ok(TransmissionOutcome::Suppressed);
        }

        if verify_recipient {
            self.verify_recipient(request).await?;
        }

        let response = self
            .transport
            .send(request)
            .await
            .map_err(TransmissionError::Delivery)?;

        Ok(TransmissionOutcome::Sent(response))
    }

    async fn verify_recipient(&self, request: &As4TransmissionRequest) -> Result<(), TransmissionError> {
        let directory = self
            .directory
            .as_ref()
            .ok_or(TransmissionError::DirectoryUnavailable)?;

        let ctx = &request.network_context;
        let receiver = request.receiver_id.to_string();

        let results = directory
            .search(&receiver, ctx.uses_test_network())
            .await
            .map_err(TransmissionError::Directory)?;

        let capable = results.iter().any(|result| {
            ParticipantId::parse(&result.peppol_address).ok().as_ref() == Some(&request.receiver_id)
                && result.supports_document_type(&request.doc_type_id)
        });

        if !capable {
            warn!(
                receiver = %receiver,
                network = %ctx.environment(),
                "Recipient cannot receive this document type"
            );
            return Err(TransmissionError::RecipientNotCapable {
                receiver,
                doc_type_id: request.doc_type_id.clone(),
                network: ctx.environment(),
            });
        }

        Ok(())
    }
}
