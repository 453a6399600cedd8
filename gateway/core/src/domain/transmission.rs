// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! AS4 Transmission
//!
//! Request/response types for handing a document to an access point, and the
//! transport port the application layer sends through.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Anti-corruption boundary around the access-point gateway

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::network::{NetworkContext, PeppolNetworkError};
use super::participant::ParticipantId;

/// One document to be sent over AS4.
///
/// Sender and receiver travel in their normalized [`ParticipantId`] form
/// (`scheme:value`, lower-case scheme, no `iso6523-actorid-upis::` prefix),
/// not as the caller originally spelled them. The other identifiers are sent
/// as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct As4TransmissionRequest {
    pub sender_id: ParticipantId,
    pub receiver_id: ParticipantId,
    /// Peppol document type identifier
    pub doc_type_id: String,
    /// Peppol process identifier
    pub process_id: String,
    /// ISO 3166-1 alpha-2 country of the sender (C1)
    pub country_c1: String,
    /// UBL document produced by the authoring service
    pub body: String,
    pub network_context: NetworkContext,
}

/// Access point answer to a successful (2xx) send.
///
/// This is only the gateway's HTTP acknowledgement; the AS4 business receipt
/// arrives separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct As4Response {
    pub status: u16,
    pub body: String,
}

/// Outbound AS4 transport.
#[async_trait]
pub trait As4Transport: Send + Sync {
    /// Performs exactly one send attempt.
    async fn send(&self, request: &As4TransmissionRequest) -> Result<As4Response, PeppolNetworkError>;
}
