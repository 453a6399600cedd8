// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// AS4 Access Point Adapter
//
// Anti-Corruption Layer for the access-point gateway that wraps outgoing UBL
// documents in AS4 and pushes them onto the Peppol network.
//
// One POST per call. No retries, no receipt handling: the AS4 business
// acknowledgement is a separate exchange owned by the caller.

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::domain::gateway_config::ResolvedAccessPoints;
use crate::domain::network::{should_interact_with_peppol_network, PeppolNetworkError};
use crate::domain::transmission::{As4Response, As4Transport, As4TransmissionRequest};

/// Everything except the unreserved marks left alone by `encodeURIComponent`.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

/// Path of the gateway's send endpoint for one request.
///
/// Each identifier is encoded on its own so that `:` and `/` inside Peppol
/// identifiers never split or merge path segments.
pub fn send_path(request: &As4TransmissionRequest) -> String {
    format!(
        "/sendas4/{}/{}/{}/{}/{}",
        encode_segment(&request.sender_id.to_string()),
        encode_segment(&request.receiver_id.to_string()),
        encode_segment(&request.doc_type_id),
        encode_segment(&request.process_id),
        encode_segment(&request.country_c1),
    )
}

pub struct As4Client {
    client: Client,
    access_points: ResolvedAccessPoints,
}

impl As4Client {
    pub fn new(access_points: ResolvedAccessPoints) -> Self {
        Self::with_client(Client::new(), access_points)
    }

    pub fn with_client(client: Client, access_points: ResolvedAccessPoints) -> Self {
        Self {
            client,
            access_points,
        }
    }

    /// Send the document to the access point selected by the request's
    /// network context.
    ///
    /// An isolated playground context fails with
    /// [`PeppolNetworkError::NetworkDisabled`] before any endpoint is chosen.
    pub async fn send_as4(&self, request: &As4TransmissionRequest) -> Result<As4Response, PeppolNetworkError> {
        if !should_interact_with_peppol_network(&request.network_context) {
            debug!(receiver = %request.receiver_id, "AS4 send refused for isolated context");
            return Err(PeppolNetworkError::NetworkDisabled);
        }

        let environment = request.network_context.environment();
        let access_point = self.access_points.select(environment);
        let url = format!("{}{}", access_point.endpoint.trim_end_matches('/'), send_path(request));

        info!(
            network = %environment,
            sender = %request.sender_id,
            receiver = %request.receiver_id,
            country = %request.country_c1,
            "Sending AS4 document"
        );

        let result = self.post(&url, &access_point.token, &request.body).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(PeppolNetworkError::Transport(_)) => "transport_error",
            Err(_) => "rejected",
        };
        metrics::counter!(
            "peppol_as4_send_total",
            "network" => environment.as_str(),
            "outcome" => outcome
        )
        .increment(1);

        match &result {
            Ok(response) => info!(
                network = %environment,
                receiver = %request.receiver_id,
                status = response.status,
                "AS4 document accepted by access point"
            ),
            Err(e) => warn!(
                network = %environment,
                receiver = %request.receiver_id,
                error = %e,
                "AS4 send failed"
            ),
        }

        result
    }

    async fn post(&self, url: &str, token: &str, body: &str) -> Result<As4Response, PeppolNetworkError> {
        let response = self
            .client
            .post(url)
            .header("X-Token", token)
            .header("Content-Type", "application/xml")
            .body(body.to_string())
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(PeppolNetworkError::Protocol {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(As4Response {
            status: status.as_u16(),
            body: text,
        })
    }
}

#[async_trait]
impl As4Transport for As4Client {
    async fn send(&self, request: &As4TransmissionRequest) -> Result<As4Response, PeppolNetworkError> {
        self.send_as4(request).await
    }
}
