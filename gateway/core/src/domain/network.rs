// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Network Mode Resolver
//!
//! Decides whether a team may touch the Peppol network at all, and which
//! network (live or test) its traffic goes to. Every network-facing
//! operation consults [`should_interact_with_peppol_network`] first.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Environment isolation gate for outbound Peppol traffic

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Per-request view of a team's network settings.
///
/// Built from the team extension record for each request and never persisted.
/// `use_test_network` only has meaning inside a playground; production teams
/// always talk to the live network.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkContext {
    pub is_playground: bool,
    #[serde(default)]
    pub use_test_network: bool,
}

impl NetworkContext {
    pub fn new(is_playground: bool, use_test_network: bool) -> Self {
        Self {
            is_playground,
            use_test_network,
        }
    }

    /// Production context: always the live network.
    pub fn production() -> Self {
        Self::new(false, false)
    }

    /// Playground context, optionally attached to the test network.
    pub fn playground(use_test_network: bool) -> Self {
        Self::new(true, use_test_network)
    }

    /// Whether traffic for this context targets the test network.
    ///
    /// The flag is ignored outside a playground.
    pub fn uses_test_network(&self) -> bool {
        self.is_playground && self.use_test_network
    }

    /// Network that outbound traffic for this context is routed to.
    ///
    /// An isolated playground maps to `Live` here but has no route at all;
    /// callers check [`should_interact_with_peppol_network`] before sending.
    pub fn environment(&self) -> NetworkEnvironment {
        NetworkEnvironment::from_test_flag(self.uses_test_network())
    }
}

/// Returns true when the context is allowed to produce any Peppol traffic.
///
/// Production always interacts with the live network. A playground is fully
/// isolated unless it opted into the test network.
pub fn should_interact_with_peppol_network(ctx: &NetworkContext) -> bool {
    if !ctx.is_playground {
        return true;
    }
    ctx.use_test_network
}

/// Live or test Peppol network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkEnvironment {
    Live,
    Test,
}

impl NetworkEnvironment {
    pub fn from_test_flag(use_test_network: bool) -> Self {
        if use_test_network {
            Self::Test
        } else {
            Self::Live
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Test => "test",
        }
    }
}

impl fmt::Display for NetworkEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by clients that call the directory or an access point.
#[derive(Debug, Error)]
pub enum PeppolNetworkError {
    /// Connection, DNS or TLS failure before an HTTP response was received
    #[error("Transport error: {0}")]
    Transport(String),

    /// The remote answered with a non-2xx status
    #[error("HTTP {status}: {body}")]
    Protocol { status: u16, body: String },

    /// The remote answered 2xx but the body could not be decoded
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The context is isolated from the Peppol network; nothing was sent
    #[error("Network interaction is disabled for this context")]
    NetworkDisabled,
}

impl PeppolNetworkError {
    /// HTTP status of the failed exchange, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Protocol { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for PeppolNetworkError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
