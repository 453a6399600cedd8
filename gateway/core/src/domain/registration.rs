// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! SMP Registration Policy
//!
//! Decides whether a participant should be published in the Service Metadata
//! Publisher. The decision is recomputed on every registration-relevant event
//! (verification completed, plan change, team extension update) and is never
//! stored.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Verification-gated SMP publication policy

use serde::{Deserialize, Serialize};
use std::fmt;

use super::network::{should_interact_with_peppol_network, NetworkContext};

/// How strictly a team's verification status gates SMP registration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationRequirement {
    /// Registration does not wait for verification
    #[default]
    Lax,
    /// Registration requires a positive verification outcome
    Strict,
}

impl VerificationRequirement {
    /// Reads a stored requirement value.
    ///
    /// Only `"strict"` is strict; missing or unknown values are lax.
    ///
    /// Matching ignores ASCII case and surrounding whitespace, so stored
    /// variants such as `" Strict "` also count as strict. A stray spelling
    /// therefore tightens the gate rather than silently relaxing it.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("strict") => Self::Strict,
            _ => Self::Lax,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lax => "lax",
            Self::Strict => "strict",
        }
    }
}

impl fmt::Display for VerificationRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true when the participant should be registered with the SMP.
///
/// All three must hold: the context may interact with the network, the
/// participant receives documents through this access point, and either the
/// requirement is not strict or the team is verified.
pub fn should_register_with_smp(
    ctx: &NetworkContext,
    is_smp_recipient: bool,
    is_verified: bool,
    requirement: VerificationRequirement,
) -> bool {
    should_interact_with_peppol_network(ctx)
        && is_smp_recipient
        && (requirement != VerificationRequirement::Strict || is_verified)
}
