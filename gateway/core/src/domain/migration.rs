// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! SMP migration tokens
//!
//! Moving a participant identifier from another access point requires a
//! one-time migration token issued by the SMP registry. The token is handed
//! straight to the caller and never stored.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use super::participant::ParticipantId;

/// One-time token authorizing a participant identifier migration.
#[derive(Clone, PartialEq, Eq)]
pub struct MigrationToken(String);

impl MigrationToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

// Tokens are credentials; keep them out of debug logs.
impl fmt::Debug for MigrationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MigrationToken(***)")
    }
}

/// What actually went wrong while fetching a token. Kept for logs; callers
/// show the [`MigrationLookupError`] message instead.
#[derive(Debug, Error)]
pub enum MigrationFailure {
    #[error("failed to start migration utility: {0}")]
    Spawn(String),

    #[error("migration utility did not finish within {0:?}")]
    Timeout(Duration),

    #[error("migration utility exited with {code:?}: {stderr}")]
    ExitStatus { code: Option<i32>, stderr: String },

    #[error("malformed registry response: {0}")]
    MalformedXml(String),

    #[error("registry response has no MigrationToken element")]
    MissingToken,
}

/// The single error surfaced for every migration token failure.
///
/// The dominant real-world cause is a participant that is still registered
/// with another access point, so the message says so.
#[derive(Debug, Error)]
#[error(
    "Unable to retrieve a migration token for {participant}. The participant is very likely \
     already registered at a different access point. Please confirm the registration with \
     that provider before retrying."
)]
pub struct MigrationLookupError {
    participant: String,
    #[source]
    failure: MigrationFailure,
}

impl MigrationLookupError {
    pub fn new(participant: impl Into<String>, failure: MigrationFailure) -> Self {
        Self {
            participant: participant.into(),
            failure,
        }
    }

    pub fn participant(&self) -> &str {
        &self.participant
    }

    pub fn failure(&self) -> &MigrationFailure {
        &self.failure
    }
}

/// Source of migration tokens (the external registry utility in production).
#[async_trait]
pub trait MigrationTokenSource: Send + Sync {
    async fn get_migration_token(
        &self,
        participant: &ParticipantId,
    ) -> Result<MigrationToken, MigrationLookupError>;
}
