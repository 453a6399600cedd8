// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! SMP Registration Service
//!
//! Re-evaluates the SMP registration policy whenever something relevant
//! changes (verification completed, plan change, team extension update) and
//! drives the registrar toward the decision. Deciding and performing the SMP
//! call are separate steps; either can fail independently and nothing here
//! is cached between calls.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::migration::{MigrationLookupError, MigrationToken, MigrationTokenSource};
use crate::domain::network::{should_interact_with_peppol_network, NetworkContext, NetworkEnvironment, PeppolNetworkError};
use crate::domain::participant::ParticipantId;
use crate::domain::registration::{should_register_with_smp, VerificationRequirement};

/// Performs the actual SMP publication calls.
#[async_trait]
pub trait SmpRegistrar: Send + Sync {
    async fn register(
        &self,
        participant: &ParticipantId,
        network: NetworkEnvironment,
    ) -> Result<(), PeppolNetworkError>;

    async fn unregister(
        &self,
        participant: &ParticipantId,
        network: NetworkEnvironment,
    ) -> Result<(), PeppolNetworkError>;
}

/// Everything the policy needs to know about one participant, read fresh
/// from the team extension and verification subsystem for each event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationInputs {
    pub network_context: NetworkContext,
    pub is_smp_recipient: bool,
    pub is_verified: bool,
    pub verification_requirement: VerificationRequirement,
    /// Whether the participant is currently published in the SMP
    pub currently_registered: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationAction {
    Registered,
    Unregistered,
    Unchanged,
}

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("SMP call failed: {0}")]
    Smp(#[source] PeppolNetworkError),

    #[error("Network interaction is disabled for this team")]
    NetworkDisabled,

    #[error(transparent)]
    Migration(#[from] MigrationLookupError),
}

pub struct SmpRegistrationService {
    registrar: Arc<dyn SmpRegistrar>,
    migrations: Arc<dyn MigrationTokenSource>,
}

impl SmpRegistrationService {
    pub fn new(registrar: Arc<dyn SmpRegistrar>, migrations: Arc<dyn MigrationTokenSource>) -> Self {
        Self {
            registrar,
            migrations,
        }
    }

    /// Bring the participant's SMP registration in line with current policy.
    pub async fn reconcile(
        &self,
        participant: &ParticipantId,
        inputs: &RegistrationInputs,
    ) -> Result<RegistrationAction, RegistrationError> {
        let ctx = &inputs.network_context;
        let network = ctx.environment();
        let should_register = should_register_with_smp(
            ctx,
            inputs.is_smp_recipient,
            inputs.is_verified,
            inputs.verification_requirement,
        );

        match (should_register, inputs.currently_registered) {
            (true, false) => {
                self.registrar
                    .register(participant, network)
                    .await
                    .map_err(RegistrationError::Smp)?;
                info!(participant = %participant, network = %network, "Participant registered with SMP");
                Ok(RegistrationAction::Registered)
            }
            (false, true) => {
                if !should_interact_with_peppol_network(ctx) {
                    // Isolated playground: no traffic at all, not even a deregistration
                    warn!(
                        participant = %participant,
                        "Participant still registered but network access is disabled; leaving registration untouched"
                    );
                    return Ok(RegistrationAction::Unchanged);
                }
                self.registrar
                    .unregister(participant, network)
                    .await
                    .map_err(RegistrationError::Smp)?;
                info!(participant = %participant, network = %network, "Participant removed from SMP");
                Ok(RegistrationAction::Unregistered)
            }
            _ => Ok(RegistrationAction::Unchanged),
        }
    }

    /// Obtain a migration token for a participant moving in from another
    /// access point. The token must be consumed by the caller right away.
    pub async fn prepare_migration(
        &self,
        participant: &ParticipantId,
        ctx: &NetworkContext,
    ) -> Result<MigrationToken, RegistrationError> {
        if !should_interact_with_peppol_network(ctx) {
            return Err(RegistrationError::NetworkDisabled);
        }

        Ok(self.migrations.get_migration_token(participant).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::migration::MigrationFailure;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingRegistrar {
        calls: Mutex<Vec<(&'static str, String, NetworkEnvironment)>>,
        fail: bool,
    }

    #[async_trait]
    impl SmpRegistrar for RecordingRegistrar {
        async fn register(
            &self,
            participant: &ParticipantId,
            network: NetworkEnvironment,
        ) -> Result<(), PeppolNetworkError> {
            self.calls.lock().unwrap().push(("register", participant.to_string(), network));
            if self.fail {
                return Err(PeppolNetworkError::Protocol {
                    status: 409,
                    body: "exists".to_string(),
                });
            }
            Ok(())
        }

        async fn unregister(
            &self,
            participant: &ParticipantId,
            network: NetworkEnvironment,
        ) -> Result<(), PeppolNetworkError> {
            self.calls.lock().unwrap().push(("unregister", participant.to_string(), network));
            Ok(())
        }
    }

    struct FixedMigrations(Option<&'static str>);

    #[async_trait]
    impl MigrationTokenSource for FixedMigrations {
        async fn get_migration_token(
            &self,
            participant: &ParticipantId,
        ) -> Result<MigrationToken, MigrationLookupError> {
            match self.0 {
                Some(token) => Ok(MigrationToken::new(token)),
                None => Err(MigrationLookupError::new(participant.to_string(), MigrationFailure::MissingToken)),
            }
        }
    }

    fn participant() -> ParticipantId {
        ParticipantId::parse("0208:0123456789").unwrap()
    }

    fn inputs(ctx: NetworkContext, verified: bool, registered: bool) -> RegistrationInputs {
        RegistrationInputs {
            network_context: ctx,
            is_smp_recipient: true,
            is_verified: verified,
            verification_requirement: VerificationRequirement::Strict,
            currently_registered: registered,
        }
    }

    fn service(registrar: Arc<RecordingRegistrar>) -> SmpRegistrationService {
        SmpRegistrationService::new(registrar, Arc::new(FixedMigrations(Some("tok"))))
    }

    #[tokio::test]
    async fn test_registers_once_verified() {
        let registrar = Arc::new(RecordingRegistrar::default());
        let service = service(registrar.clone());

        let before = service
            .reconcile(&participant(), &inputs(NetworkContext::production(), false, false))
            .await
            .unwrap();
        assert_eq!(before, RegistrationAction::Unchanged);

        let after = service
            .reconcile(&participant(), &inputs(NetworkContext::production(), true, false))
            .await
            .unwrap();
        assert_eq!(after, RegistrationAction::Registered);

        let calls = registrar.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], ("register", "0208:0123456789".to_string(), NetworkEnvironment::Live));
    }

    #[tokio::test]
    async fn test_unregisters_when_no_longer_recipient() {
        let registrar = Arc::new(RecordingRegistrar::default());
        let service = service(registrar.clone());
        let mut state = inputs(NetworkContext::playground(true), true, true);
        state.is_smp_recipient = false;

        let action = service.reconcile(&participant(), &state).await.unwrap();

        assert_eq!(action, RegistrationAction::Unregistered);
        assert_eq!(registrar.calls.lock().unwrap()[0].2, NetworkEnvironment::Test);
    }

    #[tokio::test]
    async fn test_isolated_playground_makes_no_calls() {
        let registrar = Arc::new(RecordingRegistrar::default());
        let service = service(registrar.clone());

        for registered in [false, true] {
            let action = service
                .reconcile(&participant(), &inputs(NetworkContext::playground(false), true, registered))
                .await
                .unwrap();
            assert_eq!(action, RegistrationAction::Unchanged);
        }
        assert!(registrar.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_already_registered_is_unchanged() {
        let registrar = Arc::new(RecordingRegistrar::default());
        let service = service(registrar.clone());

        let action = service
            .reconcile(&participant(), &inputs(NetworkContext::production(), true, true))
            .await
            .unwrap();

        assert_eq!(action, RegistrationAction::Unchanged);
        assert!(registrar.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_registrar_failure_propagates() {
        let registrar = Arc::new(RecordingRegistrar {
            fail: true,
            ..Default::default()
        });
        let service = service(registrar);

        let err = service
            .reconcile(&participant(), &inputs(NetworkContext::production(), true, false))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrationError::Smp(ref e) if e.status() == Some(409)));
    }

    #[tokio::test]
    async fn test_prepare_migration() {
        let registrar = Arc::new(RecordingRegistrar::default());
        let service = service(registrar);

        let token = service
            .prepare_migration(&participant(), &NetworkContext::production())
            .await
            .unwrap();
        assert_eq!(token.as_str(), "tok");

        let err = service
            .prepare_migration(&participant(), &NetworkContext::playground(false))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrationError::NetworkDisabled));
    }

    #[tokio::test]
    async fn test_prepare_migration_surfaces_lookup_message() {
        let service = SmpRegistrationService::new(
            Arc::new(RecordingRegistrar::default()),
            Arc::new(FixedMigrations(None)),
        );

        let err = service
            .prepare_migration(&participant(), &NetworkContext::production())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already registered at a different access point"));
    }
}
