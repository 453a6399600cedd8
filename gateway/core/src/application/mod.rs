// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Application
//!
//! Workflows that sequence the policy gates and the network clients.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Document transmission and SMP registration use cases

pub mod registration_service;
pub mod transmission_service;

pub use registration_service::{
    RegistrationAction, RegistrationError, RegistrationInputs, SmpRegistrar, SmpRegistrationService,
};
pub use transmission_service::{DocumentTransmissionService, TransmissionError, TransmissionOutcome};
