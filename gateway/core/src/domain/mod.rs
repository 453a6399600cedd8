// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain
//!
//! Pure policy, value types and the ports implemented by infrastructure.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Network policy, participant identifiers and collaborator traits

pub mod certificate;
pub mod directory;
pub mod gateway_config;
pub mod migration;
pub mod network;
pub mod participant;
pub mod registration;
pub mod transmission;
