// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Peppol Gateway Core
//!
//! Routing, trust and transmission primitives for moving business documents
//! across the live and test Peppol networks.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Network-mode and SMP registration policy, participant
//!   discovery, AS4 transmission, certificate expiry tracking and SMP
//!   migration token retrieval

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
