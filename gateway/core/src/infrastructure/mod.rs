// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod as4_client;
pub mod certificate_cache;
pub mod directory_client;
pub mod migration_token;

pub use as4_client::As4Client;
pub use certificate_cache::CertificateTrustCache;
pub use directory_client::DirectoryClient;
pub use migration_token::MigrationTokenRetriever;
