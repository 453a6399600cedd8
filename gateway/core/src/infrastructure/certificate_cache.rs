// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Certificate Trust Cache
//!
//! Extracts the "not valid after" date from a company's stored AS4
//! certificate and memoizes it by SHA-256 fingerprint of the DER bytes.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Memoized X.509 expiry lookup for operational alerts
//! - **Integration:** Base64 DER → x509-parser → process-wide concurrent map
//!
//! Failures are cached too: an unparseable blob is an expected steady-state
//! condition and is answered with `None` from the cache on every later call.
//! Two concurrent misses for the same fingerprint may both parse; the result
//! is identical so whichever insert lands first wins.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;
use x509_parser::prelude::parse_x509_certificate;

use crate::domain::certificate::{CertificateFingerprint, CertificateStatus};

/// Concurrent expiry cache owned by the composition root.
#[derive(Debug, Default)]
pub struct CertificateTrustCache {
    entries: DashMap<CertificateFingerprint, Option<DateTime<Utc>>>,
    parses: AtomicU64,
}

impl CertificateTrustCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expiry of a Base64-encoded DER certificate, or `None` if it cannot be
    /// read.
    pub fn parse_certificate_expiry(&self, base64_cert: &str) -> Option<DateTime<Utc>> {
        let compact: String = base64_cert.chars().filter(|c| !c.is_whitespace()).collect();
        let der = STANDARD.decode(compact.as_bytes());

        // Undecodable input has no DER bytes; key it by the raw text instead
        let fingerprint = match &der {
            Ok(bytes) => CertificateFingerprint::of(bytes),
            Err(_) => CertificateFingerprint::of(compact.as_bytes()),
        };

        if let Some(cached) = self.entries.get(&fingerprint).map(|entry| *entry.value()) {
            debug!(fingerprint = %fingerprint, "Certificate cache hit");
            metrics::counter!("peppol_certificate_cache_total", "result" => "hit").increment(1);
            return cached;
        }

        metrics::counter!("peppol_certificate_cache_total", "result" => "miss").increment(1);
        self.parses.fetch_add(1, Ordering::Relaxed);

        let expiry = match &der {
            Ok(bytes) => parse_not_after(bytes),
            Err(e) => {
                debug!(fingerprint = %fingerprint, error = %e, "Certificate is not valid Base64");
                None
            }
        };

        debug!(
            fingerprint = %fingerprint,
            parsed = expiry.is_some(),
            "Certificate cache populated"
        );

        *self.entries.entry(fingerprint).or_insert(expiry).value()
    }

    /// Classify a stored certificate against `now` for alerting.
    pub fn assess(
        &self,
        base64_cert: &str,
        now: DateTime<Utc>,
        warning_window: Duration,
    ) -> CertificateStatus {
        CertificateStatus::classify(self.parse_certificate_expiry(base64_cert), now, warning_window)
    }

    /// Drop every cached entry, forcing re-validation on next lookup.
    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of times the X.509 parser has been invoked.
    pub fn parse_count(&self) -> u64 {
        self.parses.load(Ordering::Relaxed)
    }
}

fn parse_not_after(der: &[u8]) -> Option<DateTime<Utc>> {
    match parse_x509_certificate(der) {
        Ok((_, cert)) => DateTime::from_timestamp(cert.validity().not_after.timestamp(), 0),
        Err(e) => {
            debug!(error = %e, "Failed to parse X.509 certificate");
            None
        }
    }
}
