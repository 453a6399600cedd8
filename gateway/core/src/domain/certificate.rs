// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Certificate trust lifecycle types
//!
//! Value types shared by the certificate trust cache and the operational
//! checks that raise alerts for stored AS4 certificates.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Fingerprints and expiry classification

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA-256 digest of a DER-encoded certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CertificateFingerprint([u8; 32]);

impl CertificateFingerprint {
    pub fn of(der: &[u8]) -> Self {
        Self(Sha256::digest(der).into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for CertificateFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Renders an expiry timestamp as ISO-8601 UTC (`2030-01-01T00:00:00Z`).
pub fn to_iso8601(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Classification of a stored certificate for operational alerts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CertificateStatus {
    Valid {
        expires_at: DateTime<Utc>,
    },
    ExpiringSoon {
        expires_at: DateTime<Utc>,
        days_remaining: i64,
    },
    Expired {
        expires_at: DateTime<Utc>,
    },
    /// The stored blob is not a certificate we can read
    Unparseable,
}

impl CertificateStatus {
    /// Classifies an expiry relative to `now`.
    ///
    /// A certificate whose notAfter is at or before `now` is expired; one that
    /// expires within `warning_window` is expiring soon.
    pub fn classify(
        expiry: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        warning_window: Duration,
    ) -> Self {
        let Some(expires_at) = expiry else {
            return Self::Unparseable;
        };

        if expires_at <= now {
            Self::Expired { expires_at }
        } else if expires_at - now <= warning_window {
            Self::ExpiringSoon {
                expires_at,
                days_remaining: (expires_at - now).num_days(),
            }
        } else {
            Self::Valid { expires_at }
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Valid { expires_at }
            | Self::ExpiringSoon { expires_at, .. }
            | Self::Expired { expires_at } => Some(*expires_at),
            Self::Unparseable => None,
        }
    }

    /// Whether an operator should be alerted about this certificate.
    pub fn needs_attention(&self) -> bool {
        !matches!(self, Self::Valid { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_fingerprint_is_sha256_hex() {
        let fp = CertificateFingerprint::of(b"abc");
        assert_eq!(
            fp.to_string(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(fp, CertificateFingerprint::of(b"abc"));
        assert_ne!(fp, CertificateFingerprint::of(b"abd"));
    }

    #[test]
    fn test_iso8601_rendering() {
        assert_eq!(to_iso8601(&at(2030, 1, 1)), "2030-01-01T00:00:00Z");
    }

    #[test]
    fn test_classify() {
        let now = at(2026, 10, 1);
        let window = Duration::days(30);

        assert_eq!(CertificateStatus::classify(None, now, window), CertificateStatus::Unparseable);
        assert_eq!(
            CertificateStatus::classify(Some(at(2026, 9, 1)), now, window),
            CertificateStatus::Expired { expires_at: at(2026, 9, 1) }
        );
        assert_eq!(
            CertificateStatus::classify(Some(now), now, window),
            CertificateStatus::Expired { expires_at: now }
        );
        assert_eq!(
            CertificateStatus::classify(Some(at(2026, 10, 11)), now, window),
            CertificateStatus::ExpiringSoon { expires_at: at(2026, 10, 11), days_remaining: 10 }
        );
        assert_eq!(
            CertificateStatus::classify(Some(at(2027, 1, 1)), now, window),
            CertificateStatus::Valid { expires_at: at(2027, 1, 1) }
        );
    }

    #[test]
    fn test_needs_attention() {
        let now = at(2026, 10, 1);
        assert!(!CertificateStatus::Valid { expires_at: now }.needs_attention());
        assert!(CertificateStatus::Unparseable.needs_attention());
        assert!(CertificateStatus::Expired { expires_at: now }.needs_attention());
        assert_eq!(CertificateStatus::Unparseable.expires_at(), None);
    }
}
