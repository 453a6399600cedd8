// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Peppol participant identifiers (`scheme:value`, e.g. `0208:0123456789`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identifier scheme prefix that some registries put in front of the address.
const ACTOR_ID_SCHEME: &str = "iso6523-actorid-upis::";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParticipantIdError {
    #[error("Participant ID is empty")]
    Empty,

    #[error("Participant ID '{0}' must have the form 'scheme:value'")]
    MissingSeparator(String),

    #[error("Participant ID '{0}' has an empty scheme")]
    EmptyScheme(String),

    #[error("Participant ID '{0}' has an empty value")]
    EmptyValue(String),
}

/// Scheme-qualified Peppol participant identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ParticipantId {
    scheme: String,
    value: String,
}

impl ParticipantId {
    /// Parses `scheme:value`, normalizing it on the way in.
    ///
    /// Surrounding whitespace and an `iso6523-actorid-upis::` prefix are
    /// dropped and the scheme is lower-cased; the value is kept verbatim.
    pub fn parse(raw: &str) -> Result<Self, ParticipantIdError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ParticipantIdError::Empty);
        }

        let without_prefix = strip_prefix_ignore_case(trimmed, ACTOR_ID_SCHEME).unwrap_or(trimmed);

        let (scheme, value) = without_prefix
            .split_once(':')
            .ok_or_else(|| ParticipantIdError::MissingSeparator(raw.to_string()))?;

        let scheme = scheme.trim();
        let value = value.trim();
        if scheme.is_empty() {
            return Err(ParticipantIdError::EmptyScheme(raw.to_string()));
        }
        if value.is_empty() {
            return Err(ParticipantIdError::EmptyValue(raw.to_string()));
        }

        Ok(Self {
            scheme: scheme.to_ascii_lowercase(),
            value: value.to_string(),
        })
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        s.get(prefix.len()..)
    } else {
        None
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scheme, self.value)
    }
}

impl FromStr for ParticipantId {
    type Err = ParticipantIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ParticipantId {
    type Error = ParticipantIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ParticipantId> for String {
    fn from(id: ParticipantId) -> Self {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scheme_and_value() {
        let id = ParticipantId::parse("0208:0123456789").unwrap();
        assert_eq!(id.scheme(), "0208");
        assert_eq!(id.value(), "0123456789");
        assert_eq!(id.to_string(), "0208:0123456789");
    }

    #[test]
    fn test_parse_strips_actor_id_scheme() {
        let id = ParticipantId::parse("iso6523-actorid-upis::9925:BE0123456789").unwrap();
        assert_eq!(id.to_string(), "9925:BE0123456789");
    }

    #[test]
    fn test_scheme_is_lowercased_value_kept() {
        let id: ParticipantId = " 9925:BE0123 ".parse().unwrap();
        assert_eq!(id.scheme(), "9925");
        assert_eq!(id.value(), "BE0123");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(ParticipantId::parse("  "), Err(ParticipantIdError::Empty));
        assert!(matches!(
            ParticipantId::parse("0208"),
            Err(ParticipantIdError::MissingSeparator(_))
        ));
        assert!(matches!(ParticipantId::parse(":123"), Err(ParticipantIdError::EmptyScheme(_))));
        assert!(matches!(ParticipantId::parse("0208:"), Err(ParticipantIdError::EmptyValue(_))));
    }

    #[test]
    fn test_serde_as_string() {
        let id = ParticipantId::parse("0208:111").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"0208:111\"");
        let back: ParticipantId = serde_json::from_str("\"0208:111\"").unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<ParticipantId>("\"nope\"").is_err());
    }
}
