// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Migration Token Retriever
//!
//! Runs the external SMP migration key utility for a participant and pulls
//! the `MigrationToken` element out of the XML it prints.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Authorize moving a participant from another access point
//! - **Integration:** Child process → stdout XML → [`MigrationToken`]
//!
//! One child process per call. Its stdout is drained completely before
//! parsing, and the process is killed if the call times out or is dropped.

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::domain::gateway_config::MigrationConfig;
use crate::domain::migration::{
    MigrationFailure, MigrationLookupError, MigrationToken, MigrationTokenSource,
};
use crate::domain::participant::ParticipantId;

const TOKEN_ELEMENT: &[u8] = b"MigrationToken";

pub struct MigrationTokenRetriever {
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl MigrationTokenRetriever {
    pub fn new(config: &MigrationConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
            timeout: config.timeout(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetch a migration token for `participant`.
    ///
    /// Every failure maps to the same [`MigrationLookupError`]; the concrete
    /// cause is logged and kept as the error source.
    pub async fn get_migration_token(
        &self,
        participant: &ParticipantId,
    ) -> Result<MigrationToken, MigrationLookupError> {
        let address = participant.to_string();

        let result = match self.run_utility(&address).await {
            Ok(stdout) => extract_migration_token(&stdout),
            Err(failure) => Err(failure),
        };

        match result {
            Ok(token) => {
                info!(participant = %address, "Migration token retrieved");
                metrics::counter!("peppol_migration_lookup_total", "outcome" => "success").increment(1);
                Ok(token)
            }
            Err(failure) => {
                warn!(participant = %address, error = %failure, "Migration token lookup failed");
                metrics::counter!("peppol_migration_lookup_total", "outcome" => "error").increment(1);
                Err(MigrationLookupError::new(address, failure))
            }
        }
    }

    async fn run_utility(&self, address: &str) -> Result<String, MigrationFailure> {
        debug!(command = %self.command, participant = %address, "Running migration utility");

        let child = Command::new(&self.command)
            .args(&self.args)
            .arg(address)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| MigrationFailure::Spawn(format!("{}: {}", self.command, e)))?;

        // On timeout the future is dropped with the child, which kills it
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(MigrationFailure::Spawn(e.to_string())),
            Err(_) => return Err(MigrationFailure::Timeout(self.timeout)),
        };

        if !output.status.success() {
            return Err(MigrationFailure::ExitStatus {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        String::from_utf8(output.stdout)
            .map_err(|e| MigrationFailure::MalformedXml(format!("stdout is not UTF-8: {}", e)))
    }
}

#[async_trait]
impl MigrationTokenSource for MigrationTokenRetriever {
    async fn get_migration_token(
        &self,
        participant: &ParticipantId,
    ) -> Result<MigrationToken, MigrationLookupError> {
        MigrationTokenRetriever::get_migration_token(self, participant).await
    }
}

/// Read the `MigrationToken` element at the document root: either the root
/// element itself or a direct child of it.
pub fn extract_migration_token(xml: &str) -> Result<MigrationToken, MigrationFailure> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut depth = 0usize;
    let mut seen_root = false;
    // Depth of the element whose text is being collected
    let mut token_depth: Option<usize> = None;
    let mut token = String::new();

    loop {
        let capturing = token_depth.is_some();
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                depth += 1;
                seen_root = true;
                if !capturing && depth <= 2 && e.local_name().as_ref() == TOKEN_ELEMENT {
                    token_depth = Some(depth);
                }
            }
            Ok(Event::Empty(e)) => {
                seen_root = true;
                if depth <= 1 && e.local_name().as_ref() == TOKEN_ELEMENT {
                    return Err(MigrationFailure::MissingToken);
                }
            }
            Ok(Event::End(_)) => {
                if token_depth == Some(depth) {
                    let value = token.trim();
                    if value.is_empty() {
                        return Err(MigrationFailure::MissingToken);
                    }
                    return Ok(MigrationToken::new(value));
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Text(text)) if capturing => {
                let value = text
                    .unescape()
                    .map_err(|e| MigrationFailure::MalformedXml(e.to_string()))?;
                token.push_str(&value);
            }
            Ok(Event::CData(data)) if capturing => {
                token.push_str(&String::from_utf8_lossy(&data.into_inner()));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(MigrationFailure::MalformedXml(format!(
                    "at position {}: {}",
                    reader.error_position(),
                    e
                )))
            }
        }
    }

    if !seen_root {
        return Err(MigrationFailure::MalformedXml("document has no root element".to_string()));
    }
    if depth != 0 {
        return Err(MigrationFailure::MalformedXml("unexpected end of document".to_string()));
    }

    Err(MigrationFailure::MissingToken)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_token_under_root() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<SMPResponse>
  <ParticipantIdentifier scheme="iso6523-actorid-upis">0208:123</ParticipantIdentifier>
  <MigrationToken>  aB3-xY9 </MigrationToken>
</SMPResponse>"#;
        assert_eq!(extract_migration_token(xml).unwrap().as_str(), "aB3-xY9");
    }

    #[test]
    fn test_extracts_namespaced_and_escaped_token() {
        let xml = r#"<smp:Response xmlns:smp="urn:smp"><smp:MigrationToken>a&amp;b</smp:MigrationToken></smp:Response>"#;
        assert_eq!(extract_migration_token(xml).unwrap().as_str(), "a&b");

        let cdata = "<Response><MigrationToken><![CDATA[tok<1>]]></MigrationToken></Response>";
        assert_eq!(extract_migration_token(cdata).unwrap().as_str(), "tok<1>");
    }

    #[test]
    fn test_token_as_root_element() {
        let xml = r#"<?xml version="1.0"?><MigrationToken>abc123</MigrationToken>"#;
        assert_eq!(extract_migration_token(xml).unwrap().as_str(), "abc123");

        let prefixed = r#"<smp:MigrationToken xmlns:smp="urn:smp"> tok-9 </smp:MigrationToken>"#;
        assert_eq!(extract_migration_token(prefixed).unwrap().as_str(), "tok-9");

        assert!(matches!(
            extract_migration_token("<MigrationToken/>"),
            Err(MigrationFailure::MissingToken)
        ));
    }

    #[test]
    fn test_nested_token_is_not_root_level() {
        let xml = "<Response><Details><MigrationToken>deep</MigrationToken></Details></Response>";
        assert!(matches!(extract_migration_token(xml), Err(MigrationFailure::MissingToken)));
    }

    #[test]
    fn test_missing_or_empty_token() {
        assert!(matches!(
            extract_migration_token("<Response><Error>exists</Error></Response>"),
            Err(MigrationFailure::MissingToken)
        ));
        assert!(matches!(
            extract_migration_token("<Response><MigrationToken/></Response>"),
            Err(MigrationFailure::MissingToken)
        ));
        assert!(matches!(
            extract_migration_token("<Response><MigrationToken>  </MigrationToken></Response>"),
            Err(MigrationFailure::MissingToken)
        ));
    }

    #[test]
    fn test_malformed_xml() {
        assert!(matches!(extract_migration_token(""), Err(MigrationFailure::MalformedXml(_))));
        assert!(matches!(
            extract_migration_token("Error: participant not found"),
            Err(MigrationFailure::MalformedXml(_))
        ));
        assert!(matches!(
            extract_migration_token("<Response><Other></Response>"),
            Err(MigrationFailure::MalformedXml(_))
        ));
        assert!(matches!(
            extract_migration_token("<Response><Other>"),
            Err(MigrationFailure::MalformedXml(_))
        ));
    }

    #[cfg(unix)]
    fn shell(script: &str, timeout: Duration) -> MigrationTokenRetriever {
        MigrationTokenRetriever::new(&MigrationConfig {
            command: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string(), "sh".to_string()],
            timeout_seconds: 30,
        })
        .with_timeout(timeout)
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_utility_receives_participant_and_token_is_parsed() {
        let retriever = shell(
            r#"printf '<Response><Participant>%s</Participant><MigrationToken>T-%s</MigrationToken></Response>' "$1" "$1""#,
            Duration::from_secs(10),
        );
        let participant = ParticipantId::parse("0208:0123456789").unwrap();

        let token = retriever.get_migration_token(&participant).await.unwrap();
        assert_eq!(token.as_str(), "T-0208:0123456789");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_lookup_error() {
        let retriever = shell("echo 'registered elsewhere' >&2; exit 3", Duration::from_secs(10));
        let participant = ParticipantId::parse("0208:1").unwrap();

        let err = retriever.get_migration_token(&participant).await.unwrap_err();
        assert!(err.to_string().contains("already registered"));
        match err.failure() {
            MigrationFailure::ExitStatus { code, stderr } => {
                assert_eq!(*code, Some(3));
                assert_eq!(stderr, "registered elsewhere");
            }
            other => panic!("unexpected failure: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_kills_utility() {
        let retriever = shell("sleep 30", Duration::from_millis(200));
        let participant = ParticipantId::parse("0208:1").unwrap();

        let started = std::time::Instant::now();
        let err = retriever.get_migration_token(&participant).await.unwrap_err();

        assert!(matches!(err.failure(), MigrationFailure::Timeout(_)));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_missing_executable_is_lookup_error() {
        let retriever = MigrationTokenRetriever::new(&MigrationConfig {
            command: "/nonexistent/peppol-migration-key".to_string(),
            args: vec![],
            timeout_seconds: 5,
        });
        let participant = ParticipantId::parse("0208:1").unwrap();

        let err = retriever.get_migration_token(&participant).await.unwrap_err();
        assert!(matches!(err.failure(), MigrationFailure::Spawn(_)));
        assert_eq!(err.participant(), "0208:1");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_output_without_token_is_lookup_error() {
        let retriever = shell("echo '<Response><Status>REGISTERED</Status></Response>'", Duration::from_secs(10));
        let participant = ParticipantId::parse("0208:1").unwrap();

        let err = retriever.get_migration_token(&participant).await.unwrap_err();
        assert!(matches!(err.failure(), MigrationFailure::MissingToken));
    }
}
