// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Gateway Configuration Types
//
// Defines the configuration manifest for a Peppol gateway node:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - Live and test access-point endpoints with their X-Token credentials
// - Live and test participant directory endpoints
// - SMP migration utility invocation
// - Certificate expiry alerting and observability settings
//
// Endpoint/credential pairs are resolved once at startup and injected into
// the AS4 and directory clients.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::network::NetworkEnvironment;

pub const API_VERSION: &str = "peppol-gateway/v1";
pub const KIND: &str = "GatewayConfig";

/// Top-level Kubernetes-style gateway configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfigManifest {
    /// API version (must be "peppol-gateway/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "GatewayConfig")
    pub kind: String,

    pub metadata: ManifestMetadata,

    pub spec: GatewayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Human-readable node name
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

/// Gateway configuration specification (content under spec:)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub access_point: AccessPointConfig,

    #[serde(default)]
    pub directory: DirectoryConfig,

    #[serde(default)]
    pub migration: MigrationConfig,

    #[serde(default)]
    pub certificates: CertificateConfig,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub observability: Option<ObservabilityConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessPointConfig {
    /// Production access-point gateway
    #[serde(default)]
    pub live: AccessPointEndpoint,

    /// Test-network access-point gateway
    #[serde(default)]
    pub test: AccessPointEndpoint,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessPointEndpoint {
    /// Base URL of the gateway (e.g., "https://ap.example.com")
    #[serde(default)]
    pub endpoint: String,

    /// X-Token credential (supports "env:VAR_NAME" for environment variables)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    #[serde(default = "default_live_directory")]
    pub live_endpoint: String,

    #[serde(default = "default_test_directory")]
    pub test_endpoint: String,
}

impl DirectoryConfig {
    pub fn endpoint(&self, environment: NetworkEnvironment) -> &str {
        match environment {
            NetworkEnvironment::Live => &self.live_endpoint,
            NetworkEnvironment::Test => &self.test_endpoint,
        }
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            live_endpoint: default_live_directory(),
            test_endpoint: default_test_directory(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Executable of the SMP migration key utility
    #[serde(default = "default_migration_command")]
    pub command: String,

    /// Arguments placed before the participant address
    #[serde(default)]
    pub args: Vec<String>,

    /// Hard limit for one invocation; the process is killed when exceeded
    #[serde(default = "default_migration_timeout")]
    pub timeout_seconds: u64,
}

impl MigrationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            command: default_migration_command(),
            args: vec![],
            timeout_seconds: default_migration_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateConfig {
    /// Certificates expiring within this many days are reported as expiring soon
    #[serde(default = "default_expiry_warning_days")]
    pub expiry_warning_days: u32,
}

impl CertificateConfig {
    pub fn warning_window(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.expiry_warning_days))
    }
}

impl Default for CertificateConfig {
    fn default() -> Self {
        Self {
            expiry_warning_days: default_expiry_warning_days(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "info", "debug", "trace")
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format ("json" or "text")
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Access-point endpoint with its credential resolved from config/env.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedAccessPoint {
    pub endpoint: String,
    pub token: String,
}

impl fmt::Debug for ResolvedAccessPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedAccessPoint")
            .field("endpoint", &self.endpoint)
            .field("token", &"***")
            .finish()
    }
}

/// Both access points, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAccessPoints {
    pub live: ResolvedAccessPoint,
    pub test: ResolvedAccessPoint,
}

impl ResolvedAccessPoints {
    pub fn select(&self, environment: NetworkEnvironment) -> &ResolvedAccessPoint {
        match environment {
            NetworkEnvironment::Live => &self.live,
            NetworkEnvironment::Test => &self.test,
        }
    }
}

impl AccessPointConfig {
    /// Resolve endpoints and tokens (including "env:VAR_NAME" indirection).
    pub fn resolve(&self) -> anyhow::Result<ResolvedAccessPoints> {
        Ok(ResolvedAccessPoints {
            live: ResolvedAccessPoint {
                endpoint: self.live.endpoint.clone(),
                token: resolve_secret(&self.live.token)?,
            },
            test: ResolvedAccessPoint {
                endpoint: self.test.endpoint.clone(),
                token: resolve_secret(&self.test.token)?,
            },
        })
    }
}

/// Resolve a secret from config (supports "env:VAR_NAME" syntax)
fn resolve_secret(value: &Option<String>) -> anyhow::Result<String> {
    match value.as_deref() {
        Some(v) => match v.strip_prefix("env:") {
            Some(var_name) => std::env::var(var_name)
                .map_err(|_| anyhow::anyhow!("Environment variable not set: {}", var_name)),
            None => Ok(v.to_string()),
        },
        None => Ok(String::new()),
    }
}

// Default value functions
fn default_live_directory() -> String {
    "https://directory.peppol.eu".to_string()
}

fn default_test_directory() -> String {
    "https://test-directory.peppol.eu".to_string()
}

fn default_migration_command() -> String {
    "peppol-migration-key".to_string()
}

fn default_migration_timeout() -> u64 {
    30
}

fn default_expiry_warning_days() -> u32 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Default for GatewayConfigManifest {
    fn default() -> Self {
        let hostname = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "peppol-gateway".to_string());

        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata {
                name: hostname,
                version: Some("1.0.0".to_string()),
                labels: None,
            },
            spec: GatewayConfig::default(),
        }
    }
}

impl GatewayConfigManifest {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. PEPPOL_GATEWAY_CONFIG environment variable
    /// 2. ./peppol-gateway.yaml (working directory)
    /// 3. ~/.peppol-gateway/config.yaml (user home)
    /// 4. /etc/peppol-gateway/config.yaml (system, Unix)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("PEPPOL_GATEWAY_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./peppol-gateway.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".peppol-gateway").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        let system_config = PathBuf::from("/etc/peppol-gateway/config.yaml");
        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit CLI path fails if missing/invalid
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::warn!("No configuration file found in standard locations. Using defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let access_point = &mut self.spec.access_point;

        if let Some(val) = lookup("PEPPOL_AP_ENDPOINT") {
            tracing::info!("Environment override: PEPPOL_AP_ENDPOINT={}", val);
            access_point.live.endpoint = val;
        }
        if let Some(val) = lookup("PEPPOL_AP_TEST_ENDPOINT") {
            tracing::info!("Environment override: PEPPOL_AP_TEST_ENDPOINT={}", val);
            access_point.test.endpoint = val;
        }
        // Tokens are never echoed
        if let Some(val) = lookup("PEPPOL_AP_TOKEN") {
            tracing::info!("Environment override: PEPPOL_AP_TOKEN");
            access_point.live.token = Some(val);
        }
        if let Some(val) = lookup("PEPPOL_AP_TEST_TOKEN") {
            tracing::info!("Environment override: PEPPOL_AP_TEST_TOKEN");
            access_point.test.token = Some(val);
        }
        if let Some(val) = lookup("PEPPOL_MIGRATION_COMMAND") {
            tracing::info!("Environment override: PEPPOL_MIGRATION_COMMAND={}", val);
            self.spec.migration.command = val;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != API_VERSION {
            anyhow::bail!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version,
                API_VERSION
            );
        }

        if self.kind != KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, KIND);
        }

        if self.metadata.name.is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        let spec = &self.spec;
        validate_endpoint("spec.access_point.live.endpoint", &spec.access_point.live.endpoint)?;
        validate_endpoint("spec.access_point.test.endpoint", &spec.access_point.test.endpoint)?;
        validate_endpoint("spec.directory.live_endpoint", &spec.directory.live_endpoint)?;
        validate_endpoint("spec.directory.test_endpoint", &spec.directory.test_endpoint)?;

        if spec.migration.command.trim().is_empty() {
            anyhow::bail!("spec.migration.command cannot be empty");
        }

        if spec.migration.timeout_seconds == 0 {
            anyhow::bail!("spec.migration.timeout_seconds must be greater than zero");
        }

        Ok(())
    }
}

fn validate_endpoint(field: &str, value: &str) -> anyhow::Result<()> {
    if value.is_empty() {
        anyhow::bail!("{} cannot be empty", field);
    }

    let parsed = url::Url::parse(value)
        .map_err(|e| anyhow::anyhow!("{} is not a valid URL '{}': {}", field, value, e))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("{} must use http or https, got '{}'", field, parsed.scheme());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
apiVersion: peppol-gateway/v1
kind: GatewayConfig
metadata:
  name: gateway-eu-1
spec:
  access_point:
    live:
      endpoint: https://ap.example.com
      token: live-token
    test:
      endpoint: https://test-ap.example.com
      token: test-token
  migration:
    command: /usr/local/bin/smp-migrate
    timeout_seconds: 10
"#;

    #[test]
    fn test_default_manifest() {
        let manifest = GatewayConfigManifest::default();
        assert_eq!(manifest.api_version, API_VERSION);
        assert_eq!(manifest.kind, KIND);
        assert!(!manifest.metadata.name.is_empty());
        assert_eq!(manifest.spec.directory.live_endpoint, "https://directory.peppol.eu");
        assert_eq!(manifest.spec.migration.timeout_seconds, 30);
        assert_eq!(manifest.spec.certificates.expiry_warning_days, 30);
    }

    #[test]
    fn test_parse_sample_with_defaults() {
        let manifest = GatewayConfigManifest::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(manifest.metadata.name, "gateway-eu-1");
        assert_eq!(manifest.spec.access_point.live.endpoint, "https://ap.example.com");
        assert_eq!(manifest.spec.migration.command, "/usr/local/bin/smp-migrate");
        assert_eq!(manifest.spec.migration.timeout(), Duration::from_secs(10));
        assert_eq!(
            manifest.spec.directory.endpoint(NetworkEnvironment::Test),
            "https://test-directory.peppol.eu"
        );
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        // Access points have no default endpoint
        let mut manifest = GatewayConfigManifest::default();
        assert!(manifest.validate().is_err());

        manifest = GatewayConfigManifest::from_yaml_str(SAMPLE).unwrap();
        assert!(manifest.validate().is_ok());

        manifest.api_version = "wrong/v1".to_string();
        assert!(manifest.validate().is_err());
        manifest.api_version = API_VERSION.to_string();

        manifest.kind = "WrongKind".to_string();
        assert!(manifest.validate().is_err());
        manifest.kind = KIND.to_string();

        manifest.spec.access_point.test.endpoint = "ftp://test-ap.example.com".to_string();
        assert!(manifest.validate().is_err());
        manifest.spec.access_point.test.endpoint = "not a url".to_string();
        assert!(manifest.validate().is_err());
        manifest.spec.access_point.test.endpoint = "https://test-ap.example.com".to_string();

        manifest.spec.migration.timeout_seconds = 0;
        assert!(manifest.validate().is_err());
        manifest.spec.migration.timeout_seconds = 5;

        manifest.spec.migration.command = " ".to_string();
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn test_resolve_tokens() {
        let manifest = GatewayConfigManifest::from_yaml_str(SAMPLE).unwrap();
        let resolved = manifest.spec.access_point.resolve().unwrap();
        assert_eq!(resolved.select(NetworkEnvironment::Live).token, "live-token");
        assert_eq!(resolved.select(NetworkEnvironment::Test).endpoint, "https://test-ap.example.com");
        assert!(!format!("{:?}", resolved).contains("live-token"));
    }

    #[test]
    fn test_resolve_env_token() {
        let mut config = AccessPointConfig::default();
        config.live.token = Some("env:PEPPOL_GATEWAY_TEST_UNSET_TOKEN_VAR".to_string());
        assert!(config.resolve().is_err());

        config.live.token = Some("env:PATH".to_string());
        let resolved = config.resolve().unwrap();
        assert!(!resolved.live.token.is_empty());
        assert_eq!(resolved.test.token, "");
    }

    #[test]
    fn test_overrides() {
        let mut manifest = GatewayConfigManifest::from_yaml_str(SAMPLE).unwrap();
        let env: HashMap<&str, &str> = HashMap::from([
            ("PEPPOL_AP_ENDPOINT", "https://override.example.com"),
            ("PEPPOL_AP_TEST_TOKEN", "override-test-token"),
        ]);
        manifest.apply_overrides(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(manifest.spec.access_point.live.endpoint, "https://override.example.com");
        assert_eq!(manifest.spec.access_point.live.token.as_deref(), Some("live-token"));
        assert_eq!(
            manifest.spec.access_point.test.token.as_deref(),
            Some("override-test-token")
        );
    }

    #[test]
    fn test_yaml_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("peppol-gateway.yaml");

        let manifest = GatewayConfigManifest::from_yaml_str(SAMPLE).unwrap();
        manifest.to_yaml_file(&path).unwrap();

        let loaded = GatewayConfigManifest::load_or_default(Some(path)).unwrap();
        assert_eq!(loaded.metadata.name, "gateway-eu-1");

        let missing = dir.path().join("missing.yaml");
        assert!(GatewayConfigManifest::load_or_default(Some(missing)).is_err());
    }
}
