//! Backend profile schema.
//!
//! Defines the `backends.yaml` file format:
//!
//! ```yaml
//! backends:
//!   claude:
//!     name: "Claude CLI"
//!     command: "claude -p {prompt_file}"
//!     timeout_seconds: 600
//!     environment:
//!       CLAUDE_NO_COLOR: "1"
//!     default: true
//!
//!   echo:
//!     name: "Echo (debug)"
//!     command: "cat {prompt_file}"
//! defaults:
//!   timeout_seconds: 600
//! ```
//!
//! # Command placeholders
//!
//! - `{prompt_file}` - absolute path to the rendered prompt file
//! - `{agent_id}` - numeric agent identifier
//! - `{agent_name}` - agent display name
//! - `{tools}` - comma-separated tool names granted to the agent

use crate::error::{AgentryError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

const DEFAULT_TIMEOUT_SECONDS: u64 = 600;

/// All backend profiles, loaded from `backends.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendsConfig {
    /// Profiles keyed by identifier.
    #[serde(default)]
    pub backends: BTreeMap<String, BackendProfile>,

    /// Settings applied when a profile does not override them.
    #[serde(default)]
    pub defaults: BackendDefaults,

    /// Unknown fields preserved for forward compatibility.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// Fallback settings for backend execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendDefaults {
    /// Default timeout in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Unknown fields preserved for forward compatibility.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Default for BackendDefaults {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            extra: BTreeMap::new(),
        }
    }
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

/// One backend profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendProfile {
    /// Human-readable name.
    #[serde(default)]
    pub name: String,

    /// Command template with `{placeholder}` tokens.
    pub command: String,

    /// Timeout in seconds, overriding the default when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,

    /// Environment variables set for the backend process.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub environment: HashMap<String, String>,

    /// Whether this profile is used when none is named.
    #[serde(default)]
    pub default: bool,

    /// Unknown fields preserved for forward compatibility.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl BackendProfile {
    /// Timeout for this profile, falling back to the defaults section.
    pub fn effective_timeout(&self, defaults: &BackendDefaults) -> u64 {
        self.timeout_seconds.unwrap_or(defaults.timeout_seconds)
    }
}

impl BackendsConfig {
    /// Load from a YAML file. `Ok(None)` when the file does not exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AgentryError::UserError(format!(
                "failed to read backends config '{}': {}",
                path.display(),
                e
            ))
        })?;

        Ok(Some(Self::from_yaml(&content)?))
    }

    /// Parse from a YAML string and validate.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: BackendsConfig = serde_yaml::from_str(yaml)
            .map_err(|e| AgentryError::UserError(format!("failed to parse backends.yaml: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// Rules:
    /// - profile identifiers must not be empty
    /// - command templates must not be empty
    /// - timeouts must be positive
    /// - at most one profile may be marked default
    pub fn validate(&self) -> Result<()> {
        if self.defaults.timeout_seconds == 0 {
            return Err(AgentryError::ValidationError(
                "backends.yaml: defaults.timeout_seconds must be greater than 0".to_string(),
            ));
        }

        let default_count = self.backends.values().filter(|b| b.default).count();
        if default_count > 1 {
            return Err(AgentryError::ValidationError(
                "backends.yaml: at most one backend can be marked as default".to_string(),
            ));
        }

        for (id, backend) in &self.backends {
            if id.is_empty() {
                return Err(AgentryError::ValidationError(
                    "backends.yaml: backend identifier cannot be empty".to_string(),
                ));
            }

            if backend.command.is_empty() {
                return Err(AgentryError::ValidationError(format!(
                    "backends.yaml: backend '{}' has empty command",
                    id
                )));
            }

            if let Some(timeout) = backend.timeout_seconds
                && timeout == 0
            {
                return Err(AgentryError::ValidationError(format!(
                    "backends.yaml: backend '{}' has timeout_seconds of 0",
                    id
                )));
            }
        }

        Ok(())
    }

    /// The profile marked `default: true`, if any.
    pub fn default_backend(&self) -> Option<(&str, &BackendProfile)> {
        self.backends
            .iter()
            .find(|(_, b)| b.default)
            .map(|(id, b)| (id.as_str(), b))
    }

    /// Look up a profile by identifier.
    pub fn get(&self, id: &str) -> Option<&BackendProfile> {
        self.backends.get(id)
    }

    /// Pick the profile to run with.
    ///
    /// Precedence: an explicitly requested name, then the config-level
    /// default name, then the profile marked `default: true`. Fails when
    /// the chosen name is unknown or nothing selects a profile.
    pub fn select<'a>(
        &'a self,
        requested: Option<&str>,
        config_default: Option<&str>,
    ) -> Result<(&'a str, &'a BackendProfile)> {
        if let Some(name) = requested.or(config_default) {
            let (id, profile) = self
                .backends
                .get_key_value(name)
                .ok_or_else(|| {
                    AgentryError::UserError(format!(
                        "unknown backend '{}'.\nAvailable backends: {}\nFix: run `agentry backends` to list profiles",
                        name,
                        self.backend_names().join(", ")
                    ))
                })?;
            return Ok((id.as_str(), profile));
        }

        self.default_backend().ok_or_else(|| {
            AgentryError::UserError(
                "no backend selected and none is marked default.\n\
                 Fix: pass --backend NAME or mark one profile `default: true` in backends.yaml"
                    .to_string(),
            )
        })
    }

    fn backend_names(&self) -> Vec<&str> {
        self.backends.keys().map(String::as_str).collect()
    }

    /// Iterate over all profiles.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BackendProfile)> {
        self.backends.iter().map(|(id, b)| (id.as_str(), b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
backends:
  claude:
    name: "Claude CLI"
    command: "claude -p {prompt_file}"
    timeout_seconds: 300
    default: true
  echo:
    name: "Echo"
    command: "cat {prompt_file}"
defaults:
  timeout_seconds: 120
"#;

    #[test]
    fn test_parse_sample() {
        let config = BackendsConfig::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.backends.len(), 2);
        assert_eq!(config.defaults.timeout_seconds, 120);

        let claude = config.get("claude").unwrap();
        assert_eq!(claude.command, "claude -p {prompt_file}");
        assert!(claude.default);
    }

    #[test]
    fn test_effective_timeout() {
        let config = BackendsConfig::from_yaml(SAMPLE).unwrap();
        let claude = config.get("claude").unwrap();
        let echo = config.get("echo").unwrap();

        assert_eq!(claude.effective_timeout(&config.defaults), 300);
        assert_eq!(echo.effective_timeout(&config.defaults), 120);
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(BackendsConfig::load(dir.path().join("backends.yaml"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_empty_command_rejected() {
        let yaml = "backends:\n  bad:\n    command: \"\"\n";
        let err = BackendsConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("empty command"));
    }

    #[test]
    fn test_multiple_defaults_rejected() {
        let yaml = r#"
backends:
  a:
    command: "a"
    default: true
  b:
    command: "b"
    default: true
"#;
        let err = BackendsConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("at most one"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let yaml = "backends:\n  a:\n    command: a\n    timeout_seconds: 0\n";
        assert!(BackendsConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_select_requested_wins() {
        let config = BackendsConfig::from_yaml(SAMPLE).unwrap();
        let (id, _) = config.select(Some("echo"), None).unwrap();
        assert_eq!(id, "echo");
    }

    #[test]
    fn test_select_config_default_then_marker() {
        let config = BackendsConfig::from_yaml(SAMPLE).unwrap();

        let (id, _) = config.select(None, Some("echo")).unwrap();
        assert_eq!(id, "echo");

        let (id, _) = config.select(None, None).unwrap();
        assert_eq!(id, "claude");
    }

    #[test]
    fn test_select_unknown_name_fails() {
        let config = BackendsConfig::from_yaml(SAMPLE).unwrap();
        let err = config.select(Some("nope"), None).unwrap_err();
        assert!(err.to_string().contains("unknown backend 'nope'"));
    }

    #[test]
    fn test_select_without_any_default_fails() {
        let yaml = "backends:\n  only:\n    command: run\n";
        let config = BackendsConfig::from_yaml(yaml).unwrap();
        assert!(config.select(None, None).is_err());
    }

    #[test]
    fn test_unknown_fields_preserved() {
        let yaml = "backends: {}\nfuture_section:\n  key: value\n";
        let config = BackendsConfig::from_yaml(yaml).unwrap();
        assert!(config.extra.contains_key("future_section"));
    }
}
