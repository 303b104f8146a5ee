//! Configuration model.
//!
//! Represents `config.yaml` in the data directory. The file is optional;
//! when absent every field takes its default. Unknown fields are ignored for
//! forward compatibility.

use crate::error::{AgentryError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL prefixed onto share paths when printing full links.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Name of the backend profile to use when `--backend` is not given.
    /// Overrides the `default: true` marker in backends.yaml.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_backend: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            default_backend: None,
        }
    }
}

impl Config {
    /// Load config from a YAML file, or defaults when the file is missing.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AgentryError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string. Unknown fields are ignored.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| AgentryError::UserError(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate config values.
    ///
    /// Rules:
    /// - `base_url` must be non-empty
    /// - `default_backend`, when set, must be non-empty
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(AgentryError::ValidationError(
                "config.yaml: base_url must be non-empty".to_string(),
            ));
        }

        if let Some(name) = &self.default_backend
            && name.trim().is_empty()
        {
            return Err(AgentryError::ValidationError(
                "config.yaml: default_backend must be non-empty when set".to_string(),
            ));
        }

        Ok(())
    }

    /// The base URL without a trailing slash, ready for path concatenation.
    pub fn base_url_trimmed(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert!(config.default_backend.is_none());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(dir.path().join("config.yaml")).unwrap();
        assert_eq!(config.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_parse_overrides() {
        let config = Config::from_yaml(
            "base_url: https://agents.example.com\ndefault_backend: claude\n",
        )
        .unwrap();
        assert_eq!(config.base_url, "https://agents.example.com");
        assert_eq!(config.default_backend.as_deref(), Some("claude"));
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let config = Config::from_yaml("base_url: http://x\nfuture_option: 42\n").unwrap();
        assert_eq!(config.base_url, "http://x");
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let result = Config::from_yaml("base_url: \"\"\n");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("base_url"));
    }

    #[test]
    fn test_base_url_trimmed() {
        let config = Config::from_yaml("base_url: https://example.com/\n").unwrap();
        assert_eq!(config.base_url_trimmed(), "https://example.com");
    }

    #[test]
    fn test_invalid_yaml_is_user_error() {
        let result = Config::from_yaml(": : :");
        assert!(matches!(result.unwrap_err(), AgentryError::UserError(_)));
    }
}
