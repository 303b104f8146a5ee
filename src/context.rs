//! Data directory resolution.
//!
//! All persistent state (agent records, run artifacts, config and the event
//! log) lives under a single home directory. By default this is `~/.agentry`;
//! the `AGENTRY_HOME` environment variable overrides it, which is also how
//! tests point commands at a temporary directory.

use crate::error::{AgentryError, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const HOME_ENV_VAR: &str = "AGENTRY_HOME";

/// Default data directory name under the user's home.
pub const DEFAULT_HOME_DIR: &str = ".agentry";

/// Resolved paths for all persistent state.
#[derive(Debug, Clone)]
pub struct AppContext {
    /// Absolute path to the data directory.
    pub home: PathBuf,
}

impl AppContext {
    /// Resolve the context from the environment.
    ///
    /// `AGENTRY_HOME` wins when set and non-empty; otherwise the directory
    /// is `~/.agentry`. Fails only when neither variable yields a usable
    /// path.
    pub fn resolve() -> Result<Self> {
        if let Ok(home) = env::var(HOME_ENV_VAR)
            && !home.is_empty()
        {
            return Ok(Self::at(home));
        }

        let user_home = env::var("HOME").map_err(|_| {
            AgentryError::UserError(format!(
                "cannot locate the data directory: neither {} nor HOME is set.\n\
                 Fix: export {}=/path/to/data",
                HOME_ENV_VAR, HOME_ENV_VAR
            ))
        })?;
        Ok(Self::at(PathBuf::from(user_home).join(DEFAULT_HOME_DIR)))
    }

    /// Build a context rooted at a specific directory.
    pub fn at<P: AsRef<Path>>(home: P) -> Self {
        Self {
            home: home.as_ref().to_path_buf(),
        }
    }

    /// Directory holding one JSON file per agent.
    pub fn agents_dir(&self) -> PathBuf {
        self.home.join("agents")
    }

    /// Directory holding per-run prompt files.
    pub fn runs_dir(&self) -> PathBuf {
        self.home.join("runs")
    }

    /// Path to the main config file.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.yaml")
    }

    /// Path to the backend profiles file.
    pub fn backends_config_path(&self) -> PathBuf {
        self.home.join("backends.yaml")
    }

    /// Directory holding the event log.
    pub fn events_dir(&self) -> PathBuf {
        self.home.join("events")
    }

    /// Path to the append-only event log file.
    pub fn events_file(&self) -> PathBuf {
        self.events_dir().join("events.ndjson")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_env_override_wins() {
        unsafe { env::set_var(HOME_ENV_VAR, "/tmp/agentry-test-home") };
        let ctx = AppContext::resolve().unwrap();
        unsafe { env::remove_var(HOME_ENV_VAR) };

        assert_eq!(ctx.home, PathBuf::from("/tmp/agentry-test-home"));
    }

    #[test]
    #[serial]
    fn test_defaults_to_dot_agentry_under_home() {
        unsafe {
            env::remove_var(HOME_ENV_VAR);
            env::set_var("HOME", "/home/tester");
        }
        let ctx = AppContext::resolve().unwrap();

        assert_eq!(ctx.home, PathBuf::from("/home/tester/.agentry"));
    }

    #[test]
    #[serial]
    fn test_empty_override_ignored() {
        unsafe {
            env::set_var(HOME_ENV_VAR, "");
            env::set_var("HOME", "/home/tester");
        }
        let ctx = AppContext::resolve().unwrap();
        unsafe { env::remove_var(HOME_ENV_VAR) };

        assert_eq!(ctx.home, PathBuf::from("/home/tester/.agentry"));
    }

    #[test]
    fn test_derived_paths() {
        let ctx = AppContext::at("/data");

        assert_eq!(ctx.agents_dir(), PathBuf::from("/data/agents"));
        assert_eq!(ctx.runs_dir(), PathBuf::from("/data/runs"));
        assert_eq!(ctx.config_path(), PathBuf::from("/data/config.yaml"));
        assert_eq!(
            ctx.backends_config_path(),
            PathBuf::from("/data/backends.yaml")
        );
        assert_eq!(ctx.events_file(), PathBuf::from("/data/events/events.ndjson"));
    }
}
