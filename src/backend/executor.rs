//! Backend subprocess executor.
//!
//! Writes the effective prompt to a per-run file, renders the profile's
//! command template, and spawns the process with inherited stdio so the
//! backend's output streams straight to the user's terminal.

use crate::backend::config::BackendProfile;
use crate::context::AppContext;
use crate::error::{AgentryError, Result};
use crate::fs::atomic_write_file;
use crate::vars::apply_values;
use chrono::Utc;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::{Child, Command};
use std::sync::LazyLock;
use std::time::{Duration, Instant};

// Tokens that survive substitution are undefined placeholders.
static LEFTOVER_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("token pattern is valid"));

/// What a run needs from the caller.
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Agent being run.
    pub agent_id: u64,
    /// Agent display name.
    pub agent_name: String,
    /// Tool names granted to the agent.
    pub tools: Vec<String>,
    /// The effective prompt text sent to the backend.
    pub prompt: String,
}

/// Result of a backend execution.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Exit code, `None` when the process was killed.
    pub exit_code: Option<i32>,
    /// Path to the prompt file handed to the backend.
    pub prompt_path: PathBuf,
    /// Wall-clock duration.
    pub duration: Duration,
    /// Whether the process was killed on timeout.
    pub timed_out: bool,
    /// The rendered command line, for logging.
    pub command: String,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

/// Render a profile's command template against the run's variables.
///
/// Available placeholders: `{prompt_file}`, `{agent_id}`, `{agent_name}`,
/// `{tools}`. A placeholder the variables do not cover is a hard error
/// naming the token and the available set.
pub fn render_command(template: &str, variables: &BTreeMap<String, String>) -> Result<String> {
    let rendered = apply_values(template, variables);

    if let Some(caps) = LEFTOVER_TOKEN.captures(&rendered) {
        let mut available: Vec<_> = variables.keys().map(String::as_str).collect();
        available.sort_unstable();
        return Err(AgentryError::UserError(format!(
            "backend command references undefined placeholder '{{{}}}'\n\
             Command: {}\n\
             Available placeholders: {}",
            &caps[1],
            template,
            available.join(", ")
        )));
    }

    Ok(rendered)
}

/// Execute a backend profile for one run.
///
/// The prompt lands in `{home}/runs/{agent_id}/prompt-{timestamp}.md`; the
/// file outlives the run so it can be inspected afterwards.
pub fn execute_backend(
    ctx: &AppContext,
    profile: &BackendProfile,
    request: &RunRequest,
    timeout_seconds: u64,
) -> Result<RunOutcome> {
    let prompt_path = ctx.runs_dir().join(request.agent_id.to_string()).join(
        format!("prompt-{}.md", Utc::now().format("%Y%m%dT%H%M%S%3f")),
    );
    atomic_write_file(&prompt_path, &request.prompt)?;

    let variables = run_variables(request, &prompt_path);
    let command_str = render_command(&profile.command, &variables)?;

    let args = shell_words::split(&command_str).map_err(|e| {
        AgentryError::UserError(format!(
            "failed to parse backend command '{}': {}\n\
             Fix: check for unmatched quotes or invalid escape sequences.",
            command_str, e
        ))
    })?;

    let Some((program, cmd_args)) = args.split_first() else {
        return Err(AgentryError::UserError(format!(
            "backend command is empty after parsing: '{}'",
            command_str
        )));
    };

    // Inherited stdio: backend output streams to the terminal as it runs.
    let mut command = Command::new(program);
    command.args(cmd_args);
    for (key, value) in &profile.environment {
        command.env(key, value);
    }

    let start_time = Instant::now();
    let mut child = command.spawn().map_err(|e| {
        AgentryError::BackendError(format!(
            "failed to execute backend command '{}': {}\n\
             Fix: ensure the command is installed and in PATH.",
            program, e
        ))
    })?;

    let timeout = Duration::from_secs(timeout_seconds);
    let (exit_code, timed_out) = wait_with_timeout(&mut child, timeout)?;

    Ok(RunOutcome {
        exit_code,
        prompt_path,
        duration: start_time.elapsed(),
        timed_out,
        command: command_str,
    })
}

fn run_variables(request: &RunRequest, prompt_path: &std::path::Path) -> BTreeMap<String, String> {
    let mut variables = BTreeMap::new();
    variables.insert(
        "prompt_file".to_string(),
        prompt_path.to_string_lossy().to_string(),
    );
    variables.insert("agent_id".to_string(), request.agent_id.to_string());
    variables.insert("agent_name".to_string(), request.agent_name.clone());
    variables.insert("tools".to_string(), request.tools.join(","));
    variables
}

fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<(Option<i32>, bool)> {
    let start = Instant::now();
    let poll_interval = Duration::from_millis(100);

    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok((status.code(), false)),
            Ok(None) => {
                if start.elapsed() >= timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Ok((None, true));
                }
                std::thread::sleep(poll_interval);
            }
            Err(e) => {
                return Err(AgentryError::BackendError(format!(
                    "failed to check backend process status: {}",
                    e
                )));
            }
        }
    }
}
