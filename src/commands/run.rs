//! Implementation of the `agentry run` command.
//!
//! Builds the effective prompt for an agent and hands it to an execution
//! backend. Parameter values start from the schema defaults and are overlaid
//! with `--set` flags; when a required parameter still has no value, the run
//! falls back to the raw template body.

use crate::backend::{BackendDefaults, BackendProfile, BackendsConfig, RunRequest, execute_backend};
use crate::cli::RunArgs;
use crate::commands::{parse_set_values, resolve_agent};
use crate::config::Config;
use crate::context::AppContext;
use crate::error::{AgentryError, Result};
use crate::events::{Event, EventAction, append_event};
use crate::store::AgentStore;
use crate::vars::{PromptParts, extract_vars, missing_required, override_prompt};
use serde_json::json;

/// Execute the `agentry run` command.
pub fn cmd_run(args: RunArgs) -> Result<()> {
    let ctx = AppContext::resolve()?;
    let store = AgentStore::open(ctx.agents_dir())?;

    let record = resolve_agent(&store, &args.agent)?;
    let parts = extract_vars(&record.prompt);
    let set_values = parse_set_values(&args.set)?;

    let effective_prompt = build_effective_prompt(&parts, &set_values);

    if args.preview {
        println!("{}", effective_prompt);
        return Ok(());
    }

    let config = Config::load(ctx.config_path())?;
    let backends = load_backends(&ctx)?;
    let (backend_id, profile) =
        backends.select(args.backend.as_deref(), config.default_backend.as_deref())?;
    let timeout = resolve_timeout(args.timeout, profile, &backends.defaults)?;

    if args.dry_run {
        println!("Dry run: nothing will be executed.");
        println!();
        println!("  Agent:   {} ({})", record.id, record.name);
        println!("  Backend: {} ({})", backend_id, profile.name);
        println!("  Command: {}", profile.command);
        println!("  Timeout: {}s", timeout);
        println!();
        println!("Effective prompt:");
        println!();
        for line in effective_prompt.lines() {
            println!("  {}", line);
        }
        return Ok(());
    }

    println!("Running agent {} ({})...", record.id, record.name);
    println!();
    println!("  Backend: {} ({})", backend_id, profile.name);
    println!("  Timeout: {}s", timeout);
    println!();

    let dispatch_event = Event::new(EventAction::RunDispatch)
        .with_agent(record.id)
        .with_details(json!({
            "backend": backend_id,
            "timeout_seconds": timeout,
        }));
    if let Err(e) = append_event(&ctx, &dispatch_event) {
        eprintln!("Warning: failed to log run_dispatch event: {}", e);
    }

    let request = RunRequest {
        agent_id: record.id,
        agent_name: record.name.clone(),
        tools: record.tools.clone(),
        prompt: effective_prompt,
    };
    let outcome = execute_backend(&ctx, profile, &request, timeout)?;

    let complete_event = Event::new(EventAction::RunComplete)
        .with_agent(record.id)
        .with_details(json!({
            "backend": backend_id,
            "exit_code": outcome.exit_code,
            "duration_ms": outcome.duration.as_millis() as u64,
            "timed_out": outcome.timed_out,
            "success": outcome.is_success(),
        }));
    if let Err(e) = append_event(&ctx, &complete_event) {
        eprintln!("Warning: failed to log run_complete event: {}", e);
    }

    println!();
    println!("Run complete.");
    println!("  Duration: {:.2}s", outcome.duration.as_secs_f64());
    println!("  Prompt:   {}", outcome.prompt_path.display());

    if outcome.timed_out {
        return Err(AgentryError::BackendError(format!(
            "backend '{}' timed out after {}s and was killed",
            backend_id, timeout
        )));
    }

    match outcome.exit_code {
        Some(0) => Ok(()),
        Some(code) => Err(AgentryError::BackendError(format!(
            "backend '{}' exited with code {}",
            backend_id, code
        ))),
        None => Err(AgentryError::BackendError(format!(
            "backend '{}' was killed before exiting",
            backend_id
        ))),
    }
}

/// Combine schema defaults with `--set` overrides and substitute.
///
/// Keys that the schema does not declare are warned about and ignored.
/// Without a schema, or with required parameters still unfilled, the raw
/// body runs unchanged.
fn build_effective_prompt(
    parts: &PromptParts,
    set_values: &std::collections::BTreeMap<String, String>,
) -> String {
    let Some(schema) = &parts.schema else {
        for key in set_values.keys() {
            eprintln!("Warning: agent declares no parameters; ignoring --set {}", key);
        }
        return parts.body.clone();
    };

    let mut values = schema.defaults();
    for (key, value) in set_values {
        if schema.get(key).is_some() {
            values.insert(key.clone(), value.clone());
        } else {
            eprintln!("Warning: unknown parameter '{}'; ignoring", key);
        }
    }

    match override_prompt(schema, &parts.body, &values) {
        Some(prompt) => prompt,
        None => {
            let missing = missing_required(schema, &values);
            if !missing.is_empty() {
                eprintln!(
                    "Warning: required parameter(s) not set: {}. Running the raw template body.",
                    missing.join(", ")
                );
            }
            parts.body.clone()
        }
    }
}

/// Effective timeout for this run, same zero rule as `backends.yaml`.
fn resolve_timeout(
    requested: Option<u64>,
    profile: &BackendProfile,
    defaults: &BackendDefaults,
) -> Result<u64> {
    match requested {
        Some(0) => Err(AgentryError::UserError(
            "--timeout must be greater than 0\n\nFix: pass a timeout of at least 1 second."
                .to_string(),
        )),
        Some(seconds) => Ok(seconds),
        None => Ok(profile.effective_timeout(defaults)),
    }
}

fn load_backends(ctx: &AppContext) -> Result<BackendsConfig> {
    BackendsConfig::load(ctx.backends_config_path())?.ok_or_else(|| {
        AgentryError::UserError(format!(
            "backends.yaml not found at '{}'\n\n\
             Create a backends.yaml file to configure execution backends.\n\n\
             Example backends.yaml:\n\
             backends:\n  \
               claude:\n    \
                 name: \"Claude CLI\"\n    \
                 command: \"claude -p {{prompt_file}}\"\n    \
                 default: true",
            ctx.backends_config_path().display()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    const PROMPT: &str = "<!-- VARS\n{\n  \"topic\": {\"label\": \"Topic\", \"required\": true},\n  \"depth\": {\"label\": \"Depth\", \"default\": \"brief\"}\n}\nVARS -->\nResearch {topic} at {depth} depth.";

    fn set(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_effective_prompt_with_all_values() {
        let parts = extract_vars(PROMPT);
        let prompt = build_effective_prompt(&parts, &set(&[("topic", "rust")]));
        assert_eq!(prompt, "Research rust at brief depth.");
    }

    #[test]
    fn test_set_overrides_default() {
        let parts = extract_vars(PROMPT);
        let prompt =
            build_effective_prompt(&parts, &set(&[("topic", "rust"), ("depth", "full")]));
        assert_eq!(prompt, "Research rust at full depth.");
    }

    #[test]
    fn test_missing_required_falls_back_to_raw_body() {
        let parts = extract_vars(PROMPT);
        let prompt = build_effective_prompt(&parts, &BTreeMap::new());
        assert_eq!(prompt, "Research {topic} at {depth} depth.");
    }

    #[test]
    fn test_unknown_set_key_ignored() {
        let parts = extract_vars(PROMPT);
        let prompt =
            build_effective_prompt(&parts, &set(&[("topic", "rust"), ("bogus", "x")]));
        assert_eq!(prompt, "Research rust at brief depth.");
    }

    #[test]
    fn test_timeout_zero_rejected() {
        let profile = BackendProfile {
            command: "true".to_string(),
            ..Default::default()
        };
        let err = resolve_timeout(Some(0), &profile, &BackendDefaults::default()).unwrap_err();
        assert!(matches!(err, AgentryError::UserError(_)));
        assert!(err.to_string().contains("greater than 0"));
    }

    #[test]
    fn test_timeout_flag_overrides_profile() {
        let profile = BackendProfile {
            command: "true".to_string(),
            timeout_seconds: Some(30),
            ..Default::default()
        };
        let defaults = BackendDefaults::default();
        assert_eq!(resolve_timeout(Some(5), &profile, &defaults).unwrap(), 5);
        assert_eq!(resolve_timeout(None, &profile, &defaults).unwrap(), 30);
    }

    #[test]
    fn test_no_schema_runs_raw_prompt() {
        let parts = extract_vars("Just a plain prompt about {things}");
        let prompt = build_effective_prompt(&parts, &set(&[("things", "stuff")]));
        assert_eq!(prompt, "Just a plain prompt about {things}");
    }
}
