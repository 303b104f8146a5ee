//! Implementation of the `agentry create` command.

use crate::cli::CreateArgs;
use crate::config::Config;
use crate::context::AppContext;
use crate::error::{AgentryError, Result};
use crate::events::{Event, EventAction, append_event};
use crate::share::agent_share_path;
use crate::store::{AgentDraft, AgentStore};
use crate::vars::{ParamSchema, compose_prompt, extract_vars, normalize_param_name};
use serde_json::json;
use std::io::Read;

/// Execute the `agentry create` command.
///
/// Builds the prompt text from `--prompt`, `--prompt-file` or stdin. When
/// `--vars-file` is given, its JSON schema replaces any schema block already
/// present in the prompt.
pub fn cmd_create(args: CreateArgs) -> Result<()> {
    let ctx = AppContext::resolve()?;
    let store = AgentStore::open(ctx.agents_dir())?;

    if args.name.trim().is_empty() {
        return Err(AgentryError::UserError(
            "agent name cannot be empty".to_string(),
        ));
    }

    let raw_prompt = read_prompt(&args)?;
    let prompt = match &args.vars_file {
        Some(path) => {
            let schema = load_schema_file(path)?;
            let parts = extract_vars(&raw_prompt);
            compose_prompt(Some(&schema), &parts.body)
        }
        None => raw_prompt,
    };

    let record = store.insert(AgentDraft {
        name: args.name,
        description: args.description,
        prompt,
        tools: args.tools,
    })?;

    let event = Event::new(EventAction::Create)
        .with_agent(record.id)
        .with_details(json!({"name": record.name}));
    if let Err(e) = append_event(&ctx, &event) {
        eprintln!("Warning: failed to log create event: {}", e);
    }

    let parts = extract_vars(&record.prompt);
    let param_count = parts.schema.as_ref().map_or(0, |s| s.len());

    println!("Created agent {}.", record.id);
    println!();
    println!("  Name:       {}", record.name);
    if !record.description.is_empty() {
        println!("  About:      {}", record.description);
    }
    println!("  Parameters: {}", param_count);
    if !record.tools.is_empty() {
        println!("  Tools:      {}", record.tools.join(", "));
    }

    let config = Config::load(ctx.config_path())?;
    println!(
        "  Share:      {}{}",
        config.base_url_trimmed(),
        agent_share_path(record.id, &record.name)
    );

    Ok(())
}

fn read_prompt(args: &CreateArgs) -> Result<String> {
    if let Some(prompt) = &args.prompt {
        return Ok(prompt.clone());
    }

    if let Some(path) = &args.prompt_file {
        return std::fs::read_to_string(path).map_err(|e| {
            AgentryError::UserError(format!(
                "failed to read prompt file '{}': {}",
                path.display(),
                e
            ))
        });
    }

    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer).map_err(|e| {
        AgentryError::UserError(format!("failed to read prompt from stdin: {}", e))
    })?;
    Ok(buffer)
}

fn load_schema_file(path: &std::path::Path) -> Result<ParamSchema> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        AgentryError::UserError(format!(
            "failed to read vars file '{}': {}",
            path.display(),
            e
        ))
    })?;

    let value: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
        AgentryError::UserError(format!(
            "vars file '{}' is not valid JSON: {}",
            path.display(),
            e
        ))
    })?;

    let parsed = ParamSchema::from_json(&value).ok_or_else(|| {
        AgentryError::UserError(format!(
            "vars file '{}' must contain a JSON object mapping parameter names to specs",
            path.display()
        ))
    })?;

    // Authoring path: parameter names are normalized the way a schema
    // builder form would normalize them. Stored prompts are re-parsed with
    // names taken verbatim.
    let mut schema = ParamSchema::new();
    for (name, spec) in parsed.iter() {
        schema.insert(normalize_param_name(name), spec.clone());
    }
    Ok(schema)
}
