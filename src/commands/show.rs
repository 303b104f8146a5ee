//! Implementation of the `agentry show` command.

use crate::cli::ShowArgs;
use crate::commands::resolve_agent;
use crate::config::Config;
use crate::context::AppContext;
use crate::error::Result;
use crate::share::agent_share_path;
use crate::store::AgentStore;
use crate::vars::{ParamSchema, extract_vars};

/// Execute the `agentry show` command.
pub fn cmd_show(args: ShowArgs) -> Result<()> {
    let ctx = AppContext::resolve()?;
    let store = AgentStore::open(ctx.agents_dir())?;
    let config = Config::load(ctx.config_path())?;

    let record = resolve_agent(&store, &args.agent)?;
    let parts = extract_vars(&record.prompt);

    println!("Agent {}: {}", record.id, record.name);
    if !record.description.is_empty() {
        println!("  About:   {}", record.description);
    }
    if !record.tools.is_empty() {
        println!("  Tools:   {}", record.tools.join(", "));
    }
    if let Some(created) = record.created {
        println!("  Created: {}", created.format("%Y-%m-%d %H:%M UTC"));
    }
    println!(
        "  Share:   {}{}",
        config.base_url_trimmed(),
        agent_share_path(record.id, &record.name)
    );

    match &parts.schema {
        Some(schema) if !schema.is_empty() => print_schema(schema),
        _ => {
            println!();
            println!("No parameters declared.");
        }
    }

    println!();
    println!("Prompt body:");
    println!();
    for line in parts.body.lines() {
        println!("  {}", line);
    }

    Ok(())
}

fn print_schema(schema: &ParamSchema) {
    println!();
    println!("Parameters:");
    for (name, spec) in schema.iter() {
        let mut attrs = vec![spec.kind.as_str().to_string()];
        if spec.required {
            attrs.push("required".to_string());
        }
        if let Some(default) = &spec.default {
            attrs.push(format!("default: \"{}\"", default));
        }
        if let Some(options) = &spec.options {
            attrs.push(format!("options: {}", options.join(" | ")));
        }

        println!("  {{{}}}  {} ({})", name, spec.label, attrs.join(", "));
        if let Some(placeholder) = &spec.placeholder {
            println!("        hint: {}", placeholder);
        }
    }
}
