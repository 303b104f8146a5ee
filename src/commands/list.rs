//! Implementation of the `agentry list` command.

use crate::context::AppContext;
use crate::error::Result;
use crate::store::AgentStore;
use crate::vars::extract_vars;

/// Execute the `agentry list` command.
pub fn cmd_list() -> Result<()> {
    let ctx = AppContext::resolve()?;
    let store = AgentStore::open(ctx.agents_dir())?;

    let records = store.list()?;
    if records.is_empty() {
        println!("No agents yet.");
        println!();
        println!("Create one with `agentry create NAME --prompt \"...\"`.");
        return Ok(());
    }

    println!("{} agent(s):", records.len());
    println!();
    for record in records {
        let parts = extract_vars(&record.prompt);
        let param_count = parts.schema.as_ref().map_or(0, |s| s.len());

        let mut summary = format!("{} param(s)", param_count);
        if !record.tools.is_empty() {
            summary.push_str(&format!(", tools: {}", record.tools.join(", ")));
        }

        println!("  {:>4}  {}  [{}]", record.id, record.name, summary);
        if !record.description.is_empty() {
            println!("        {}", record.description);
        }
    }

    Ok(())
}
