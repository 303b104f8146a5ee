//! Implementation of the `agentry fork` command.

use crate::cli::ForkArgs;
use crate::commands::resolve_agent;
use crate::config::Config;
use crate::context::AppContext;
use crate::error::Result;
use crate::events::{Event, EventAction, append_event};
use crate::share::agent_share_path;
use crate::store::AgentStore;
use serde_json::json;

/// Execute the `agentry fork` command.
///
/// Duplicates the source agent's prompt, description and tools under a new
/// id, with the name prefixed "Copy of".
pub fn cmd_fork(args: ForkArgs) -> Result<()> {
    let ctx = AppContext::resolve()?;
    let store = AgentStore::open(ctx.agents_dir())?;

    let source = resolve_agent(&store, &args.agent)?;
    let forked = store.fork(source.id)?;

    let event = Event::new(EventAction::Fork)
        .with_agent(forked.id)
        .with_details(json!({"source": source.id, "name": forked.name}));
    if let Err(e) = append_event(&ctx, &event) {
        eprintln!("Warning: failed to log fork event: {}", e);
    }

    let config = Config::load(ctx.config_path())?;
    println!("Forked agent {} into {}.", source.id, forked.id);
    println!();
    println!("  Name:  {}", forked.name);
    println!(
        "  Share: {}{}",
        config.base_url_trimmed(),
        agent_share_path(forked.id, &forked.name)
    );

    Ok(())
}
