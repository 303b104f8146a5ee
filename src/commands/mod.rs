//! Command implementations.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, plus helpers shared across commands: resolving an agent
//! reference and parsing `--set KEY=VALUE` flags.

mod backends;
mod create;
mod fork;
mod list;
mod run;
mod share;
mod show;

use crate::cli::Command;
use crate::error::{AgentryError, Result};
use crate::share::resolve_share_ref;
use crate::store::{AgentRecord, AgentStore};
use std::collections::BTreeMap;

/// Dispatch a command to its implementation.
pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Create(args) => create::cmd_create(args),
        Command::List => list::cmd_list(),
        Command::Show(args) => show::cmd_show(args),
        Command::Fork(args) => fork::cmd_fork(args),
        Command::Run(args) => run::cmd_run(args),
        Command::Share(args) => share::cmd_share(args),
        Command::Backends => backends::cmd_backends(),
    }
}

/// Resolve an agent reference (a bare id or a share slug) to a record.
pub(crate) fn resolve_agent(store: &AgentStore, reference: &str) -> Result<AgentRecord> {
    let id = resolve_share_ref(reference).ok_or_else(|| {
        AgentryError::UserError(format!(
            "invalid agent reference '{}'.\n\
             Fix: pass a numeric id or a share slug like `12-my-agent`",
            reference
        ))
    })?;
    store.get_required(id)
}

/// Parse repeated `KEY=VALUE` flags into a value map. Later flags win.
pub(crate) fn parse_set_values(pairs: &[String]) -> Result<BTreeMap<String, String>> {
    let mut values = BTreeMap::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(AgentryError::UserError(format!(
                "invalid --set value '{}'.\n\
                 Fix: use --set KEY=VALUE",
                pair
            )));
        };
        if key.is_empty() {
            return Err(AgentryError::UserError(format!(
                "invalid --set value '{}': empty key",
                pair
            )));
        }
        values.insert(key.to_string(), value.to_string());
    }
    Ok(values)
}
