//! Implementation of the `agentry share` command.
//!
//! Prints the agent's public link, and when `--set` values differ from the
//! schema defaults, a `/run` link carrying those values as a query string,
//! mirroring the "base version" / "include current values" choice a share
//! dialog would offer.

use crate::cli::ShareArgs;
use crate::commands::{parse_set_values, resolve_agent};
use crate::config::Config;
use crate::context::AppContext;
use crate::error::Result;
use crate::share::{agent_share_path, run_path_with_values};
use crate::store::AgentStore;
use crate::vars::extract_vars;
use std::collections::BTreeMap;

/// Execute the `agentry share` command.
pub fn cmd_share(args: ShareArgs) -> Result<()> {
    let ctx = AppContext::resolve()?;
    let store = AgentStore::open(ctx.agents_dir())?;
    let config = Config::load(ctx.config_path())?;

    let record = resolve_agent(&store, &args.agent)?;
    let parts = extract_vars(&record.prompt);
    let set_values = parse_set_values(&args.set)?;

    let base = config.base_url_trimmed();
    println!("Share links for agent {} ({}):", record.id, record.name);
    println!();
    println!(
        "  Base version:  {}{}",
        base,
        agent_share_path(record.id, &record.name)
    );

    let changed = changed_values(&parts.schema, &set_values);
    if changed.is_empty() {
        if !set_values.is_empty() {
            println!();
            println!("All --set values match the defaults; no pre-filled link needed.");
        }
        return Ok(());
    }

    println!(
        "  With values:   {}{}",
        base,
        run_path_with_values(record.id, &changed)
    );
    println!();
    println!(
        "  Modified parameters: {}",
        changed.keys().map(String::as_str).collect::<Vec<_>>().join(", ")
    );

    Ok(())
}

/// Keep only the values that differ from the schema defaults.
///
/// Keys the schema does not declare are warned about and dropped; a link
/// prefilling unknown parameters would do nothing on the run page.
fn changed_values(
    schema: &Option<crate::vars::ParamSchema>,
    set_values: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let Some(schema) = schema else {
        for key in set_values.keys() {
            eprintln!("Warning: agent declares no parameters; ignoring --set {}", key);
        }
        return BTreeMap::new();
    };

    let defaults = schema.defaults();
    let mut changed = BTreeMap::new();
    for (key, value) in set_values {
        if schema.get(key).is_none() {
            eprintln!("Warning: unknown parameter '{}'; ignoring", key);
            continue;
        }
        if defaults.get(key).map(String::as_str).unwrap_or("") != value {
            changed.insert(key.clone(), value.clone());
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROMPT: &str = "<!-- VARS\n{\n  \"topic\": {\"label\": \"Topic\"},\n  \"depth\": {\"label\": \"Depth\", \"default\": \"brief\"}\n}\nVARS -->\nResearch {topic} at {depth} depth.";

    fn set(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_changed_excludes_default_matches() {
        let parts = extract_vars(PROMPT);
        let changed = changed_values(&parts.schema, &set(&[("depth", "brief")]));
        assert!(changed.is_empty());
    }

    #[test]
    fn test_changed_includes_new_values() {
        let parts = extract_vars(PROMPT);
        let changed =
            changed_values(&parts.schema, &set(&[("topic", "rust"), ("depth", "brief")]));
        assert_eq!(changed.len(), 1);
        assert_eq!(changed.get("topic").map(String::as_str), Some("rust"));
    }

    #[test]
    fn test_changed_drops_unknown_keys() {
        let parts = extract_vars(PROMPT);
        let changed = changed_values(&parts.schema, &set(&[("bogus", "x")]));
        assert!(changed.is_empty());
    }

    #[test]
    fn test_no_schema_yields_no_changes() {
        let parts = extract_vars("plain prompt");
        let changed = changed_values(&parts.schema, &set(&[("topic", "rust")]));
        assert!(changed.is_empty());
    }
}
