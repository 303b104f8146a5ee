//! Implementation of the `agentry backends` command.

use crate::backend::BackendsConfig;
use crate::context::AppContext;
use crate::error::Result;

/// Execute the `agentry backends` command.
pub fn cmd_backends() -> Result<()> {
    let ctx = AppContext::resolve()?;

    let Some(config) = BackendsConfig::load(ctx.backends_config_path())? else {
        println!(
            "No backends configured ({} not found).",
            ctx.backends_config_path().display()
        );
        println!();
        println!("Example backends.yaml:");
        println!();
        println!("backends:");
        println!("  claude:");
        println!("    name: \"Claude CLI\"");
        println!("    command: \"claude -p {{prompt_file}}\"");
        println!("    default: true");
        return Ok(());
    };

    if config.backends.is_empty() {
        println!("backends.yaml exists but declares no backends.");
        return Ok(());
    }

    println!("{} backend(s):", config.backends.len());
    println!();
    for (id, profile) in config.iter() {
        let marker = if profile.default { " (default)" } else { "" };
        println!("  {}{}", id, marker);
        if !profile.name.is_empty() {
            println!("    Name:    {}", profile.name);
        }
        println!("    Command: {}", profile.command);
        println!(
            "    Timeout: {}s",
            profile.effective_timeout(&config.defaults)
        );
    }

    Ok(())
}
