//! CLI argument parsing.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Agentry: author, share and run parameterized agent prompts.
///
/// An agent is a stored prompt template. The prompt may open with a
/// `<!-- VARS ... VARS -->` block declaring named parameters; the body
/// references them as `{name}` tokens that are filled in at run time.
#[derive(Parser, Debug)]
#[command(name = "agentry")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new agent.
    ///
    /// The prompt can come from --prompt, --prompt-file, or stdin. A
    /// parameter schema can be embedded in the prompt text itself or
    /// supplied separately with --vars-file.
    Create(CreateArgs),

    /// List all stored agents.
    List,

    /// Show one agent: metadata, parameter schema and prompt body.
    Show(ShowArgs),

    /// Duplicate an agent under a new id.
    ///
    /// The copy keeps the prompt, description and tools; its name is
    /// prefixed with "Copy of".
    Fork(ForkArgs),

    /// Run an agent through an execution backend.
    ///
    /// Parameter values come from schema defaults overlaid with --set
    /// flags. When every required parameter has a value the backend
    /// receives the substituted prompt; otherwise it receives the raw
    /// body unchanged.
    Run(RunArgs),

    /// Print share links for an agent.
    ///
    /// Prints the public page link, and when --set values differ from
    /// the schema defaults, a pre-filled run link as well.
    Share(ShareArgs),

    /// List configured execution backends.
    Backends,
}

/// Arguments for the `create` command.
#[derive(Parser, Debug)]
pub struct CreateArgs {
    /// Display name for the new agent.
    pub name: String,

    /// Short description shown in listings.
    #[arg(short, long, default_value = "")]
    pub description: String,

    /// Prompt text, inline.
    #[arg(long, conflicts_with = "prompt_file")]
    pub prompt: Option<String>,

    /// Read the prompt text from a file.
    #[arg(long)]
    pub prompt_file: Option<PathBuf>,

    /// JSON file with a parameter schema to embed into the prompt.
    ///
    /// Replaces any schema block already present in the prompt text.
    #[arg(long)]
    pub vars_file: Option<PathBuf>,

    /// Tool names to grant the agent.
    #[arg(long, value_delimiter = ',')]
    pub tools: Vec<String>,
}

/// Arguments for the `show` command.
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Agent id, or a share slug like `12-my-agent`.
    pub agent: String,
}

/// Arguments for the `fork` command.
#[derive(Parser, Debug)]
pub struct ForkArgs {
    /// Agent id, or a share slug like `12-my-agent`.
    pub agent: String,
}

/// Arguments for the `run` command.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Agent id, or a share slug like `12-my-agent`.
    pub agent: String,

    /// Parameter value as KEY=VALUE. Repeatable.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Backend profile to use instead of the default.
    #[arg(long)]
    pub backend: Option<String>,

    /// Print the effective prompt without executing anything.
    #[arg(long)]
    pub preview: bool,

    /// Resolve the backend and print what would run, without executing.
    #[arg(long)]
    pub dry_run: bool,

    /// Override the backend timeout, in seconds.
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,
}

/// Arguments for the `share` command.
#[derive(Parser, Debug)]
pub struct ShareArgs {
    /// Agent id, or a share slug like `12-my-agent`.
    pub agent: String,

    /// Parameter value as KEY=VALUE, included in the run link when it
    /// differs from the schema default. Repeatable.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_debug_assert() {
        // Verifies the CLI arguments configuration is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_list() {
        let cli = Cli::try_parse_from(["agentry", "list"]).unwrap();
        assert!(matches!(cli.command, Command::List));
    }

    #[test]
    fn parse_create_with_options() {
        let cli = Cli::try_parse_from([
            "agentry",
            "create",
            "Research Agent",
            "--description",
            "finds papers",
            "--prompt",
            "Find {topic}",
            "--tools",
            "search,fetch",
        ])
        .unwrap();

        let Command::Create(args) = cli.command else {
            panic!("expected create");
        };
        assert_eq!(args.name, "Research Agent");
        assert_eq!(args.description, "finds papers");
        assert_eq!(args.prompt.as_deref(), Some("Find {topic}"));
        assert_eq!(args.tools, vec!["search", "fetch"]);
    }

    #[test]
    fn parse_create_rejects_prompt_and_prompt_file_together() {
        let result = Cli::try_parse_from([
            "agentry",
            "create",
            "X",
            "--prompt",
            "inline",
            "--prompt-file",
            "p.md",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_run_with_sets() {
        let cli = Cli::try_parse_from([
            "agentry",
            "run",
            "12-my-agent",
            "--set",
            "topic=rust",
            "--set",
            "depth=deep",
            "--backend",
            "echo",
            "--preview",
        ])
        .unwrap();

        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.agent, "12-my-agent");
        assert_eq!(args.set, vec!["topic=rust", "depth=deep"]);
        assert_eq!(args.backend.as_deref(), Some("echo"));
        assert!(args.preview);
        assert!(!args.dry_run);
        assert!(args.timeout.is_none());
    }

    #[test]
    fn parse_share() {
        let cli =
            Cli::try_parse_from(["agentry", "share", "3", "--set", "q=hello"]).unwrap();
        let Command::Share(args) = cli.command else {
            panic!("expected share");
        };
        assert_eq!(args.agent, "3");
        assert_eq!(args.set, vec!["q=hello"]);
    }

    #[test]
    fn parse_backends() {
        let cli = Cli::try_parse_from(["agentry", "backends"]).unwrap();
        assert!(matches!(cli.command, Command::Backends));
    }

    #[test]
    fn parse_fork() {
        let cli = Cli::try_parse_from(["agentry", "fork", "7"]).unwrap();
        let Command::Fork(args) = cli.command else {
            panic!("expected fork");
        };
        assert_eq!(args.agent, "7");
    }
}
