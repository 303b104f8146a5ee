//! Main entry point for the `agentry` CLI. Parses arguments, dispatches to
//! the appropriate command handler, and maps errors to exit codes.

use agentry::cli::Cli;
use agentry::{commands, exit_codes};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    match commands::dispatch(cli.command) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            // User-actionable message goes to stderr
            eprintln!("Error: {}", err);
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
