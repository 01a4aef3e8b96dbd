//! Command-line entry point.
//!
//! Parses arguments, configures logging and dispatches to the command
//! handlers in the library.

use anyhow::Result;

use camera3a::args::{CliAction, ParsedArgs, display_help, display_version_info};
use camera3a::commands;
use camera3a::logger::Log;
use camera3a::{log_error_exit, log_pipe};

fn main() {
    let parsed = ParsedArgs::from_env();

    if let Err(e) = run(parsed.action) {
        log_pipe!();
        log_error_exit!("{e:#}");
        std::process::exit(1);
    }
}

fn run(action: CliAction) -> Result<()> {
    match action {
        CliAction::ShowVersion => {
            display_version_info();
            Ok(())
        }
        CliAction::ShowHelp => {
            display_help();
            Ok(())
        }
        CliAction::ShowHelpDueToError => {
            display_help();
            std::process::exit(1);
        }
        CliAction::HelpCommand { command } => commands::help::run_help_command(command.as_deref()),
        CliAction::Tables { debug_enabled } => {
            Log::set_debug(debug_enabled);
            commands::tables::handle_tables_command()
        }
        CliAction::Apply {
            debug_enabled,
            profile,
            files,
            json,
        } => {
            Log::set_debug(debug_enabled);
            commands::apply::handle_apply_command(profile.as_deref(), &files, json)
        }
    }
}
