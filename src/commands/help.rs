//! Help command implementation.
//!
//! Shows command-specific help or general help based on the arguments
//! provided.

use anyhow::Result;

/// Run the help command (dispatcher)
///
/// # Arguments
/// * `command` - Optional command name to get help for (None = general help)
pub fn run_help_command(command: Option<&str>) -> Result<()> {
    match command {
        None => display_general_help(),
        Some("apply" | "a") => super::apply::display_help(),
        Some("tables" | "t") => super::tables::display_help(),
        Some("help" | "h") => display_help_help(),
        Some(unknown) => {
            log_warning!("Unknown command: {unknown}");
            display_general_help();
        }
    }
    Ok(())
}

/// Display general help focused on commands (for the help command)
fn display_general_help() {
    log_version!();
    log_block_start!("Available Commands:");
    log_indented!("apply, a <file>...      Replay request files against a simulated device");
    log_indented!("help, h [COMMAND]       Show detailed help for a command");
    log_indented!("tables, t               List the request vocabulary of every setting");
    log_pipe!();
    log_info!("Use 'camera3a help <command>' to see detailed help for a specific command.");
    log_indented!("Use 'camera3a --help' to see all options and general usage.");
    log_end!();
}

/// Display help for the help command itself
fn display_help_help() {
    log_version!();
    log_block_start!("help - Display help information");
    log_block_start!("Usage: camera3a help [COMMAND]");
    log_block_start!("Arguments:");
    log_indented!("COMMAND  Optional command to get help for");
    log_indented!("         If omitted, shows general help");
    log_block_start!("Examples:");
    log_indented!("camera3a help");
    log_indented!("camera3a help apply");
    log_end!();
}
