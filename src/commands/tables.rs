//! Tables command: list the request vocabulary of every enum setting.

use anyhow::Result;

use crate::tables::ALL_TABLES;

/// Handle the tables command.
pub fn handle_tables_command() -> Result<()> {
    log_version!();

    for table in ALL_TABLES {
        log_block_start!("{}", table.dimension);
        for (name, code) in table.entries {
            // Names sharing a code with an earlier entry are aliases
            let alias = table
                .to_symbol(*code)
                .filter(|first| first != name)
                .map(|first| format!(" (alias of {first})"))
                .unwrap_or_default();
            log_indented!("{name:<20} {code:#010x}{alias}");
        }
    }

    log_end!();
    Ok(())
}

pub fn display_help() {
    log_version!();
    log_block_start!("tables - List the request vocabulary of every setting");
    log_block_start!("Usage: camera3a tables");
    log_block_start!("Description:");
    log_indented!("Prints each translation table in lookup order with the device code");
    log_indented!("every name selects. When two names share a code, the first one is");
    log_indented!("what the device state is reported as.");
    log_end!();
}
