//! Command-line argument parsing and processing.
//!
//! Arguments are parsed by hand into a [`CliAction`]. Global flags may appear
//! before or after the command; the first positional argument selects the
//! command and the rest belong to it.

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Replay request files through a session on a simulated device
    Apply {
        debug_enabled: bool,
        profile: Option<String>,
        files: Vec<String>,
        json: bool,
    },
    /// Print the translation tables
    Tables { debug_enabled: bool },
    /// Show help for one command
    HelpCommand { command: Option<String> },
    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to unknown arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// # Arguments
    /// * `args` - Iterator over command-line arguments (typically from std::env::args())
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut debug_enabled = false;
        let mut display_help = false;
        let mut display_version = false;
        let mut json = false;
        let mut unknown_arg_found = false;
        let mut profile: Option<String> = None;
        let mut positionals: Vec<String> = Vec::new();

        let mut args_iter = args.into_iter().skip(1).map(|s| s.as_ref().to_string());
        while let Some(arg) = args_iter.next() {
            match arg.as_str() {
                "-d" | "--debug" => debug_enabled = true,
                "-h" | "--help" => display_help = true,
                "-V" | "-v" | "--version" => display_version = true,
                "-j" | "--json" => json = true,
                "-p" | "--profile" => match args_iter.next() {
                    Some(path) => profile = Some(path),
                    None => {
                        log_warning!("Missing path after {arg}");
                        unknown_arg_found = true;
                    }
                },
                flag if flag.starts_with('-') && flag.len() > 1 => {
                    log_warning!("Unknown argument: {flag}");
                    unknown_arg_found = true;
                }
                _ => positionals.push(arg),
            }
        }

        let action = if display_version {
            CliAction::ShowVersion
        } else if display_help {
            CliAction::ShowHelp
        } else if unknown_arg_found {
            CliAction::ShowHelpDueToError
        } else {
            let mut positionals = positionals.into_iter();
            match positionals.next().as_deref() {
                None => CliAction::ShowHelp,
                Some("apply" | "a") => CliAction::Apply {
                    debug_enabled,
                    profile,
                    files: positionals.collect(),
                    json,
                },
                Some("tables" | "t") => CliAction::Tables { debug_enabled },
                Some("help" | "h") => CliAction::HelpCommand {
                    command: positionals.next(),
                },
                Some(unknown) => {
                    log_warning!("Unknown command: {unknown}");
                    CliAction::ShowHelpDueToError
                }
            }
        };

        ParsedArgs { action }
    }

    /// Convenience method to parse from std::env::args()
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}

/// Displays version information using custom logging style.
pub fn display_version_info() {
    log_version!();
    log_pipe!();
    println!("┗ {}", env!("CARGO_PKG_DESCRIPTION"));
}

/// Displays custom help message using logger methods.
pub fn display_help() {
    log_version!();
    log_block_start!("{}", env!("CARGO_PKG_DESCRIPTION"));
    log_block_start!("Usage:");
    log_indented!("camera3a [OPTIONS] <COMMAND>");
    log_block_start!("Options:");
    log_indented!("-d, --debug            Show every configuration write");
    log_indented!("-p, --profile <path>   Use this device profile");
    log_indented!("-j, --json             Print the session result as JSON (apply)");
    log_indented!("-h, --help             Print help information");
    log_indented!("-V, --version          Print version information");
    log_block_start!("Commands:");
    log_indented!("apply, a <file>...     Replay request files against a simulated device");
    log_indented!("tables, t              List the request vocabulary of every setting");
    log_indented!("help, h [COMMAND]      Show detailed help for a command");
    log_end!();
}
