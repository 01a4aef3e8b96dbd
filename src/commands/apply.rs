//! Apply command: replay request files through a session.
//!
//! A session is opened on a [`SimulatedDevice`] with the loaded profile. The
//! forced first pass runs, then every request file is merged, applied and
//! committed in turn. Each pass's configuration writes are reported.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::io::Read;
use std::path::PathBuf;

use crate::config::{self, Profile};
use crate::device::{ConfigRecord, Endpoint, HeapAllocator, SimulatedDevice};
use crate::error::Status;
use crate::logger::Log;
use crate::params::Parameters;
use crate::session::Session;
use crate::settings::Settings;

/// Writes and outcome of one commit pass.
#[derive(Debug, Serialize)]
pub struct PassReport {
    pub source: String,
    pub status: String,
    pub writes: Vec<WriteReport>,
}

#[derive(Debug, Serialize)]
pub struct WriteReport {
    pub endpoint: Endpoint,
    pub record: ConfigRecord,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    passes: &'a [PassReport],
    snapshot: &'a Settings,
    parameters: Parameters,
    log: String,
}

/// Parse a request file: one `key=value` per line, `#` starts a comment.
pub fn parse_request(content: &str) -> Result<Parameters> {
    let mut params = Parameters::new();
    for (index, line) in content.lines().enumerate() {
        let line = match line.split_once('#') {
            Some((before, _)) => before,
            None => line,
        }
        .trim();
        if line.is_empty() {
            continue;
        }

        let (key, value) = line
            .split_once('=')
            .with_context(|| format!("line {}: expected key=value, got \"{line}\"", index + 1))?;
        let key = key.trim();
        if key.is_empty() {
            anyhow::bail!("line {}: empty key", index + 1);
        }
        params.set(key, value.trim());
    }
    Ok(params)
}

fn read_request(file: &str) -> Result<Parameters> {
    let content = if file == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read request from stdin")?;
        content
    } else {
        fs::read_to_string(file).with_context(|| format!("Failed to read request {file}"))?
    };
    parse_request(&content).with_context(|| format!("Invalid request {file}"))
}

fn load_profile(path: Option<&str>) -> Result<Profile> {
    match path {
        Some(path) => {
            let profile = config::load_from_path(&PathBuf::from(path))?;
            profile.log_profile(&format!("profile {path}"));
            Ok(profile)
        }
        None => {
            let profile = config::load()?;
            profile.log_profile("default profile");
            Ok(profile)
        }
    }
}

fn commit(
    session: &Session<SimulatedDevice, HeapAllocator>,
    source: &str,
) -> PassReport {
    let status: Status = session.commit_pending();
    let writes: Vec<WriteReport> = session
        .channel()
        .take_writes()
        .into_iter()
        .map(|(endpoint, record)| WriteReport { endpoint, record })
        .collect();

    log_block_start!("Pass: {source}");
    if writes.is_empty() {
        log_indented!("No configuration writes");
    }
    for write in &writes {
        log_indented!("{}: {}", write.endpoint, describe_record(&write.record));
    }
    if let Err(e) = &status {
        log_error!("{e}");
    }

    PassReport {
        source: source.to_string(),
        status: match &status {
            Ok(()) => "ok".to_string(),
            Err(e) => e.to_string(),
        },
        writes,
    }
}

/// One-line summary of a record for the pass report.
fn describe_record(record: &ConfigRecord) -> String {
    match record {
        ConfigRecord::SharedBuffer { size, .. } => format!("shared buffer ({size} bytes)"),
        other => serde_json::to_string(other).unwrap_or_else(|_| format!("{other:?}")),
    }
}

/// Handle the apply command.
pub fn handle_apply_command(profile: Option<&str>, files: &[String], json: bool) -> Result<()> {
    if json {
        Log::start_capture();
    }

    let result = run(profile, files);

    if json {
        let log = Log::finish_capture();
        let (passes, snapshot, parameters) = result?;
        let output = JsonOutput {
            passes: &passes,
            snapshot: &snapshot,
            parameters,
            log,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let (passes, _, _) = result?;
    let failed = passes.iter().filter(|pass| pass.status != "ok").count();
    if failed > 0 {
        log_block_start!("{failed} of {} pass(es) reported failures", passes.len());
    }
    log_end!();
    Ok(())
}

fn run(profile: Option<&str>, files: &[String]) -> Result<(Vec<PassReport>, Settings, Parameters)> {
    log_version!();
    let profile = load_profile(profile)?;

    let session = Session::open(SimulatedDevice::new(), HeapAllocator::new(), &profile)
        .context("Failed to open session")?;

    let mut passes = vec![commit(&session, "defaults")];
    for file in files {
        let request = read_request(file)?;
        session
            .apply_request(&request)
            .with_context(|| format!("Failed to apply {file}"))?;
        log_debug!("Pending after {file}: {}", session.pending());
        passes.push(commit(&session, file));
    }

    let snapshot = session.snapshot();
    let parameters = session.current_parameters();
    Ok((passes, snapshot, parameters))
}

pub fn display_help() {
    log_version!();
    log_block_start!("apply - Replay request files against a simulated device");
    log_block_start!("Usage: camera3a apply [OPTIONS] <file>...");
    log_block_start!("Arguments:");
    log_indented!("<file>  Request file, one key=value per line ('-' reads stdin)");
    log_block_start!("Options:");
    log_indented!("-p, --profile <path>  Device profile to open the session with");
    log_indented!("-j, --json            Print passes, snapshot and parameters as JSON");
    log_block_start!("Description:");
    log_indented!("Opens a session, commits the forced first pass with every default,");
    log_indented!("then applies and commits each file in order. Each pass lists the");
    log_indented!("configuration records written to the device.");
    log_block_start!("Examples:");
    log_indented!("# Request file");
    log_indented!("scene-mode=auto");
    log_indented!("contrast=150");
    log_indented!("metering-areas=(-250,-250,250,250,1000)");
    log_pipe!();
    log_indented!("camera3a apply night.req");
    log_indented!("camera3a --profile board.toml apply a.req b.req --json");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request_file() {
        let params = parse_request(
            "# night shot\nscene-mode = night\n\ncontrast=150 # boost\nmetering-areas=(0,0,10,10,1)\n",
        )
        .unwrap();
        assert_eq!(params.get("scene-mode"), Some("night"));
        assert_eq!(params.get_int("contrast"), Some(150));
        assert_eq!(params.get("metering-areas"), Some("(0,0,10,10,1)"));
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_parse_request_rejects_bare_words() {
        let err = parse_request("scene-mode=auto\nbrightness\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
        assert!(parse_request("=5").is_err());
    }

    #[test]
    fn test_record_description() {
        assert_eq!(
            describe_record(&ConfigRecord::brightness(5)),
            r#"{"record":"brightness","port":"preview","level":5}"#
        );
    }
}
