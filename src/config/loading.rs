//! Profile loading.
//!
//! Resolves the profile path, reads and parses the TOML file and validates
//! the result.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use super::Profile;
use super::validation::validate_profile;

/// Default profile location: `$XDG_CONFIG_HOME/camera3a/profile.toml`.
pub fn get_profile_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config_dir.join("camera3a").join("profile.toml"))
}

/// Load the profile from the default location.
///
/// A missing file is not an error: the built-in defaults are used instead.
pub fn load() -> Result<Profile> {
    let path = get_profile_path()?;
    if !path.exists() {
        log_debug!(
            "No profile at {}, using built-in defaults",
            path.display()
        );
        return Ok(Profile::default());
    }

    load_from_path(&path)
        .with_context(|| format!("Failed to load profile from {}", path.display()))
}

/// Load the profile from an explicit path. The file must exist.
pub fn load_from_path(path: &PathBuf) -> Result<Profile> {
    if !path.exists() {
        anyhow::bail!("Profile not found at {}", path.display());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read profile from {}", path.display()))?;

    let profile: Profile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse profile from {}", path.display()))?;

    validate_profile(&profile)?;

    Ok(profile)
}
