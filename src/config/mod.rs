//! Device profile configuration.
//!
//! A profile describes the capabilities of the device a session is opened on
//! and the default value of every control dimension. It is read from TOML:
//!
//! 1. **`--profile PATH`** when given on the command line
//! 2. **XDG_CONFIG_HOME**/camera3a/profile.toml otherwise
//! 3. Built-in defaults when neither exists
//!
//! ## Profile Structure
//!
//! ```toml
//! preview_width = 640                      # Preview frame width in pixels
//! preview_height = 480                     # Preview frame height in pixels
//! max_metering_areas = 1                   # Metering areas accepted per request (0-35)
//! auto_exposure_lock_supported = true      # Device exposes an exposure lock
//! auto_white_balance_lock_supported = true # Device exposes a white balance lock
//!
//! [defaults]
//! scene_mode = "auto"
//! exposure_compensation = 0                # Tenths of a stop (-30..30)
//! white_balance = "auto"
//! antibanding = "auto"
//! sharpness = 100                          # 0-200
//! brightness = 50                          # 0-100
//! contrast = 100                           # 0-200
//! iso = "auto"
//! saturation = 100                         # 0-200
//! effect = "none"
//! focus_mode = "infinity"
//! exposure = "auto"
//! flash_mode = "off"
//! ```
//!
//! Every field is optional. Values are validated on load; enum defaults must
//! name an entry of their translation table.

pub mod loading;
pub mod validation;

use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

use crate::constants::*;
use crate::params::Parameters;
use crate::settings::Defaults;

pub use loading::{get_profile_path, load, load_from_path};
pub use validation::validate_profile;

/// Per-dimension default overrides from the `[defaults]` table.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DefaultsConfig {
    pub scene_mode: Option<String>,
    pub exposure_compensation: Option<i32>,
    pub white_balance: Option<String>,
    pub antibanding: Option<String>,
    pub sharpness: Option<i32>,
    pub brightness: Option<i32>,
    pub contrast: Option<i32>,
    pub iso: Option<String>,
    pub saturation: Option<i32>,
    pub effect: Option<String>,
    pub focus_mode: Option<String>,
    pub exposure: Option<String>,
    pub flash_mode: Option<String>,
}

/// Capabilities and defaults of one device.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    pub preview_width: Option<u32>,
    pub preview_height: Option<u32>,
    pub max_metering_areas: Option<u32>,
    pub auto_exposure_lock_supported: Option<bool>,
    pub auto_white_balance_lock_supported: Option<bool>,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

impl Profile {
    /// Load using the default search path.
    pub fn load() -> Result<Self> {
        load()
    }

    /// Load from an explicit path.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        load_from_path(path)
    }

    pub fn preview_size(&self) -> (u32, u32) {
        (
            self.preview_width.unwrap_or(DEFAULT_PREVIEW_WIDTH),
            self.preview_height.unwrap_or(DEFAULT_PREVIEW_HEIGHT),
        )
    }

    pub fn max_metering_areas(&self) -> u32 {
        self.max_metering_areas
            .unwrap_or(DEFAULT_MAX_METERING_AREAS)
    }

    pub fn exposure_lock_supported(&self) -> bool {
        self.auto_exposure_lock_supported.unwrap_or(true)
    }

    pub fn white_balance_lock_supported(&self) -> bool {
        self.auto_white_balance_lock_supported.unwrap_or(true)
    }

    /// Default values with the profile's overrides applied.
    pub fn defaults(&self) -> Defaults {
        let base = Defaults::default();
        let table = &self.defaults;
        Defaults {
            scene_mode: table.scene_mode.clone().unwrap_or(base.scene_mode),
            ev_compensation: table.exposure_compensation.unwrap_or(base.ev_compensation),
            white_balance: table.white_balance.clone().unwrap_or(base.white_balance),
            antibanding: table.antibanding.clone().unwrap_or(base.antibanding),
            sharpness: table.sharpness.unwrap_or(base.sharpness),
            brightness: table.brightness.unwrap_or(base.brightness),
            contrast: table.contrast.unwrap_or(base.contrast),
            iso: table.iso.clone().unwrap_or(base.iso),
            saturation: table.saturation.unwrap_or(base.saturation),
            effect: table.effect.clone().unwrap_or(base.effect),
            focus_mode: table.focus_mode.clone().unwrap_or(base.focus_mode),
            exposure_mode: table.exposure.clone().unwrap_or(base.exposure_mode),
            flash_mode: table.flash_mode.clone().unwrap_or(base.flash_mode),
        }
    }

    /// Capability fields a session advertises in its visible parameters.
    pub fn capabilities(&self) -> Parameters {
        let flag = |supported: bool| if supported { TRUE } else { FALSE };

        let mut params = Parameters::new();
        params.set(
            KEY_MAX_NUM_METERING_AREAS,
            self.max_metering_areas().to_string(),
        );
        params.set(
            KEY_AUTO_EXPOSURE_LOCK_SUPPORTED,
            flag(self.exposure_lock_supported()),
        );
        params.set(
            KEY_AUTO_WHITEBALANCE_LOCK_SUPPORTED,
            flag(self.white_balance_lock_supported()),
        );
        params
    }

    pub fn log_profile(&self, source: &str) {
        let (width, height) = self.preview_size();
        let defaults = self.defaults();

        log_block_start!("Loaded {source}");
        log_indented!("Preview: {width}x{height}");
        log_indented!("Metering areas: up to {}", self.max_metering_areas());
        log_indented!(
            "Locks: exposure {}, white balance {}",
            supported_label(self.exposure_lock_supported()),
            supported_label(self.white_balance_lock_supported())
        );
        log_indented!(
            "Scene: {}, focus: {}, flash: {}",
            defaults.scene_mode,
            defaults.focus_mode,
            defaults.flash_mode
        );
    }
}

fn supported_label(supported: bool) -> &'static str {
    if supported { "supported" } else { "unsupported" }
}

#[cfg(test)]
mod tests;
