//! Profile validation.
//!
//! Rejects profiles a session could not be opened with: impossible preview
//! sizes, more metering areas than the packed record holds, out-of-range
//! scalar defaults and default names missing from their translation tables.

use anyhow::Result;

use super::Profile;
use crate::constants::*;
use crate::tables::{self, TranslationTable};

/// Validate every field of `profile`.
pub fn validate_profile(profile: &Profile) -> Result<()> {
    if profile.preview_width == Some(0) || profile.preview_height == Some(0) {
        anyhow::bail!(
            "preview size must be non-zero (got {}x{})",
            profile.preview_width.unwrap_or(DEFAULT_PREVIEW_WIDTH),
            profile.preview_height.unwrap_or(DEFAULT_PREVIEW_HEIGHT)
        );
    }

    if let Some(max_areas) = profile.max_metering_areas
        && max_areas as usize > MAX_ALGO_AREAS
    {
        anyhow::bail!(
            "max_metering_areas ({}) must not exceed {}",
            max_areas,
            MAX_ALGO_AREAS
        );
    }

    let defaults = &profile.defaults;

    if let Some(ev) = defaults.exposure_compensation
        && !(MINIMUM_EV_COMPENSATION..=MAXIMUM_EV_COMPENSATION).contains(&ev)
    {
        anyhow::bail!(
            "exposure_compensation ({}) must be between {} and {}",
            ev,
            MINIMUM_EV_COMPENSATION,
            MAXIMUM_EV_COMPENSATION
        );
    }

    if let Some(brightness) = defaults.brightness
        && !(MINIMUM_BRIGHTNESS..=MAXIMUM_BRIGHTNESS).contains(&brightness)
    {
        anyhow::bail!(
            "brightness ({}) must be between {} and {}",
            brightness,
            MINIMUM_BRIGHTNESS,
            MAXIMUM_BRIGHTNESS
        );
    }

    validate_offset_level("sharpness", defaults.sharpness)?;
    validate_offset_level("contrast", defaults.contrast)?;
    validate_offset_level("saturation", defaults.saturation)?;

    validate_name("scene_mode", &defaults.scene_mode, &tables::SCENE)?;
    validate_name("white_balance", &defaults.white_balance, &tables::WHITE_BALANCE)?;
    validate_name("antibanding", &defaults.antibanding, &tables::FLICKER)?;
    validate_name("iso", &defaults.iso, &tables::ISO)?;
    validate_name("effect", &defaults.effect, &tables::EFFECT)?;
    validate_name("focus_mode", &defaults.focus_mode, &tables::FOCUS)?;
    validate_name("exposure", &defaults.exposure, &tables::EXPOSURE)?;
    validate_name("flash_mode", &defaults.flash_mode, &tables::FLASH)?;

    Ok(())
}

fn validate_offset_level(field: &str, value: Option<i32>) -> Result<()> {
    if let Some(level) = value
        && !(MINIMUM_OFFSET_LEVEL..=MAXIMUM_OFFSET_LEVEL).contains(&level)
    {
        anyhow::bail!(
            "{} ({}) must be between {} and {}",
            field,
            level,
            MINIMUM_OFFSET_LEVEL,
            MAXIMUM_OFFSET_LEVEL
        );
    }
    Ok(())
}

fn validate_name(field: &str, value: &Option<String>, table: &TranslationTable) -> Result<()> {
    if let Some(name) = value
        && table.to_hardware(name).is_none()
    {
        let known: Vec<&str> = table.names().collect();
        anyhow::bail!(
            "{} '{}' is not a known {} (expected one of: {})",
            field,
            name,
            table.dimension,
            known.join(", ")
        );
    }
    Ok(())
}
