//! Settings snapshot and request diffing.
//!
//! [`Settings`] holds the last desired value of every dimension in device
//! terms: translated codes for enum dimensions, internal (offset-adjusted)
//! levels for scalar dimensions. [`Settings::merge_request`] folds an external
//! request into the snapshot and reports which dimensions changed.

use serde::Serialize;

use crate::area::{CameraArea, parse_areas};
use crate::constants::*;
use crate::dimension::{Dimension, PendingSet};
use crate::error::ControlError;
use crate::params::Parameters;
use crate::tables::{self, TranslationTable, codes};

/// Default value of every dimension, in request vocabulary.
///
/// Scalars are in their external representation (contrast 100 means an
/// internal level of 0).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Defaults {
    pub scene_mode: String,
    pub ev_compensation: i32,
    pub white_balance: String,
    pub antibanding: String,
    pub sharpness: i32,
    pub brightness: i32,
    pub contrast: i32,
    pub iso: String,
    pub saturation: i32,
    pub effect: String,
    pub focus_mode: String,
    pub exposure_mode: String,
    pub flash_mode: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Defaults {
            scene_mode: DEFAULT_SCENE_MODE.to_string(),
            ev_compensation: DEFAULT_EV_COMPENSATION,
            white_balance: DEFAULT_WHITE_BALANCE.to_string(),
            antibanding: DEFAULT_ANTIBANDING.to_string(),
            sharpness: DEFAULT_SHARPNESS,
            brightness: DEFAULT_BRIGHTNESS,
            contrast: DEFAULT_CONTRAST,
            iso: DEFAULT_ISO.to_string(),
            saturation: DEFAULT_SATURATION,
            effect: DEFAULT_EFFECT.to_string(),
            focus_mode: DEFAULT_FOCUS_MODE.to_string(),
            exposure_mode: DEFAULT_EXPOSURE_MODE.to_string(),
            flash_mode: DEFAULT_FLASH_MODE.to_string(),
        }
    }
}

impl Defaults {
    /// Request parameters carrying every default value.
    pub fn to_parameters(&self) -> Parameters {
        let mut params = Parameters::new();
        params.set(KEY_SCENE_MODE, self.scene_mode.as_str());
        params.set_int(KEY_EV_COMPENSATION, self.ev_compensation);
        params.set(KEY_WHITE_BALANCE, self.white_balance.as_str());
        params.set(KEY_ANTIBANDING, self.antibanding.as_str());
        params.set_int(KEY_SHARPNESS, self.sharpness);
        params.set_int(KEY_BRIGHTNESS, self.brightness);
        params.set_int(KEY_CONTRAST, self.contrast);
        params.set(KEY_ISO, self.iso.as_str());
        params.set_int(KEY_SATURATION, self.saturation);
        params.set(KEY_EFFECT, self.effect.as_str());
        params.set(KEY_FOCUS_MODE, self.focus_mode.as_str());
        params.set(KEY_EXPOSURE_MODE, self.exposure_mode.as_str());
        params.set(KEY_FLASH_MODE, self.flash_mode.as_str());
        params.set(KEY_AUTO_EXPOSURE_LOCK, FALSE);
        params.set(KEY_AUTO_WHITEBALANCE_LOCK, FALSE);
        params
    }
}

fn resolve(table: &TranslationTable, name: &str) -> Result<u32, ControlError> {
    table
        .to_hardware(name)
        .ok_or_else(|| ControlError::DefaultMissing {
            dimension: table.dimension,
            value: name.to_string(),
        })
}

/// Last desired value of every dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub scene_mode: u32,
    pub ev_compensation: i32,
    pub white_balance: u32,
    pub flicker: u32,
    pub sharpness: i32,
    pub brightness: i32,
    pub contrast: i32,
    pub iso: u32,
    pub saturation: i32,
    pub effect: u32,
    pub focus: u32,
    pub exposure: u32,
    pub flash_mode: u32,
    pub exposure_lock: bool,
    pub white_balance_lock: bool,
    pub focus_lock: bool,
    /// Requested areas in request coordinates; mapped onto the preview when
    /// they are written.
    pub metering_areas: Vec<CameraArea>,
}

impl Settings {
    /// Snapshot holding `defaults`, translated into device terms.
    ///
    /// A default name missing from its table is a configuration defect.
    pub fn from_defaults(defaults: &Defaults) -> Result<Self, ControlError> {
        Ok(Settings {
            scene_mode: resolve(&tables::SCENE, &defaults.scene_mode)?,
            ev_compensation: defaults.ev_compensation,
            white_balance: resolve(&tables::WHITE_BALANCE, &defaults.white_balance)?,
            flicker: resolve(&tables::FLICKER, &defaults.antibanding)?,
            sharpness: defaults.sharpness - SHARPNESS_OFFSET,
            brightness: defaults.brightness - BRIGHTNESS_OFFSET,
            contrast: defaults.contrast - CONTRAST_OFFSET,
            iso: resolve(&tables::ISO, &defaults.iso)?,
            saturation: defaults.saturation - SATURATION_OFFSET,
            effect: resolve(&tables::EFFECT, &defaults.effect)?,
            focus: resolve(&tables::FOCUS, &defaults.focus_mode)?,
            exposure: resolve(&tables::EXPOSURE, &defaults.exposure_mode)?,
            flash_mode: resolve(&tables::FLASH, &defaults.flash_mode)?,
            exposure_lock: false,
            white_balance_lock: false,
            focus_lock: false,
            metering_areas: Vec::new(),
        })
    }

    /// Whether the current scene leaves individual settings in effect.
    pub fn is_manual_scene(&self) -> bool {
        self.scene_mode == codes::scene::MANUAL
    }

    /// Fold `request` into the snapshot and return the dimensions that need
    /// to be written.
    ///
    /// With `forced` set (first pass of a session, or a defaults reset) every
    /// dimension is reported regardless of the request's contents; requested
    /// values that resolve still replace the snapshot's.
    pub fn merge_request(&mut self, request: &Parameters, forced: bool) -> PendingSet {
        let mut changed = PendingSet::empty();
        let mut mark = |dimension: Dimension, dirty: bool| {
            if dirty {
                changed.insert(dimension);
            }
        };

        mark(
            Dimension::Exposure,
            merge_enum(&mut self.exposure, request, KEY_EXPOSURE_MODE, &tables::EXPOSURE, forced),
        );
        mark(
            Dimension::WhiteBalance,
            merge_enum(
                &mut self.white_balance,
                request,
                KEY_WHITE_BALANCE,
                &tables::WHITE_BALANCE,
                forced,
            ),
        );
        mark(
            Dimension::Contrast,
            merge_scalar(&mut self.contrast, request, KEY_CONTRAST, CONTRAST_OFFSET, forced),
        );
        mark(
            Dimension::Sharpness,
            merge_scalar(&mut self.sharpness, request, KEY_SHARPNESS, SHARPNESS_OFFSET, forced),
        );
        mark(
            Dimension::Saturation,
            merge_scalar(&mut self.saturation, request, KEY_SATURATION, SATURATION_OFFSET, forced),
        );
        mark(
            Dimension::Brightness,
            merge_scalar(&mut self.brightness, request, KEY_BRIGHTNESS, BRIGHTNESS_OFFSET, forced),
        );
        mark(
            Dimension::Flicker,
            merge_enum(&mut self.flicker, request, KEY_ANTIBANDING, &tables::FLICKER, forced),
        );
        mark(
            Dimension::Iso,
            merge_enum(&mut self.iso, request, KEY_ISO, &tables::ISO, forced),
        );
        mark(Dimension::Focus, self.merge_focus(request, forced));
        mark(Dimension::EvCompensation, self.merge_ev(request, forced));
        mark(Dimension::SceneMode, self.merge_scene(request, forced));
        mark(
            Dimension::FlashMode,
            merge_enum(&mut self.flash_mode, request, KEY_FLASH_MODE, &tables::FLASH, forced),
        );
        mark(
            Dimension::Effect,
            merge_enum(&mut self.effect, request, KEY_EFFECT, &tables::EFFECT, forced),
        );
        mark(
            Dimension::ExposureLock,
            merge_lock(
                &mut self.exposure_lock,
                request,
                KEY_AUTO_EXPOSURE_LOCK_SUPPORTED,
                KEY_AUTO_EXPOSURE_LOCK,
                forced,
            ),
        );
        mark(
            Dimension::WhiteBalanceLock,
            merge_lock(
                &mut self.white_balance_lock,
                request,
                KEY_AUTO_WHITEBALANCE_LOCK_SUPPORTED,
                KEY_AUTO_WHITEBALANCE_LOCK,
                forced,
            ),
        );
        // Focus lock has no request field; only the forced pass pushes it
        mark(Dimension::FocusLock, forced);
        mark(
            Dimension::MeteringAreas,
            self.merge_metering_areas(request) || forced,
        );

        changed
    }

    /// Only continuous and infinity focus are written right away; any other
    /// mode waits for an explicit autofocus trigger.
    fn merge_focus(&mut self, request: &Parameters, forced: bool) -> bool {
        match lookup(request, KEY_FOCUS_MODE, &tables::FOCUS) {
            Some(code) if forced || code != self.focus => {
                self.focus = code;
                forced || code == codes::focus::AUTO || code == codes::focus::AUTO_INFINITY
            }
            _ => forced,
        }
    }

    fn merge_ev(&mut self, request: &Parameters, forced: bool) -> bool {
        match request.get_int(KEY_EV_COMPENSATION) {
            Some(ev) if forced || ev != self.ev_compensation => {
                self.ev_compensation = ev;
                true
            }
            _ => forced,
        }
    }

    /// An unknown scene name drops back to the manual scene without
    /// scheduling a write.
    fn merge_scene(&mut self, request: &Parameters, forced: bool) -> bool {
        let Some(name) = request.get(KEY_SCENE_MODE) else {
            return forced;
        };

        match tables::SCENE.to_hardware(name) {
            Some(code) if forced || code != self.scene_mode => {
                self.scene_mode = code;
                true
            }
            Some(_) => forced,
            None => {
                log_warning!("Unknown scene mode '{name}', falling back to manual");
                self.scene_mode = codes::scene::MANUAL;
                forced
            }
        }
    }

    /// Replace the area list when the request carries a different one that
    /// fits the device's advertised maximum. Oversubscribed or malformed lists
    /// are dropped and the previous list is kept.
    fn merge_metering_areas(&mut self, request: &Parameters) -> bool {
        let Some(text) = request.get(KEY_METERING_AREAS) else {
            return false;
        };

        let areas = match parse_areas(text) {
            Ok(areas) => areas,
            Err(e) => {
                log_warning!("Ignoring malformed metering areas: {e}");
                return false;
            }
        };

        let max_areas = request
            .get_int(KEY_MAX_NUM_METERING_AREAS)
            .unwrap_or(0)
            .max(0) as usize;
        if areas.len() > max_areas {
            log_warning!(
                "Metering areas supported {max_areas}, metering areas set {}",
                areas.len()
            );
            return false;
        }

        if areas == self.metering_areas {
            return false;
        }

        self.metering_areas = areas;
        true
    }

    /// Human-readable value of `dimension`, using table names where one exists.
    pub fn describe(&self, dimension: Dimension) -> String {
        let symbol = |table: &TranslationTable, code: u32| {
            table
                .to_symbol(code)
                .map(str::to_string)
                .unwrap_or_else(|| format!("{code:#x}"))
        };

        match dimension {
            Dimension::SceneMode => symbol(&tables::SCENE, self.scene_mode),
            Dimension::EvCompensation => self.ev_compensation.to_string(),
            Dimension::WhiteBalance => symbol(&tables::WHITE_BALANCE, self.white_balance),
            Dimension::Flicker => symbol(&tables::FLICKER, self.flicker),
            Dimension::Sharpness => (self.sharpness + SHARPNESS_OFFSET).to_string(),
            Dimension::Brightness => (self.brightness + BRIGHTNESS_OFFSET).to_string(),
            Dimension::Contrast => (self.contrast + CONTRAST_OFFSET).to_string(),
            Dimension::Iso => symbol(&tables::ISO, self.iso),
            Dimension::Saturation => (self.saturation + SATURATION_OFFSET).to_string(),
            Dimension::Effect => symbol(&tables::EFFECT, self.effect),
            Dimension::Focus => symbol(&tables::FOCUS, self.focus),
            Dimension::Exposure => symbol(&tables::EXPOSURE, self.exposure),
            Dimension::FlashMode => symbol(&tables::FLASH, self.flash_mode),
            Dimension::ExposureLock => self.exposure_lock.to_string(),
            Dimension::WhiteBalanceLock => self.white_balance_lock.to_string(),
            Dimension::FocusLock => self.focus_lock.to_string(),
            Dimension::MeteringAreas => format!("{} area(s)", self.metering_areas.len()),
        }
    }
}

fn lookup(request: &Parameters, key: &str, table: &TranslationTable) -> Option<u32> {
    let name = request.get(key)?;
    let code = table.to_hardware(name);
    if code.is_none() {
        log_warning!("Unknown {} '{name}', keeping the current value", table.dimension);
    }
    code
}

fn merge_enum(
    current: &mut u32,
    request: &Parameters,
    key: &str,
    table: &TranslationTable,
    forced: bool,
) -> bool {
    match lookup(request, key, table) {
        Some(code) if forced || code != *current => {
            *current = code;
            true
        }
        _ => forced,
    }
}

/// Negative external values mean the field was not supplied.
fn merge_scalar(
    current: &mut i32,
    request: &Parameters,
    key: &str,
    offset: i32,
    forced: bool,
) -> bool {
    match request.get_int(key).filter(|value| *value >= 0) {
        Some(external) if forced || *current + offset != external => {
            *current = external - offset;
            true
        }
        _ => forced,
    }
}

/// Unsupported locks are never marked, not even by the forced pass.
fn merge_lock(
    current: &mut bool,
    request: &Parameters,
    supported_key: &str,
    key: &str,
    forced: bool,
) -> bool {
    if request.get(supported_key) != Some(TRUE) {
        return false;
    }

    let lock = request.get(key) == Some(TRUE);
    if forced || lock != *current {
        *current = lock;
        return true;
    }
    false
}
