//! Constants shared across the crate: request keys, value offsets, defaults
//! and the metering record geometry.

// # Request keys

pub const KEY_SCENE_MODE: &str = "scene-mode";
pub const KEY_EV_COMPENSATION: &str = "exposure-compensation";
pub const KEY_WHITE_BALANCE: &str = "whitebalance";
pub const KEY_ANTIBANDING: &str = "antibanding";
pub const KEY_SHARPNESS: &str = "sharpness";
pub const KEY_BRIGHTNESS: &str = "brightness";
pub const KEY_CONTRAST: &str = "contrast";
pub const KEY_ISO: &str = "iso";
pub const KEY_SATURATION: &str = "saturation";
pub const KEY_EFFECT: &str = "effect";
pub const KEY_FOCUS_MODE: &str = "focus-mode";
pub const KEY_EXPOSURE_MODE: &str = "exposure";
pub const KEY_FLASH_MODE: &str = "flash-mode";
pub const KEY_AUTO_EXPOSURE_LOCK: &str = "auto-exposure-lock";
pub const KEY_AUTO_EXPOSURE_LOCK_SUPPORTED: &str = "auto-exposure-lock-supported";
pub const KEY_AUTO_WHITEBALANCE_LOCK: &str = "auto-whitebalance-lock";
pub const KEY_AUTO_WHITEBALANCE_LOCK_SUPPORTED: &str = "auto-whitebalance-lock-supported";
pub const KEY_METERING_AREAS: &str = "metering-areas";
pub const KEY_MAX_NUM_METERING_AREAS: &str = "max-num-metering-areas";

pub const TRUE: &str = "true";
pub const FALSE: &str = "false";

// # Scalar offsets (external value = internal value + offset)

pub const CONTRAST_OFFSET: i32 = 100;
pub const SHARPNESS_OFFSET: i32 = 100;
pub const SATURATION_OFFSET: i32 = 100;
pub const BRIGHTNESS_OFFSET: i32 = 0;

// # Scalar ranges (external representation)

pub const MINIMUM_OFFSET_LEVEL: i32 = 0;
pub const MAXIMUM_OFFSET_LEVEL: i32 = 200;
pub const MINIMUM_BRIGHTNESS: i32 = 0;
pub const MAXIMUM_BRIGHTNESS: i32 = 100;
pub const MINIMUM_EV_COMPENSATION: i32 = -30;
pub const MAXIMUM_EV_COMPENSATION: i32 = 30;

// # Defaults pushed on the forced first pass

pub const DEFAULT_SCENE_MODE: &str = "auto";
pub const DEFAULT_EV_COMPENSATION: i32 = 0;
pub const DEFAULT_WHITE_BALANCE: &str = "auto";
pub const DEFAULT_ANTIBANDING: &str = "auto";
pub const DEFAULT_SHARPNESS: i32 = 100;
pub const DEFAULT_BRIGHTNESS: i32 = 50;
pub const DEFAULT_CONTRAST: i32 = 100;
pub const DEFAULT_ISO: &str = "auto";
pub const DEFAULT_SATURATION: i32 = 100;
pub const DEFAULT_EFFECT: &str = "none";
pub const DEFAULT_FOCUS_MODE: &str = "infinity";
pub const DEFAULT_EXPOSURE_MODE: &str = "auto";
pub const DEFAULT_FLASH_MODE: &str = "off";

// # Device profile defaults

pub const DEFAULT_PREVIEW_WIDTH: u32 = 640;
pub const DEFAULT_PREVIEW_HEIGHT: u32 = 480;
pub const DEFAULT_MAX_METERING_AREAS: u32 = 1;

// # Metering geometry

/// Upper bound of the device's normalized metering coordinate range.
pub const METERING_AREAS_RANGE: u32 = 0xFF;

/// Half-extent of the request's area coordinate system (-1000..=1000).
pub const AREA_COORDINATE_HALF_RANGE: i32 = 1000;

/// Maximum number of areas the packed algorithm-area record can hold.
pub const MAX_ALGO_AREAS: usize = 35;

/// Shared buffers are allocated in multiples of this size.
pub const SHARED_BUFFER_PAGE_SIZE: usize = 4096;

/// Fractional bits of the device's EV compensation fixed-point format.
pub const Q16_OFFSET: u32 = 16;
