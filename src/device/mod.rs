//! Device control channel abstraction.
//!
//! The engine never talks to hardware directly. It builds [`ConfigRecord`]s,
//! one shape per control, and hands them to a [`DeviceChannel`] together with
//! the [`Endpoint`] they target. Metering areas travel in a page-aligned
//! [`SharedBuffer`] obtained from a [`BufferAllocator`].
//!
//! ## Implementations
//!
//! - **`SimulatedDevice`**: in-memory device that records every write, used by
//!   the CLI and the test suites
//! - **`HeapAllocator`**: heap-backed shared buffers with allocation tracking
//!
//! Real devices implement the two traits in their own crates.

use serde::Serialize;
use std::fmt;

use crate::area::NormalizedArea;
use crate::error::{AllocError, DeviceError};

pub mod simulated;

pub use simulated::{HeapAllocator, SimulatedDevice};

/// Configuration endpoint addressed by a read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Endpoint {
    SceneMode,
    ExposureControl,
    ExposureValue,
    WhiteBalance,
    FlickerCancel,
    Brightness,
    Contrast,
    Sharpening,
    Saturation,
    ImageFilter,
    FocusControl,
    FocusAssist,
    FlashControl,
    ExposureLock,
    WhiteBalanceLock,
    FocusLock,
    AlgoPriority,
    FocusRegion,
    AlgoAreas,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Endpoint::SceneMode => "scene mode",
            Endpoint::ExposureControl => "exposure control",
            Endpoint::ExposureValue => "exposure value",
            Endpoint::WhiteBalance => "white balance",
            Endpoint::FlickerCancel => "flicker cancel",
            Endpoint::Brightness => "brightness",
            Endpoint::Contrast => "contrast",
            Endpoint::Sharpening => "sharpening",
            Endpoint::Saturation => "saturation",
            Endpoint::ImageFilter => "image filter",
            Endpoint::FocusControl => "focus control",
            Endpoint::FocusAssist => "focus assist",
            Endpoint::FlashControl => "flash control",
            Endpoint::ExposureLock => "exposure lock",
            Endpoint::WhiteBalanceLock => "white balance lock",
            Endpoint::FocusLock => "focus lock",
            Endpoint::AlgoPriority => "algorithm priority",
            Endpoint::FocusRegion => "focus region",
            Endpoint::AlgoAreas => "algorithm areas",
        };
        f.write_str(name)
    }
}

/// Port scope of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Port {
    /// Every port of the component.
    All,
    /// The preview output port.
    Preview,
}

impl Port {
    /// Raw port index as carried in packed records.
    pub fn index(self) -> u32 {
        match self {
            Port::All => 0xFFFF_FFFF,
            Port::Preview => 1,
        }
    }
}

/// Algorithm whose priority modifier is being changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    Focus,
    Exposure,
    WhiteBalance,
}

/// Priority modifier for an algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Face,
    Region,
}

/// Exposure-value record, shared by EV compensation and ISO.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExposureValue {
    /// EV compensation in Q16 fixed point.
    pub ev_compensation: i32,
    pub sensitivity: u32,
    pub auto_sensitivity: bool,
}

/// Page-aligned memory shared with the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharedBuffer {
    pub id: u64,
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl SharedBuffer {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A fully populated configuration record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "record", rename_all = "kebab-case")]
pub enum ConfigRecord {
    SceneMode { port: Port, scene: u32 },
    ExposureControl { port: Port, mode: u32 },
    ExposureValue { port: Port, value: ExposureValue },
    WhiteBalance { port: Port, mode: u32 },
    FlickerCancel { port: Port, mode: u32 },
    Brightness { port: Port, level: i32 },
    Contrast { port: Port, level: i32 },
    Sharpening { port: Port, level: i32, auto: bool },
    Saturation { port: Port, level: i32 },
    ImageFilter { port: Port, filter: u32 },
    FocusControl { port: Port, mode: u32 },
    FocusAssist { port: Port, enabled: bool },
    FlashControl { port: Port, mode: u32 },
    Lock { port: Port, locked: bool },
    AlgoPriority {
        priority: Priority,
        algorithm: Algorithm,
        enabled: bool,
    },
    FocusRegion { port: Port, region: NormalizedArea },
    SharedBuffer { port: Port, size: usize, buffer: SharedBuffer },
}

impl ConfigRecord {
    pub fn scene_mode(scene: u32) -> Self {
        ConfigRecord::SceneMode {
            port: Port::All,
            scene,
        }
    }

    pub fn exposure_control(mode: u32) -> Self {
        ConfigRecord::ExposureControl {
            port: Port::All,
            mode,
        }
    }

    pub fn exposure_value(value: ExposureValue) -> Self {
        ConfigRecord::ExposureValue {
            port: Port::Preview,
            value,
        }
    }

    pub fn white_balance(mode: u32) -> Self {
        ConfigRecord::WhiteBalance {
            port: Port::Preview,
            mode,
        }
    }

    pub fn flicker_cancel(mode: u32) -> Self {
        ConfigRecord::FlickerCancel {
            port: Port::Preview,
            mode,
        }
    }

    pub fn brightness(level: i32) -> Self {
        ConfigRecord::Brightness {
            port: Port::Preview,
            level,
        }
    }

    pub fn contrast(level: i32) -> Self {
        ConfigRecord::Contrast {
            port: Port::Preview,
            level,
        }
    }

    /// Level 0 hands sharpening to the device's automatic control.
    pub fn sharpening(level: i32) -> Self {
        ConfigRecord::Sharpening {
            port: Port::Preview,
            level,
            auto: level == 0,
        }
    }

    pub fn saturation(level: i32) -> Self {
        ConfigRecord::Saturation {
            port: Port::Preview,
            level,
        }
    }

    pub fn image_filter(filter: u32) -> Self {
        ConfigRecord::ImageFilter {
            port: Port::Preview,
            filter,
        }
    }

    pub fn focus_control(mode: u32) -> Self {
        ConfigRecord::FocusControl {
            port: Port::Preview,
            mode,
        }
    }

    pub fn focus_assist(enabled: bool) -> Self {
        ConfigRecord::FocusAssist {
            port: Port::All,
            enabled,
        }
    }

    pub fn flash_control(mode: u32) -> Self {
        ConfigRecord::FlashControl {
            port: Port::All,
            mode,
        }
    }

    pub fn lock(locked: bool) -> Self {
        ConfigRecord::Lock {
            port: Port::Preview,
            locked,
        }
    }

    pub fn algo_priority(priority: Priority, algorithm: Algorithm, enabled: bool) -> Self {
        ConfigRecord::AlgoPriority {
            priority,
            algorithm,
            enabled,
        }
    }

    pub fn focus_region(region: NormalizedArea) -> Self {
        ConfigRecord::FocusRegion {
            port: Port::Preview,
            region,
        }
    }

    pub fn shared_buffer(buffer: SharedBuffer) -> Self {
        ConfigRecord::SharedBuffer {
            port: Port::All,
            size: buffer.len(),
            buffer,
        }
    }

    /// Lock state carried by a lock record.
    pub fn as_lock(&self) -> Option<bool> {
        match self {
            ConfigRecord::Lock { locked, .. } => Some(*locked),
            _ => None,
        }
    }

    /// Exposure value carried by an exposure-value record.
    pub fn as_exposure_value(&self) -> Option<ExposureValue> {
        match self {
            ConfigRecord::ExposureValue { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// Give back the shared buffer of a shared-buffer record.
    pub fn into_shared_buffer(self) -> Option<SharedBuffer> {
        match self {
            ConfigRecord::SharedBuffer { buffer, .. } => Some(buffer),
            _ => None,
        }
    }
}

/// The device's configuration channel.
///
/// Calls are synchronous and may block for as long as the device takes; the
/// session never holds its state lock across them.
#[cfg_attr(test, mockall::automock)]
pub trait DeviceChannel {
    /// Whether the channel is in an operable state.
    fn is_ready(&self) -> bool;

    /// Read the current record of `endpoint`.
    fn read_config(&self, endpoint: Endpoint) -> Result<ConfigRecord, DeviceError>;

    /// Write `record` to `endpoint`.
    fn write_config(&self, endpoint: Endpoint, record: &ConfigRecord) -> Result<(), DeviceError>;
}

/// Allocator for memory shared with the device.
#[cfg_attr(test, mockall::automock)]
pub trait BufferAllocator {
    /// Allocate a zeroed buffer of exactly `size` bytes.
    fn allocate(&self, size: usize) -> Result<SharedBuffer, AllocError>;

    /// Release a buffer obtained from [`BufferAllocator::allocate`].
    fn free(&self, buffer: SharedBuffer);
}
