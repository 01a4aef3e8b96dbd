//! # camera3a
//!
//! Reconciliation engine for 3A (auto exposure, auto focus, auto white
//! balance) imaging controls.
//!
//! A client hands over a flat set of requested control values. The engine
//! diffs them against the last desired state, marks what changed and, on
//! commit, writes the changes to the device's configuration channel in a
//! fixed priority order, with scene presets taking precedence over individual
//! settings.
//!
//! ## Architecture
//!
//! - **Vocabulary**: `dimension` (control dimensions and the pending set),
//!   `tables` (name ↔ device code translation), `params` (request format)
//! - **State**: `settings` (snapshot and request diffing), `session` (one open
//!   device with its lock-protected state)
//! - **Device writes**: `arbiter` (pass planning), `apply` (per-dimension
//!   appliers), `locks` (lock reconciliation), `area` (metering geometry)
//! - **Collaborators**: `device` (channel and allocator traits plus
//!   in-memory implementations)
//! - **Infrastructure**: `config` (TOML device profiles), `logger`, `args` and
//!   `commands` for the CLI

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod logger;

pub mod apply;
pub mod arbiter;
pub mod area;
pub mod args;
pub mod commands;
pub mod config;
pub mod constants;
pub mod device;
pub mod dimension;
pub mod error;
pub mod locks;
pub mod params;
pub mod session;
pub mod settings;
pub mod tables;

pub use area::{CameraArea, MeteringArea};
pub use config::Profile;
pub use device::{BufferAllocator, DeviceChannel, HeapAllocator, SimulatedDevice};
pub use dimension::{Dimension, PendingSet};
pub use error::{ControlError, Status};
pub use params::Parameters;
pub use session::Session;
pub use settings::{Defaults, Settings};
