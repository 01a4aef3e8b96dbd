//! Command-line command handlers for camera3a.
//!
//! Each command is implemented in its own submodule.

pub mod apply;
pub mod help;
pub mod tables;
