//! Error types shared by the reconciliation engine and its collaborators.

use crate::device::Endpoint;
use crate::dimension::Dimension;

/// Failure reported by a [`DeviceChannel`](crate::device::DeviceChannel).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("device refused the request (code {0:#x})")]
    Rejected(u32),
    #[error("endpoint is not supported by this device")]
    Unsupported,
    #[error("device channel is not ready")]
    NotReady,
}

/// Failure reported by a [`BufferAllocator`](crate::device::BufferAllocator).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unable to allocate {size} bytes of shared memory")]
pub struct AllocError {
    pub size: usize,
}

/// Errors surfaced by session operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControlError {
    #[error("device control channel is not ready")]
    DeviceNotReady,

    #[error("default {dimension} value '{value}' has no entry in its translation table")]
    DefaultMissing { dimension: Dimension, value: String },

    #[error("out of memory: {0}")]
    OutOfMemory(#[from] AllocError),

    #[error("device rejected {endpoint} configuration: {source}")]
    DeviceRejected {
        endpoint: Endpoint,
        #[source]
        source: DeviceError,
    },

    #[error("failed to read {endpoint} configuration: {source}")]
    ReadFailed {
        endpoint: Endpoint,
        #[source]
        source: DeviceError,
    },

    #[error("failed to read {endpoint} state, remaining locks skipped: {source}")]
    LockReadFailed {
        endpoint: Endpoint,
        #[source]
        source: DeviceError,
    },

    #[error("{failed} of {attempted} settings failed to apply")]
    PassFailed { failed: usize, attempted: usize },
}

/// Outcome of a single operation.
pub type Status = Result<(), ControlError>;
