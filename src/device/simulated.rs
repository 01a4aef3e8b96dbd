//! In-memory device channel and heap-backed shared buffer allocator.
//!
//! `SimulatedDevice` keeps the last accepted record per endpoint and a log of
//! every write attempt, so callers can see exactly what a pass sent. Failure
//! injection (not ready, rejected writes, failing reads) makes the error paths
//! reachable without hardware.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use super::{BufferAllocator, ConfigRecord, DeviceChannel, Endpoint, ExposureValue, SharedBuffer};
use crate::error::{AllocError, DeviceError};

const ERROR_BAD_PARAMETER: u32 = 0x8000_1005;
const ERROR_HARDWARE: u32 = 0x8000_1009;

#[derive(Debug, Default)]
struct DeviceState {
    records: HashMap<Endpoint, ConfigRecord>,
    writes: Vec<(Endpoint, ConfigRecord)>,
    reads: Vec<Endpoint>,
    rejected_writes: HashSet<Endpoint>,
    failing_reads: HashSet<Endpoint>,
}

/// Device channel that lives entirely in memory.
#[derive(Debug)]
pub struct SimulatedDevice {
    ready: AtomicBool,
    state: Mutex<DeviceState>,
}

impl Default for SimulatedDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedDevice {
    /// A ready device with every control at its power-on value.
    pub fn new() -> Self {
        Self {
            ready: AtomicBool::new(true),
            state: Mutex::new(DeviceState::default()),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, DeviceState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Refuse every later write to `endpoint`.
    pub fn reject_writes_to(&self, endpoint: Endpoint) {
        self.state().rejected_writes.insert(endpoint);
    }

    /// Fail every later read of `endpoint`.
    pub fn fail_reads_of(&self, endpoint: Endpoint) {
        self.state().failing_reads.insert(endpoint);
    }

    /// Preload the record returned by reads of `endpoint`.
    pub fn seed(&self, endpoint: Endpoint, record: ConfigRecord) {
        self.state().records.insert(endpoint, record);
    }

    /// Last accepted record of `endpoint`.
    pub fn current(&self, endpoint: Endpoint) -> Option<ConfigRecord> {
        self.state().records.get(&endpoint).cloned()
    }

    /// Every write attempt so far, in order, including rejected ones.
    pub fn writes(&self) -> Vec<(Endpoint, ConfigRecord)> {
        self.state().writes.clone()
    }

    /// Return and forget the write log.
    pub fn take_writes(&self) -> Vec<(Endpoint, ConfigRecord)> {
        std::mem::take(&mut self.state().writes)
    }

    /// Endpoints read so far, in order.
    pub fn reads(&self) -> Vec<Endpoint> {
        self.state().reads.clone()
    }

    fn power_on_record(endpoint: Endpoint) -> Option<ConfigRecord> {
        match endpoint {
            Endpoint::ExposureLock | Endpoint::WhiteBalanceLock | Endpoint::FocusLock => {
                Some(ConfigRecord::lock(false))
            }
            Endpoint::ExposureValue => Some(ConfigRecord::exposure_value(ExposureValue {
                auto_sensitivity: true,
                ..ExposureValue::default()
            })),
            _ => None,
        }
    }
}

impl DeviceChannel for SimulatedDevice {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn read_config(&self, endpoint: Endpoint) -> Result<ConfigRecord, DeviceError> {
        if !self.is_ready() {
            return Err(DeviceError::NotReady);
        }

        let mut state = self.state();
        state.reads.push(endpoint);
        if state.failing_reads.contains(&endpoint) {
            return Err(DeviceError::Rejected(ERROR_HARDWARE));
        }

        state
            .records
            .get(&endpoint)
            .cloned()
            .or_else(|| Self::power_on_record(endpoint))
            .ok_or(DeviceError::Unsupported)
    }

    fn write_config(&self, endpoint: Endpoint, record: &ConfigRecord) -> Result<(), DeviceError> {
        if !self.is_ready() {
            return Err(DeviceError::NotReady);
        }

        let mut state = self.state();
        state.writes.push((endpoint, record.clone()));
        if state.rejected_writes.contains(&endpoint) {
            return Err(DeviceError::Rejected(ERROR_BAD_PARAMETER));
        }

        state.records.insert(endpoint, record.clone());
        Ok(())
    }
}

/// Shared buffers carved from the heap.
#[derive(Debug, Default)]
pub struct HeapAllocator {
    next_id: AtomicU64,
    outstanding: AtomicUsize,
    fail: AtomicBool,
}

impl HeapAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later allocation fail.
    pub fn set_exhausted(&self, exhausted: bool) {
        self.fail.store(exhausted, Ordering::SeqCst);
    }

    /// Buffers allocated and not yet freed.
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }
}

impl BufferAllocator for HeapAllocator {
    fn allocate(&self, size: usize) -> Result<SharedBuffer, AllocError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AllocError { size });
        }

        self.outstanding.fetch_add(1, Ordering::SeqCst);
        Ok(SharedBuffer {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            data: vec![0; size],
        })
    }

    fn free(&self, buffer: SharedBuffer) {
        drop(buffer);
        self.outstanding.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_log_includes_rejected_writes() {
        let device = SimulatedDevice::new();
        device.reject_writes_to(Endpoint::Contrast);

        assert!(device.write_config(Endpoint::Brightness, &ConfigRecord::brightness(7)).is_ok());
        assert_eq!(
            device.write_config(Endpoint::Contrast, &ConfigRecord::contrast(0)),
            Err(DeviceError::Rejected(ERROR_BAD_PARAMETER))
        );

        assert_eq!(device.writes().len(), 2);
        assert_eq!(
            device.current(Endpoint::Brightness),
            Some(ConfigRecord::brightness(7))
        );
        assert_eq!(device.current(Endpoint::Contrast), None);
    }

    #[test]
    fn test_locks_power_on_unlocked() {
        let device = SimulatedDevice::new();
        let record = device.read_config(Endpoint::FocusLock).unwrap();
        assert_eq!(record.as_lock(), Some(false));
        assert_eq!(
            device.read_config(Endpoint::SceneMode),
            Err(DeviceError::Unsupported)
        );
    }

    #[test]
    fn test_not_ready_refuses_everything() {
        let device = SimulatedDevice::new();
        device.set_ready(false);
        assert_eq!(
            device.write_config(Endpoint::Brightness, &ConfigRecord::brightness(1)),
            Err(DeviceError::NotReady)
        );
        assert!(device.writes().is_empty());
    }

    #[test]
    fn test_allocator_tracks_outstanding_buffers() {
        let allocator = HeapAllocator::new();
        let buffer = allocator.allocate(4096).unwrap();
        assert_eq!(buffer.len(), 4096);
        assert_eq!(allocator.outstanding(), 1);
        allocator.free(buffer);
        assert_eq!(allocator.outstanding(), 0);

        allocator.set_exhausted(true);
        assert_eq!(allocator.allocate(10), Err(AllocError { size: 10 }));
    }
}
