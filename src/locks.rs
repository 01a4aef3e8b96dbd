//! Lock reconciliation.
//!
//! The device is authoritative for the exposure, focus and white-balance
//! locks. Each lock is read first and only written when the device disagrees
//! with the requested state, so repeating a call is free of writes.

use crate::device::{ConfigRecord, DeviceChannel, Endpoint};
use crate::dimension::Dimension;
use crate::error::{ControlError, Status};

/// Requested lock states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LockTargets {
    pub exposure: bool,
    pub white_balance: bool,
    pub focus: bool,
}

impl LockTargets {
    /// Reconciliation order with each lock's endpoint and target.
    fn sequence(self) -> [(Dimension, Endpoint, bool); 3] {
        [
            (Dimension::ExposureLock, Endpoint::ExposureLock, self.exposure),
            (Dimension::FocusLock, Endpoint::FocusLock, self.focus),
            (
                Dimension::WhiteBalanceLock,
                Endpoint::WhiteBalanceLock,
                self.white_balance,
            ),
        ]
    }
}

/// Result of one reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockReport {
    /// Locks whose device state was read, in reconciliation order.
    pub confirmed: Vec<(Dimension, bool)>,
    /// Lock writes issued.
    pub writes: usize,
    pub result: Status,
}

/// Bring the device's locks in line with `targets`.
///
/// A failed read stops the call before the remaining locks are touched. A
/// failed write is logged and reported once every lock has been processed.
pub fn reconcile<D: DeviceChannel + ?Sized>(channel: &D, targets: LockTargets) -> LockReport {
    let mut report = LockReport {
        confirmed: Vec::new(),
        writes: 0,
        result: Ok(()),
    };

    if !channel.is_ready() {
        report.result = Err(ControlError::DeviceNotReady);
        return report;
    }

    let mut first_failure = None;
    for (dimension, endpoint, target) in targets.sequence() {
        let current = match channel.read_config(endpoint) {
            Ok(record) => record.as_lock(),
            Err(source) => {
                log_error!("Failed to read {endpoint}: {source}");
                report.result = Err(ControlError::LockReadFailed { endpoint, source });
                return report;
            }
        };
        report.confirmed.push((dimension, target));

        if current == Some(target) {
            log_debug!("{dimension} already {}", lock_label(target));
            continue;
        }

        report.writes += 1;
        log_debug!("Setting {dimension} to {}", lock_label(target));
        if let Err(source) = channel.write_config(endpoint, &ConfigRecord::lock(target)) {
            log_error!("Failed to set {dimension}: {source}");
            first_failure.get_or_insert(ControlError::DeviceRejected { endpoint, source });
        }
    }

    if let Some(error) = first_failure {
        report.result = Err(error);
    }
    report
}

fn lock_label(locked: bool) -> &'static str {
    if locked { "locked" } else { "unlocked" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{MockDeviceChannel, SimulatedDevice};
    use crate::error::DeviceError;
    use mockall::predicate::eq;

    #[test]
    fn test_writes_only_mismatched_locks() {
        let device = SimulatedDevice::new();
        device.seed(Endpoint::FocusLock, ConfigRecord::lock(true));

        let targets = LockTargets {
            exposure: true,
            white_balance: false,
            focus: true,
        };
        let report = reconcile(&device, targets);
        assert_eq!(report.result, Ok(()));
        assert_eq!(report.writes, 1);
        assert_eq!(
            device.writes(),
            vec![(Endpoint::ExposureLock, ConfigRecord::lock(true))]
        );

        // Already reconciled: no further writes
        let report = reconcile(&device, targets);
        assert_eq!(report.writes, 0);
        assert_eq!(device.writes().len(), 1);
    }

    #[test]
    fn test_read_failure_short_circuits() {
        let device = SimulatedDevice::new();
        device.fail_reads_of(Endpoint::FocusLock);

        let report = reconcile(
            &device,
            LockTargets {
                exposure: true,
                white_balance: true,
                focus: true,
            },
        );
        assert!(matches!(
            report.result,
            Err(ControlError::LockReadFailed {
                endpoint: Endpoint::FocusLock,
                ..
            })
        ));
        assert_eq!(report.confirmed, vec![(Dimension::ExposureLock, true)]);
        assert_eq!(
            device.reads(),
            vec![Endpoint::ExposureLock, Endpoint::FocusLock]
        );
        assert_eq!(device.current(Endpoint::WhiteBalanceLock), None);
    }

    #[test]
    fn test_write_failure_does_not_stop_remaining_locks() {
        let mut channel = MockDeviceChannel::new();
        channel.expect_is_ready().return_const(true);
        channel
            .expect_read_config()
            .returning(|_| Ok(ConfigRecord::lock(false)));
        channel
            .expect_write_config()
            .with(eq(Endpoint::ExposureLock), eq(ConfigRecord::lock(true)))
            .times(1)
            .returning(|_, _| Err(DeviceError::Rejected(1)));
        channel
            .expect_write_config()
            .with(eq(Endpoint::WhiteBalanceLock), eq(ConfigRecord::lock(true)))
            .times(1)
            .returning(|_, _| Ok(()));

        let report = reconcile(
            &channel,
            LockTargets {
                exposure: true,
                white_balance: true,
                focus: false,
            },
        );
        assert_eq!(
            report.result,
            Err(ControlError::DeviceRejected {
                endpoint: Endpoint::ExposureLock,
                source: DeviceError::Rejected(1),
            })
        );
        assert_eq!(report.confirmed.len(), 3);
    }

    #[test]
    fn test_not_ready() {
        let device = SimulatedDevice::new();
        device.set_ready(false);
        let report = reconcile(&device, LockTargets::default());
        assert_eq!(report.result, Err(ControlError::DeviceNotReady));
        assert!(report.confirmed.is_empty());
    }
}
