use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use camera3a::config::Profile;
use camera3a::constants::*;
use camera3a::device::{ConfigRecord, DeviceChannel, Endpoint, HeapAllocator, SimulatedDevice};
use camera3a::error::DeviceError;
use camera3a::logger::Log;
use camera3a::{Dimension, Parameters, Session};

const TIMEOUT: Duration = Duration::from_secs(5);

struct Gate {
    endpoint: Endpoint,
    entered: Sender<()>,
    release: Receiver<()>,
}

/// Simulated device whose next write to an armed endpoint blocks until the
/// test releases it.
struct GatedDevice {
    inner: SimulatedDevice,
    gate: Mutex<Option<Gate>>,
}

impl GatedDevice {
    fn new() -> Self {
        Self {
            inner: SimulatedDevice::new(),
            gate: Mutex::new(None),
        }
    }

    /// Returns the "write entered" receiver and the release sender.
    fn arm(&self, endpoint: Endpoint) -> (Receiver<()>, Sender<()>) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        *self.gate.lock().unwrap() = Some(Gate {
            endpoint,
            entered: entered_tx,
            release: release_rx,
        });
        (entered_rx, release_tx)
    }
}

impl DeviceChannel for GatedDevice {
    fn is_ready(&self) -> bool {
        self.inner.is_ready()
    }

    fn read_config(&self, endpoint: Endpoint) -> Result<ConfigRecord, DeviceError> {
        self.inner.read_config(endpoint)
    }

    fn write_config(&self, endpoint: Endpoint, record: &ConfigRecord) -> Result<(), DeviceError> {
        let gate = {
            let mut gate = self.gate.lock().unwrap();
            if gate.as_ref().is_some_and(|g| g.endpoint == endpoint) {
                gate.take()
            } else {
                None
            }
        };
        if let Some(gate) = gate {
            let _ = gate.entered.send(());
            let _ = gate.release.recv_timeout(TIMEOUT);
        }
        self.inner.write_config(endpoint, record)
    }
}

fn request(pairs: &[(&str, &str)]) -> Parameters {
    pairs.iter().copied().collect()
}

#[test]
fn test_requests_proceed_while_commit_blocks_on_device() {
    Log::set_enabled(false);
    let session =
        Session::open(GatedDevice::new(), HeapAllocator::new(), &Profile::default()).unwrap();
    session.commit_pending().unwrap();

    let (entered, release) = session.channel().arm(Endpoint::Brightness);
    session
        .apply_request(&request(&[(KEY_BRIGHTNESS, "70")]))
        .unwrap();

    let session = &session;
    let observed = thread::scope(|scope| {
        let commit = scope.spawn(|| session.commit_pending());
        entered
            .recv_timeout(TIMEOUT)
            .expect("commit never reached the brightness write");

        let (tx, rx) = mpsc::channel();
        scope.spawn(move || {
            session
                .apply_request(&request(&[(KEY_CONTRAST, "150")]))
                .unwrap();
            let _ = tx.send(session.pending());
        });
        let observed = rx.recv_timeout(TIMEOUT);

        release.send(()).unwrap();
        assert_eq!(commit.join().unwrap(), Ok(()));
        observed
    });

    let pending = observed.expect("request blocked behind the device write");
    assert!(pending.contains(Dimension::Contrast));
    assert!(!pending.contains(Dimension::Brightness));

    assert_eq!(
        session.channel().inner.current(Endpoint::Brightness),
        Some(ConfigRecord::brightness(70))
    );
    assert!(session.pending().contains(Dimension::Contrast));
}

#[test]
fn test_gate_only_blocks_armed_endpoint() {
    Log::set_enabled(false);
    let session =
        Session::open(GatedDevice::new(), HeapAllocator::new(), &Profile::default()).unwrap();
    session.commit_pending().unwrap();

    let (entered, _release) = session.channel().arm(Endpoint::Brightness);
    session
        .apply_request(&request(&[(KEY_CONTRAST, "150")]))
        .unwrap();
    session.commit_pending().unwrap();

    assert!(entered.try_recv().is_err());
    assert_eq!(
        session.channel().inner.current(Endpoint::Contrast),
        Some(ConfigRecord::contrast(50))
    );
}
