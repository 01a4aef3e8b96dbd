//! Reconciliation session.
//!
//! A [`Session`] owns everything one open device needs: the settings
//! snapshot, the pending set, the visible parameters and the runtime focus
//! flags, all behind a single mutex. Device I/O always happens after that
//! mutex has been released; a commit pass plans under the lock and writes
//! from a copy of the snapshot.

use std::sync::{Mutex, MutexGuard};

use crate::apply::{Applier, FocusState};
use crate::arbiter::PassPlan;
use crate::area::CameraArea;
use crate::config::Profile;
use crate::constants::*;
use crate::device::{BufferAllocator, DeviceChannel};
use crate::dimension::{Dimension, PendingSet};
use crate::error::{ControlError, Status};
use crate::locks::{self, LockTargets};
use crate::params::Parameters;
use crate::settings::{Defaults, Settings};

#[derive(Debug)]
struct SessionState {
    settings: Settings,
    pending: PendingSet,
    /// Set until the first commit pass has run; every dimension is forced.
    first_time_init: bool,
    parameters: Parameters,
    focus_areas: Vec<CameraArea>,
    autofocus_active: bool,
    face_detection_running: bool,
    preview: (u32, u32),
}

impl SessionState {
    fn focus_state(&self) -> FocusState {
        let (width, height) = self.preview;
        FocusState {
            autofocus_active: self.autofocus_active,
            face_detection_running: self.face_detection_running,
            touch_region: self
                .focus_areas
                .iter()
                .find(|area| area.is_valid())
                .map(|area| area.to_preview(width, height).normalize(width, height)),
        }
    }

    /// Request overlaid on the visible parameters, with the device's own
    /// capabilities taking precedence.
    fn effective_request(&self, request: &Parameters, capabilities: &Parameters) -> Parameters {
        let mut effective = self.parameters.clone();
        effective.merge(request);
        effective.merge(capabilities);
        effective
    }

    fn mark(&mut self, changed: PendingSet) {
        for dimension in changed.iter() {
            self.pending.insert(dimension);
        }
    }
}

/// One open device.
pub struct Session<D, A> {
    channel: D,
    allocator: A,
    defaults: Defaults,
    capabilities: Parameters,
    state: Mutex<SessionState>,
}

impl<D: DeviceChannel, A: BufferAllocator> Session<D, A> {
    /// Open a session with every dimension at its profile default.
    ///
    /// Nothing is written yet: the first [`Session::commit_pending`] pushes
    /// the whole snapshot.
    pub fn open(channel: D, allocator: A, profile: &Profile) -> Result<Self, ControlError> {
        let defaults = profile.defaults();
        let capabilities = profile.capabilities();
        let preview = profile.preview_size();

        let mut settings = Settings::from_defaults(&defaults)?;
        let mut parameters = defaults.to_parameters();
        parameters.merge(&capabilities);
        let pending = settings.merge_request(&parameters, true);

        log_debug!(
            "Session opened: preview {}x{}, {} dimension(s) pending",
            preview.0,
            preview.1,
            pending.len()
        );

        Ok(Self {
            channel,
            allocator,
            defaults,
            capabilities,
            state: Mutex::new(SessionState {
                settings,
                pending,
                first_time_init: true,
                parameters,
                focus_areas: Vec::new(),
                autofocus_active: false,
                face_detection_running: false,
                preview,
            }),
        })
    }

    /// Tear the session down and hand back its collaborators.
    pub fn close(self) -> (D, A) {
        let state = self
            .state
            .into_inner()
            .unwrap_or_else(|e| e.into_inner());
        if !state.pending.is_empty() {
            log_debug!("Session closed with uncommitted settings: {}", state.pending);
        }
        (self.channel, self.allocator)
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Fold an external request into the snapshot and mark what changed.
    ///
    /// No device I/O happens here; see [`Session::commit_pending`].
    pub fn apply_request(&self, request: &Parameters) -> Status {
        let mut guard = self.lock();
        let state = &mut *guard;

        let effective = state.effective_request(request, &self.capabilities);
        let forced = state.first_time_init;
        let changed = state.settings.merge_request(&effective, forced);

        state.parameters = effective;
        state.mark(changed);

        log_debug!("Request marked: {changed}");
        Ok(())
    }

    /// Reset every dimension to its default and force all of them through
    /// the next commit.
    pub fn apply_defaults(&self) -> Status {
        let mut settings = Settings::from_defaults(&self.defaults)?;

        let mut guard = self.lock();
        let state = &mut *guard;

        let mut parameters = self.defaults.to_parameters();
        parameters.merge(&self.capabilities);
        let changed = settings.merge_request(&parameters, true);

        state.settings = settings;
        state.parameters = parameters;
        state.first_time_init = true;
        state.mark(changed);

        log_debug!("Defaults restored, {} dimension(s) pending", changed.len());
        Ok(())
    }

    /// Run one arbitration pass and write the chosen dimensions.
    pub fn commit_pending(&self) -> Status {
        let (plan, settings, focus, preview) = {
            let mut guard = self.lock();
            let state = &mut *guard;

            let plan = PassPlan::plan(&mut state.pending, &state.settings, state.first_time_init);
            state.first_time_init = false;
            (
                plan,
                state.settings.clone(),
                state.focus_state(),
                state.preview,
            )
        };

        let applier = Applier::new(&self.channel, &self.allocator, &settings, focus, preview);
        plan.execute(&applier)
    }

    /// Bring the device's locks to the requested state.
    ///
    /// Exposure and white-balance lock states are mirrored into the visible
    /// parameters once the device's state has been read.
    pub fn set_locks(&self, exposure: bool, white_balance: bool, focus: bool) -> Status {
        {
            let mut state = self.lock();
            state.settings.exposure_lock = exposure;
            state.settings.white_balance_lock = white_balance;
            state.settings.focus_lock = focus;
        }

        let report = locks::reconcile(
            &self.channel,
            LockTargets {
                exposure,
                white_balance,
                focus,
            },
        );

        let mut state = self.lock();
        for (dimension, locked) in &report.confirmed {
            let key = match dimension {
                Dimension::ExposureLock => KEY_AUTO_EXPOSURE_LOCK,
                Dimension::WhiteBalanceLock => KEY_AUTO_WHITEBALANCE_LOCK,
                _ => continue,
            };
            state
                .parameters
                .set(key, if *locked { TRUE } else { FALSE });
        }

        report.result
    }

    /// Externally visible parameters.
    pub fn current_parameters(&self) -> Parameters {
        self.lock().parameters.clone()
    }

    pub fn snapshot(&self) -> Settings {
        self.lock().settings.clone()
    }

    pub fn pending(&self) -> PendingSet {
        self.lock().pending
    }

    pub fn is_first_time(&self) -> bool {
        self.lock().first_time_init
    }

    /// Preview frame the metering and focus areas are mapped onto.
    pub fn set_preview_size(&self, width: u32, height: u32) {
        self.lock().preview = (width, height);
    }

    pub fn set_autofocus_active(&self, active: bool) {
        self.lock().autofocus_active = active;
    }

    pub fn set_face_detection_running(&self, running: bool) {
        self.lock().face_detection_running = running;
    }

    pub fn set_focus_areas(&self, areas: Vec<CameraArea>) {
        self.lock().focus_areas = areas;
    }

    pub fn channel(&self) -> &D {
        &self.channel
    }

    pub fn allocator(&self) -> &A {
        &self.allocator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{
        ConfigRecord, Endpoint, HeapAllocator, MockBufferAllocator, MockDeviceChannel,
        SimulatedDevice,
    };
    use crate::tables::codes;

    fn open() -> Session<SimulatedDevice, HeapAllocator> {
        Session::open(SimulatedDevice::new(), HeapAllocator::new(), &Profile::default()).unwrap()
    }

    fn request(pairs: &[(&str, &str)]) -> Parameters {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_open_marks_every_dimension() {
        let session = open();
        assert_eq!(session.pending(), PendingSet::all());
        assert!(session.is_first_time());
        assert!(session.channel().writes().is_empty());

        let params = session.current_parameters();
        assert_eq!(params.get(KEY_MAX_NUM_METERING_AREAS), Some("1"));
        assert_eq!(params.get(KEY_SCENE_MODE), Some("auto"));
    }

    #[test]
    fn test_open_rejects_unknown_default() {
        let mut profile = Profile::default();
        profile.defaults.effect = Some("cartoon".to_string());
        let result = Session::open(SimulatedDevice::new(), HeapAllocator::new(), &profile);
        assert!(matches!(
            result,
            Err(ControlError::DefaultMissing {
                dimension: Dimension::Effect,
                ..
            })
        ));
    }

    #[test]
    fn test_not_ready_pass_fails_then_stays_silent() {
        let mut channel = MockDeviceChannel::new();
        channel.expect_is_ready().return_const(false);
        channel.expect_write_config().never();
        channel.expect_read_config().never();
        let session = Session::open(channel, MockBufferAllocator::new(), &Profile::default())
            .unwrap();

        assert_eq!(
            session.commit_pending(),
            Err(ControlError::PassFailed {
                failed: Dimension::ALL.len(),
                attempted: Dimension::ALL.len(),
            })
        );
        assert!(session.pending().is_empty());
        assert_eq!(session.commit_pending(), Ok(()));
    }

    #[test]
    fn test_first_commit_clears_first_time() {
        let session = open();
        session.commit_pending().unwrap();
        assert!(!session.is_first_time());
        assert!(session.pending().is_empty());

        let writes = session.channel().take_writes();
        assert!(!writes.is_empty());
        assert_eq!(writes[0], (Endpoint::SceneMode, ConfigRecord::scene_mode(0)));

        session.commit_pending().unwrap();
        assert!(session.channel().writes().is_empty());
    }

    #[test]
    fn test_request_before_first_commit_is_forced() {
        let session = open();
        session
            .apply_request(&request(&[(KEY_CONTRAST, "150")]))
            .unwrap();
        assert_eq!(session.pending(), PendingSet::all());
        assert_eq!(session.snapshot().contrast, 50);
    }

    #[test]
    fn test_scene_change_then_settings() {
        let session = open();
        session.commit_pending().unwrap();
        session.channel().take_writes();

        session
            .apply_request(&request(&[(KEY_SCENE_MODE, "night"), (KEY_CONTRAST, "150")]))
            .unwrap();
        session.commit_pending().unwrap();
        assert_eq!(
            session.channel().take_writes(),
            vec![(
                Endpoint::SceneMode,
                ConfigRecord::scene_mode(codes::scene::NIGHT)
            )]
        );

        // Contrast stays pending but the night scene owns the device
        assert!(session.pending().contains(Dimension::Contrast));
        session.commit_pending().unwrap();
        assert!(session.channel().take_writes().is_empty());
        assert!(session.pending().is_empty());
    }

    #[test]
    fn test_capabilities_win_over_request() {
        let session = open();
        session
            .apply_request(&request(&[
                (KEY_MAX_NUM_METERING_AREAS, "10"),
                (KEY_METERING_AREAS, "(-10,-10,10,10,1),(20,20,30,30,1)"),
            ]))
            .unwrap();
        assert!(session.snapshot().metering_areas.is_empty());
        assert_eq!(
            session.current_parameters().get(KEY_MAX_NUM_METERING_AREAS),
            Some("1")
        );
    }

    #[test]
    fn test_apply_defaults_forces_next_pass() {
        let session = open();
        session.commit_pending().unwrap();
        session
            .apply_request(&request(&[(KEY_BRIGHTNESS, "80")]))
            .unwrap();
        session.commit_pending().unwrap();
        session.channel().take_writes();

        session.apply_defaults().unwrap();
        assert!(session.is_first_time());
        assert_eq!(session.pending(), PendingSet::all());
        assert_eq!(session.snapshot().brightness, DEFAULT_BRIGHTNESS);

        session.commit_pending().unwrap();
        assert_eq!(
            session.channel().current(Endpoint::Brightness),
            Some(ConfigRecord::brightness(DEFAULT_BRIGHTNESS))
        );
    }

    #[test]
    fn test_touch_focus_region_reaches_device() {
        let session = open();
        session.set_focus_areas(vec![CameraArea {
            left: -1000,
            top: -1000,
            right: 0,
            bottom: 0,
            weight: 1,
        }]);
        session.commit_pending().unwrap();

        let Some(ConfigRecord::FocusRegion { region, .. }) =
            session.channel().current(Endpoint::FocusRegion)
        else {
            panic!("focus region was not written");
        };
        assert_eq!((region.left, region.top), (0, 0));
        assert_eq!((region.width, region.height), (127, 127));
    }

    #[test]
    fn test_set_locks_mirrors_parameters() {
        let session = open();
        session.set_locks(true, true, false).unwrap();

        let params = session.current_parameters();
        assert_eq!(params.get(KEY_AUTO_EXPOSURE_LOCK), Some(TRUE));
        assert_eq!(params.get(KEY_AUTO_WHITEBALANCE_LOCK), Some(TRUE));
        assert!(session.snapshot().exposure_lock);
        assert_eq!(session.channel().writes().len(), 2);
    }

    #[test]
    fn test_close_returns_collaborators() {
        let session = open();
        session.commit_pending().unwrap();
        let (device, allocator) = session.close();
        assert!(!device.writes().is_empty());
        assert_eq!(allocator.outstanding(), 0);
    }
}
