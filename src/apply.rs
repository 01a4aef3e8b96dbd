//! Per-dimension appliers.
//!
//! An [`Applier`] turns one dimension of a [`Settings`] snapshot into the
//! configuration records the device expects and writes them. Dispatch is an
//! exhaustive match over [`Dimension`], so adding a dimension without an
//! applier does not compile.

use crate::area::{AlgoAreasLayout, AreaPurpose, NormalizedArea};
use crate::constants::Q16_OFFSET;
use crate::device::{
    Algorithm, BufferAllocator, ConfigRecord, DeviceChannel, Endpoint, ExposureValue, Port,
    Priority,
};
use crate::dimension::Dimension;
use crate::error::{AllocError, ControlError, Status};
use crate::settings::Settings;
use crate::tables::codes;

/// Runtime focus state that shapes the focus applier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FocusState {
    /// An autofocus sweep is running; focus-mode writes are held back.
    pub autofocus_active: bool,
    pub face_detection_running: bool,
    /// First valid touch-focus area, already in device coordinates.
    pub touch_region: Option<NormalizedArea>,
}

/// Writes settings of one snapshot to a device.
pub struct Applier<'a, D: ?Sized, A: ?Sized> {
    channel: &'a D,
    allocator: &'a A,
    settings: &'a Settings,
    focus: FocusState,
    preview: (u32, u32),
}

impl<'a, D, A> Applier<'a, D, A>
where
    D: DeviceChannel + ?Sized,
    A: BufferAllocator + ?Sized,
{
    pub fn new(
        channel: &'a D,
        allocator: &'a A,
        settings: &'a Settings,
        focus: FocusState,
        preview: (u32, u32),
    ) -> Self {
        Self {
            channel,
            allocator,
            settings,
            focus,
            preview,
        }
    }

    /// Push the snapshot's value of `dimension` to the device.
    pub fn apply(&self, dimension: Dimension) -> Status {
        if !self.channel.is_ready() {
            return Err(ControlError::DeviceNotReady);
        }

        let settings = self.settings;
        match dimension {
            Dimension::SceneMode => self.write(
                Endpoint::SceneMode,
                ConfigRecord::scene_mode(settings.scene_mode),
            ),
            Dimension::EvCompensation => self.apply_ev_compensation(),
            Dimension::WhiteBalance => self.apply_white_balance(),
            Dimension::Flicker => self.write(
                Endpoint::FlickerCancel,
                ConfigRecord::flicker_cancel(settings.flicker),
            ),
            Dimension::Sharpness => self.write(
                Endpoint::Sharpening,
                ConfigRecord::sharpening(settings.sharpness),
            ),
            Dimension::Brightness => self.write(
                Endpoint::Brightness,
                ConfigRecord::brightness(settings.brightness),
            ),
            Dimension::Contrast => {
                self.write(Endpoint::Contrast, ConfigRecord::contrast(settings.contrast))
            }
            Dimension::Iso => self.apply_iso(),
            Dimension::Saturation => self.write(
                Endpoint::Saturation,
                ConfigRecord::saturation(settings.saturation),
            ),
            Dimension::Effect => self.write(
                Endpoint::ImageFilter,
                ConfigRecord::image_filter(settings.effect),
            ),
            Dimension::Focus => self.apply_focus(),
            Dimension::Exposure => self.apply_exposure(),
            Dimension::FlashMode => self.apply_flash(),
            Dimension::ExposureLock => self.write(
                Endpoint::ExposureLock,
                ConfigRecord::lock(settings.exposure_lock),
            ),
            Dimension::WhiteBalanceLock => self.write(
                Endpoint::WhiteBalanceLock,
                ConfigRecord::lock(settings.white_balance_lock),
            ),
            Dimension::FocusLock => {
                self.write(Endpoint::FocusLock, ConfigRecord::lock(settings.focus_lock))
            }
            Dimension::MeteringAreas => self.apply_metering_areas(),
        }
    }

    fn write(&self, endpoint: Endpoint, record: ConfigRecord) -> Status {
        self.write_ref(endpoint, &record)
    }

    fn write_ref(&self, endpoint: Endpoint, record: &ConfigRecord) -> Status {
        log_debug!("Writing {endpoint}: {record:?}");
        self.channel
            .write_config(endpoint, record)
            .map_err(|source| ControlError::DeviceRejected { endpoint, source })
    }

    /// A rejected priority modifier is logged and does not fail the
    /// dimension; its main record is written regardless.
    fn set_priority(&self, priority: Priority, algorithm: Algorithm, enabled: bool) {
        let record = ConfigRecord::algo_priority(priority, algorithm, enabled);
        if let Err(e) = self.write(Endpoint::AlgoPriority, record) {
            log_warning!("{priority:?} priority for {algorithm:?} not updated: {e}");
        }
    }

    fn read_exposure_value(&self) -> Result<ExposureValue, ControlError> {
        let endpoint = Endpoint::ExposureValue;
        let record = self
            .channel
            .read_config(endpoint)
            .map_err(|source| ControlError::ReadFailed { endpoint, source })?;
        Ok(record.as_exposure_value().unwrap_or_default())
    }

    /// EV compensation is carried in tenths of a stop; the device wants Q16.
    fn apply_ev_compensation(&self) -> Status {
        let mut value = self.read_exposure_value()?;
        value.ev_compensation = (self.settings.ev_compensation << Q16_OFFSET) / 10;
        self.write(Endpoint::ExposureValue, ConfigRecord::exposure_value(value))
    }

    fn apply_iso(&self) -> Status {
        let mut value = self.read_exposure_value()?;
        if self.settings.iso == 0 {
            value.auto_sensitivity = true;
        } else {
            value.auto_sensitivity = false;
            value.sensitivity = self.settings.iso;
        }
        self.write(Endpoint::ExposureValue, ConfigRecord::exposure_value(value))
    }

    fn apply_exposure(&self) -> Status {
        self.set_priority(Priority::Face, Algorithm::Exposure, false);
        self.set_priority(Priority::Region, Algorithm::Exposure, false);
        self.write(
            Endpoint::ExposureControl,
            ConfigRecord::exposure_control(self.settings.exposure),
        )
    }

    /// Face priority is not a device mode: it runs auto white balance with
    /// region priority off and the face-priority modifier on.
    fn apply_white_balance(&self) -> Status {
        let mut mode = self.settings.white_balance;
        if mode == codes::white_balance::FACE_PRIORITY {
            self.set_priority(Priority::Region, Algorithm::WhiteBalance, false);
            self.set_priority(Priority::Face, Algorithm::WhiteBalance, true);
            mode = codes::white_balance::AUTO;
        } else {
            self.set_priority(Priority::Face, Algorithm::WhiteBalance, false);
            self.set_priority(Priority::Region, Algorithm::WhiteBalance, false);
        }
        self.write(Endpoint::WhiteBalance, ConfigRecord::white_balance(mode))
    }

    fn apply_flash(&self) -> Status {
        let mode = self.settings.flash_mode;
        self.write(Endpoint::FlashControl, ConfigRecord::flash_control(mode))?;
        self.write(
            Endpoint::FocusAssist,
            ConfigRecord::focus_assist(mode != codes::flash::OFF),
        )
    }

    fn apply_focus(&self) -> Status {
        if self.focus.face_detection_running {
            self.set_priority(Priority::Region, Algorithm::Focus, false);
            self.set_priority(Priority::Face, Algorithm::Focus, true);
        } else if let Some(region) = self.focus.touch_region {
            self.set_priority(Priority::Face, Algorithm::Focus, false);
            self.set_priority(Priority::Region, Algorithm::Focus, true);
            self.write(Endpoint::FocusRegion, ConfigRecord::focus_region(region))?;
        } else {
            self.set_priority(Priority::Face, Algorithm::Focus, false);
            self.set_priority(Priority::Region, Algorithm::Focus, false);
        }

        if self.focus.autofocus_active {
            log_debug!("Autofocus in progress, focus mode write held back");
            return Ok(());
        }

        self.write(
            Endpoint::FocusControl,
            ConfigRecord::focus_control(self.settings.focus),
        )
    }

    /// Map the requested areas onto the current preview, pack them into a
    /// shared buffer and hand it to the device. The buffer goes back to the
    /// allocator whether or not the write lands.
    fn apply_metering_areas(&self) -> Status {
        let (width, height) = self.preview;
        let areas: Vec<NormalizedArea> = self
            .settings
            .metering_areas
            .iter()
            .map(|area| area.to_preview(width, height).normalize(width, height))
            .collect();
        let layout = AlgoAreasLayout::new(Port::All.index(), AreaPurpose::Exposure, &areas);

        let size = AlgoAreasLayout::buffer_size();
        let mut buffer = self.allocator.allocate(size)?;

        let bytes = layout.as_bytes();
        let Some(target) = buffer.data.get_mut(..bytes.len()) else {
            self.allocator.free(buffer);
            return Err(AllocError { size }.into());
        };
        target.copy_from_slice(bytes);

        log_debug!("Metering areas: {} area(s) in a {size} byte buffer", areas.len());
        let record = ConfigRecord::shared_buffer(buffer);
        let result = self.write_ref(Endpoint::AlgoAreas, &record);
        if let Some(buffer) = record.into_shared_buffer() {
            self.allocator.free(buffer);
        }
        result
    }
}
