//! Commit pass planning and execution.
//!
//! A pass is planned against the pending set while the session lock is held,
//! then executed against the device once the lock is released. Scene mode
//! takes precedence: a pending scene change is applied on its own, and while a
//! preset scene is active individual settings are dropped instead of written.

use crate::apply::Applier;
use crate::device::{BufferAllocator, DeviceChannel};
use crate::dimension::{Dimension, PendingSet};
use crate::error::{ControlError, Status};
use crate::settings::Settings;

/// What one commit pass will do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassPlan {
    /// Apply the scene mode alone.
    Scene,
    /// A preset scene owns the device; these pending settings were dropped.
    Suppressed(PendingSet),
    /// Apply these dimensions in order.
    Settings(Vec<Dimension>),
}

impl PassPlan {
    /// Decide the next pass and clear the bits it takes from `pending`.
    ///
    /// On the `forced` first pass under the manual scene the scene is applied
    /// together with every other setting. Under a preset scene the forced pass
    /// is an ordinary scene pass: the other forced bits stay pending.
    pub fn plan(pending: &mut PendingSet, settings: &Settings, forced: bool) -> Self {
        let manual = settings.is_manual_scene();

        if pending.contains(Dimension::SceneMode) && !(forced && manual) {
            pending.remove(Dimension::SceneMode);
            return PassPlan::Scene;
        }

        if !manual {
            let dropped = *pending;
            pending.clear();
            return PassPlan::Suppressed(dropped);
        }

        let dimensions: Vec<Dimension> = pending.iter().collect();
        pending.clear();
        PassPlan::Settings(dimensions)
    }

    /// Dimensions this pass writes, in order.
    pub fn dimensions(&self) -> Vec<Dimension> {
        match self {
            PassPlan::Scene => vec![Dimension::SceneMode],
            PassPlan::Suppressed(_) => Vec::new(),
            PassPlan::Settings(dimensions) => dimensions.clone(),
        }
    }

    /// Run the pass.
    ///
    /// A scene pass reports the scene applier's own status. A settings pass
    /// attempts every dimension and folds failures into
    /// [`ControlError::PassFailed`].
    pub fn execute<D, A>(&self, applier: &Applier<'_, D, A>) -> Status
    where
        D: DeviceChannel + ?Sized,
        A: BufferAllocator + ?Sized,
    {
        match self {
            PassPlan::Scene => {
                let result = applier.apply(Dimension::SceneMode);
                report(Dimension::SceneMode, &result);
                result
            }
            PassPlan::Suppressed(dropped) => {
                if !dropped.is_empty() {
                    log_debug!("Preset scene active, dropped pending settings: {dropped}");
                }
                Ok(())
            }
            PassPlan::Settings(dimensions) => {
                let mut failed = 0;
                for &dimension in dimensions {
                    let result = applier.apply(dimension);
                    report(dimension, &result);
                    if result.is_err() {
                        failed += 1;
                    }
                }

                if failed == 0 {
                    Ok(())
                } else {
                    Err(ControlError::PassFailed {
                        failed,
                        attempted: dimensions.len(),
                    })
                }
            }
        }
    }
}

fn report(dimension: Dimension, result: &Status) {
    match result {
        Ok(()) => log_debug!("Applied {dimension}"),
        Err(e) => log_error!("Failed to apply {dimension}: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::FocusState;
    use crate::device::{Endpoint, HeapAllocator, SimulatedDevice};
    use crate::settings::Defaults;
    use crate::tables::codes;

    fn settings() -> Settings {
        Settings::from_defaults(&Defaults::default()).unwrap()
    }

    fn pending(dimensions: &[Dimension]) -> PendingSet {
        dimensions.iter().copied().collect()
    }

    #[test]
    fn test_scene_is_applied_alone() {
        let mut settings = settings();
        settings.scene_mode = codes::scene::NIGHT;
        let mut set = pending(&[Dimension::SceneMode, Dimension::Contrast]);

        let plan = PassPlan::plan(&mut set, &settings, false);
        assert_eq!(plan, PassPlan::Scene);
        assert_eq!(set, pending(&[Dimension::Contrast]));
    }

    #[test]
    fn test_preset_scene_drops_settings() {
        let mut settings = settings();
        settings.scene_mode = codes::scene::NIGHT;
        let mut set = pending(&[Dimension::Contrast, Dimension::Iso]);

        let plan = PassPlan::plan(&mut set, &settings, false);
        assert_eq!(
            plan,
            PassPlan::Suppressed(pending(&[Dimension::Contrast, Dimension::Iso]))
        );
        assert!(set.is_empty());
        assert!(plan.dimensions().is_empty());
    }

    #[test]
    fn test_manual_scene_applies_in_bit_order() {
        let mut set = pending(&[Dimension::MeteringAreas, Dimension::Contrast, Dimension::Brightness]);
        let plan = PassPlan::plan(&mut set, &settings(), false);
        assert_eq!(
            plan.dimensions(),
            vec![
                Dimension::Brightness,
                Dimension::Contrast,
                Dimension::MeteringAreas
            ]
        );
        assert!(set.is_empty());
    }

    #[test]
    fn test_forced_manual_pass_includes_scene() {
        let mut set = PendingSet::all();
        let plan = PassPlan::plan(&mut set, &settings(), true);
        assert_eq!(plan.dimensions(), Dimension::ALL.to_vec());
        assert!(set.is_empty());
    }

    #[test]
    fn test_forced_preset_pass_keeps_other_bits() {
        let mut settings = settings();
        settings.scene_mode = codes::scene::PARTY;
        let mut set = PendingSet::all();

        assert_eq!(PassPlan::plan(&mut set, &settings, true), PassPlan::Scene);
        assert!(!set.contains(Dimension::SceneMode));
        assert_eq!(set.len(), Dimension::ALL.len() - 1);
    }

    #[test]
    fn test_failures_are_folded_without_short_circuit() {
        let device = SimulatedDevice::new();
        device.reject_writes_to(Endpoint::Contrast);
        let allocator = HeapAllocator::new();
        let settings = settings();
        let applier = Applier::new(&device, &allocator, &settings, FocusState::default(), (640, 480));

        let plan = PassPlan::Settings(vec![
            Dimension::Brightness,
            Dimension::Contrast,
            Dimension::Saturation,
        ]);
        assert_eq!(
            plan.execute(&applier),
            Err(ControlError::PassFailed {
                failed: 1,
                attempted: 3
            })
        );
        assert!(device.current(Endpoint::Saturation).is_some());
    }

    #[test]
    fn test_scene_pass_returns_precise_error() {
        let device = SimulatedDevice::new();
        device.reject_writes_to(Endpoint::SceneMode);
        let allocator = HeapAllocator::new();
        let settings = settings();
        let applier = Applier::new(&device, &allocator, &settings, FocusState::default(), (640, 480));

        assert!(matches!(
            PassPlan::Scene.execute(&applier),
            Err(ControlError::DeviceRejected {
                endpoint: Endpoint::SceneMode,
                ..
            })
        ));
    }
}
