//! Control dimensions and the pending (dirty) set.
//!
//! Every independently controllable 3A setting is a [`Dimension`]. The
//! declaration order is the bit order of [`PendingSet`] and therefore the order
//! in which a commit pass applies pending settings.

use serde::Serialize;
use std::fmt;

/// One independently controllable imaging setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dimension {
    SceneMode,
    EvCompensation,
    WhiteBalance,
    Flicker,
    Sharpness,
    Brightness,
    Contrast,
    Iso,
    Saturation,
    Effect,
    Focus,
    Exposure,
    FlashMode,
    ExposureLock,
    WhiteBalanceLock,
    FocusLock,
    MeteringAreas,
}

impl Dimension {
    /// All dimensions in ascending bit order.
    pub const ALL: [Dimension; 17] = [
        Dimension::SceneMode,
        Dimension::EvCompensation,
        Dimension::WhiteBalance,
        Dimension::Flicker,
        Dimension::Sharpness,
        Dimension::Brightness,
        Dimension::Contrast,
        Dimension::Iso,
        Dimension::Saturation,
        Dimension::Effect,
        Dimension::Focus,
        Dimension::Exposure,
        Dimension::FlashMode,
        Dimension::ExposureLock,
        Dimension::WhiteBalanceLock,
        Dimension::FocusLock,
        Dimension::MeteringAreas,
    ];

    /// Bit of this dimension inside a [`PendingSet`].
    pub const fn bit(self) -> u32 {
        1 << (self as u32)
    }

    /// Short human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Dimension::SceneMode => "scene mode",
            Dimension::EvCompensation => "EV compensation",
            Dimension::WhiteBalance => "white balance",
            Dimension::Flicker => "anti-banding",
            Dimension::Sharpness => "sharpness",
            Dimension::Brightness => "brightness",
            Dimension::Contrast => "contrast",
            Dimension::Iso => "ISO",
            Dimension::Saturation => "saturation",
            Dimension::Effect => "effect",
            Dimension::Focus => "focus mode",
            Dimension::Exposure => "exposure mode",
            Dimension::FlashMode => "flash mode",
            Dimension::ExposureLock => "exposure lock",
            Dimension::WhiteBalanceLock => "white balance lock",
            Dimension::FocusLock => "focus lock",
            Dimension::MeteringAreas => "metering areas",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Dirty-bit set with one bit per [`Dimension`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingSet(u32);

impl PendingSet {
    const MASK: u32 = (1 << Dimension::ALL.len()) - 1;

    /// An empty set.
    pub const fn empty() -> Self {
        PendingSet(0)
    }

    /// A set with every dimension marked.
    pub const fn all() -> Self {
        PendingSet(Self::MASK)
    }

    pub fn insert(&mut self, dimension: Dimension) {
        self.0 |= dimension.bit();
    }

    pub fn remove(&mut self, dimension: Dimension) {
        self.0 &= !dimension.bit();
    }

    pub fn contains(&self, dimension: Dimension) -> bool {
        self.0 & dimension.bit() != 0
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Raw bit representation.
    pub fn bits(&self) -> u32 {
        self.0
    }

    /// Marked dimensions in ascending bit order.
    pub fn iter(&self) -> impl Iterator<Item = Dimension> + '_ {
        Dimension::ALL
            .into_iter()
            .filter(move |dimension| self.contains(*dimension))
    }
}

impl FromIterator<Dimension> for PendingSet {
    fn from_iter<I: IntoIterator<Item = Dimension>>(iter: I) -> Self {
        let mut set = PendingSet::empty();
        for dimension in iter {
            set.insert(dimension);
        }
        set
    }
}

impl fmt::Display for PendingSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<&str> = self.iter().map(Dimension::name).collect();
        f.write_str(&names.join(", "))
    }
}
