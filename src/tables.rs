//! Translation tables between request vocabulary and device control codes.
//!
//! Lookups are linear scans in declaration order and the first match wins in
//! both directions. Several tables map more than one name to the same code
//! (`continuous-video` and `continuous-picture` both select continuous focus),
//! so reverse lookup always yields the earliest declared name.

use crate::dimension::Dimension;

/// Device control codes.
pub mod codes {
    /// Scene presets. `MANUAL` is the "no preset" scene that leaves individual
    /// settings in effect.
    pub mod scene {
        pub const MANUAL: u32 = 0;
        pub const CLOSEUP: u32 = 1;
        pub const PORTRAIT: u32 = 2;
        pub const LANDSCAPE: u32 = 3;
        pub const UNDERWATER: u32 = 4;
        pub const SPORT: u32 = 5;
        pub const MOOD: u32 = 7;
        pub const NIGHT_INDOOR: u32 = 9;
        pub const DOCUMENT: u32 = 11;
        pub const BARCODE: u32 = 12;
        pub const SUPER_NIGHT: u32 = 13;
        pub const CINE: u32 = 14;
        pub const OLD_FILM: u32 = 15;
        pub const ACTION: u32 = 16;
        pub const NIGHT: u32 = 19;
        pub const PARTY: u32 = 20;
        pub const SUNSET: u32 = 24;
    }

    pub mod white_balance {
        pub const OFF: u32 = 0;
        pub const AUTO: u32 = 1;
        pub const SUNLIGHT: u32 = 2;
        pub const CLOUDY: u32 = 3;
        pub const TUNGSTEN: u32 = 5;
        pub const FLUORESCENT: u32 = 6;
        pub const INCANDESCENT: u32 = 7;
        pub const HORIZON: u32 = 9;
        pub const SUNSET: u32 = 0x7F00_0001;
        /// Not a device mode: selects auto white balance with face priority.
        pub const FACE_PRIORITY: u32 = 0x7F00_0100;
    }

    pub mod flicker {
        pub const OFF: u32 = 0;
        pub const AUTO: u32 = 1;
        pub const HZ_50: u32 = 2;
        pub const HZ_60: u32 = 3;
    }

    pub mod focus {
        pub const ON: u32 = 0;
        pub const OFF: u32 = 1;
        /// Continuous autofocus.
        pub const AUTO: u32 = 2;
        pub const AUTO_LOCK: u32 = 3;
        pub const AUTO_MACRO: u32 = 0x7F00_0001;
        pub const AUTO_INFINITY: u32 = 0x7F00_0002;
        pub const HYPERFOCAL: u32 = 0x7F00_0003;
        pub const PORTRAIT: u32 = 0x7F00_0004;
        pub const EXTENDED: u32 = 0x7F00_0005;
        pub const CONTINUOUS_FACE_PRIORITY: u32 = 0x7F00_0006;
    }

    pub mod exposure {
        pub const OFF: u32 = 0;
        pub const AUTO: u32 = 1;
        pub const NIGHT: u32 = 2;
        pub const BACKLIGHT: u32 = 3;
        pub const SPOTLIGHT: u32 = 4;
        pub const SPORTS: u32 = 5;
        pub const SNOW: u32 = 6;
        pub const BEACH: u32 = 7;
        pub const LARGE_APERTURE: u32 = 8;
        pub const SMALL_APERTURE: u32 = 9;
    }

    pub mod flash {
        pub const ON: u32 = 0;
        pub const OFF: u32 = 1;
        pub const AUTO: u32 = 2;
        pub const RED_EYE_REDUCTION: u32 = 3;
        pub const FILL_IN: u32 = 4;
        pub const TORCH: u32 = 5;
    }

    pub mod effect {
        pub const NONE: u32 = 0;
        pub const NEGATIVE: u32 = 3;
        pub const SOLARIZE: u32 = 10;
        pub const SEPIA: u32 = 0x7F00_0001;
        pub const GRAYSCALE: u32 = 0x7F00_0002;
        pub const NATURAL: u32 = 0x7F00_0003;
        pub const VIVID: u32 = 0x7F00_0004;
        pub const COLOUR_SWAP: u32 = 0x7F00_0005;
        pub const BLACK_WHITE: u32 = 0x7F00_0006;
        pub const WHITE_BOARD: u32 = 0x7F00_0007;
        pub const BLACK_BOARD: u32 = 0x7F00_0008;
        pub const AQUA: u32 = 0x7F00_0009;
        pub const POSTERIZE: u32 = 0x7F00_000A;
    }
}

/// Ordered, bidirectional name ↔ code table for one dimension.
#[derive(Debug)]
pub struct TranslationTable {
    pub dimension: Dimension,
    pub entries: &'static [(&'static str, u32)],
}

impl TranslationTable {
    /// Code for `name`, scanning in declaration order.
    pub fn to_hardware(&self, name: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == name)
            .map(|(_, code)| *code)
    }

    /// Earliest declared name for `code`.
    pub fn to_symbol(&self, code: u32) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(_, entry)| *entry == code)
            .map(|(name, _)| *name)
    }

    /// Declared names in table order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }
}

pub static SCENE: TranslationTable = TranslationTable {
    dimension: Dimension::SceneMode,
    entries: &[
        ("auto", codes::scene::MANUAL),
        ("action", codes::scene::ACTION),
        ("night", codes::scene::NIGHT),
        ("party", codes::scene::PARTY),
        ("sunset", codes::scene::SUNSET),
        ("closeup", codes::scene::CLOSEUP),
        ("aqua", codes::scene::UNDERWATER),
        ("sport", codes::scene::SPORT),
        ("mood", codes::scene::MOOD),
        ("night-indoor", codes::scene::NIGHT_INDOOR),
        ("document", codes::scene::DOCUMENT),
        ("barcode", codes::scene::BARCODE),
        ("super-night", codes::scene::SUPER_NIGHT),
        ("cine", codes::scene::CINE),
        ("old-film", codes::scene::OLD_FILM),
    ],
};

pub static WHITE_BALANCE: TranslationTable = TranslationTable {
    dimension: Dimension::WhiteBalance,
    entries: &[
        ("auto", codes::white_balance::AUTO),
        ("daylight", codes::white_balance::SUNLIGHT),
        ("cloudy-daylight", codes::white_balance::CLOUDY),
        ("fluorescent", codes::white_balance::FLUORESCENT),
        ("incandescent", codes::white_balance::INCANDESCENT),
        ("tungsten", codes::white_balance::TUNGSTEN),
        ("horizon", codes::white_balance::HORIZON),
        ("face-priority", codes::white_balance::FACE_PRIORITY),
        ("sunset", codes::white_balance::SUNSET),
    ],
};

pub static FLICKER: TranslationTable = TranslationTable {
    dimension: Dimension::Flicker,
    entries: &[
        ("off", codes::flicker::OFF),
        ("auto", codes::flicker::AUTO),
        ("50hz", codes::flicker::HZ_50),
        ("60hz", codes::flicker::HZ_60),
    ],
};

pub static FOCUS: TranslationTable = TranslationTable {
    dimension: Dimension::Focus,
    entries: &[
        ("auto", codes::focus::AUTO_LOCK),
        ("infinity", codes::focus::AUTO_INFINITY),
        ("macro", codes::focus::AUTO_MACRO),
        ("continuous-video", codes::focus::AUTO),
        ("continuous-picture", codes::focus::AUTO),
        ("face", codes::focus::CONTINUOUS_FACE_PRIORITY),
        ("portrait", codes::focus::PORTRAIT),
        ("extended", codes::focus::EXTENDED),
    ],
};

pub static EXPOSURE: TranslationTable = TranslationTable {
    dimension: Dimension::Exposure,
    entries: &[
        ("off", codes::exposure::OFF),
        ("auto", codes::exposure::AUTO),
        ("night", codes::exposure::NIGHT),
        ("backlighting", codes::exposure::BACKLIGHT),
        ("spotlight", codes::exposure::SPOTLIGHT),
        ("sports", codes::exposure::SPORTS),
        ("snow", codes::exposure::SNOW),
        ("beach", codes::exposure::BEACH),
        ("aperture", codes::exposure::LARGE_APERTURE),
        ("small-aperture", codes::exposure::SMALL_APERTURE),
    ],
};

pub static FLASH: TranslationTable = TranslationTable {
    dimension: Dimension::FlashMode,
    entries: &[
        ("off", codes::flash::OFF),
        ("on", codes::flash::ON),
        ("auto", codes::flash::AUTO),
        ("torch", codes::flash::TORCH),
        ("red-eye", codes::flash::RED_EYE_REDUCTION),
        ("fill-in", codes::flash::FILL_IN),
    ],
};

pub static EFFECT: TranslationTable = TranslationTable {
    dimension: Dimension::Effect,
    entries: &[
        ("none", codes::effect::NONE),
        ("negative", codes::effect::NEGATIVE),
        ("solarize", codes::effect::SOLARIZE),
        ("sepia", codes::effect::SEPIA),
        ("mono", codes::effect::GRAYSCALE),
        ("blackboard", codes::effect::BLACK_BOARD),
        ("whiteboard", codes::effect::WHITE_BOARD),
        ("aqua", codes::effect::AQUA),
        ("posterize", codes::effect::POSTERIZE),
        ("natural", codes::effect::NATURAL),
        ("vivid", codes::effect::VIVID),
        ("color-swap", codes::effect::COLOUR_SWAP),
        ("blackwhite", codes::effect::BLACK_WHITE),
    ],
};

pub static ISO: TranslationTable = TranslationTable {
    dimension: Dimension::Iso,
    entries: &[
        ("auto", 0),
        ("100", 100),
        ("200", 200),
        ("400", 400),
        ("800", 800),
        ("1000", 1000),
        ("1200", 1200),
        ("1600", 1600),
    ],
};

/// Every translation table, in dimension order.
pub static ALL_TABLES: [&TranslationTable; 8] = [
    &SCENE,
    &WHITE_BALANCE,
    &FLICKER,
    &ISO,
    &EFFECT,
    &FOCUS,
    &EXPOSURE,
    &FLASH,
];

/// Table for an enum-valued dimension, `None` for scalar, boolean and area
/// dimensions.
pub fn table_for(dimension: Dimension) -> Option<&'static TranslationTable> {
    match dimension {
        Dimension::SceneMode => Some(&SCENE),
        Dimension::WhiteBalance => Some(&WHITE_BALANCE),
        Dimension::Flicker => Some(&FLICKER),
        Dimension::Iso => Some(&ISO),
        Dimension::Effect => Some(&EFFECT),
        Dimension::Focus => Some(&FOCUS),
        Dimension::Exposure => Some(&EXPOSURE),
        Dimension::FlashMode => Some(&FLASH),
        Dimension::EvCompensation
        | Dimension::Sharpness
        | Dimension::Brightness
        | Dimension::Contrast
        | Dimension::Saturation
        | Dimension::ExposureLock
        | Dimension::WhiteBalanceLock
        | Dimension::FocusLock
        | Dimension::MeteringAreas => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_unique_within_each_table() {
        for table in ALL_TABLES {
            let mut seen = HashSet::new();
            for name in table.names() {
                assert!(
                    seen.insert(name),
                    "duplicate name '{name}' in {} table",
                    table.dimension
                );
            }
        }
    }

    #[test]
    fn test_round_trip_respects_first_match() {
        for table in ALL_TABLES {
            for &(name, code) in table.entries {
                assert_eq!(table.to_hardware(name), Some(code));

                let symbol = table.to_symbol(code).unwrap();
                assert_eq!(table.to_hardware(symbol), Some(code));

                // The reverse lookup lands on the earliest entry sharing this code
                let first = table.entries.iter().find(|(_, c)| *c == code).unwrap();
                assert_eq!(symbol, first.0);
            }
        }
    }

    #[test]
    fn test_shared_code_prefers_earliest_name() {
        assert_eq!(FOCUS.to_hardware("continuous-picture"), Some(codes::focus::AUTO));
        assert_eq!(FOCUS.to_symbol(codes::focus::AUTO), Some("continuous-video"));
    }

    #[test]
    fn test_misses() {
        assert_eq!(SCENE.to_hardware("candlelight"), None);
        assert_eq!(FLASH.to_symbol(0xDEAD), None);
        assert_eq!(ISO.to_hardware(""), None);
    }

    #[test]
    fn test_table_for_matches_dimension() {
        for dimension in Dimension::ALL {
            if let Some(table) = table_for(dimension) {
                assert_eq!(table.dimension, dimension);
            }
        }
        assert!(table_for(Dimension::Brightness).is_none());
    }
}
