//! Metering and focus areas.
//!
//! Requests describe areas as `(left,top,right,bottom,weight)` tuples in a
//! fixed -1000..=1000 coordinate system. They are first mapped onto the
//! preview frame as [`MeteringArea`]s (pixel rectangles), then scaled into the
//! device's 0..=255 range with integer floor division and packed into an
//! [`AlgoAreasLayout`] that is copied into a page-aligned shared buffer.

use bytemuck::{Pod, Zeroable};
use serde::Serialize;

use crate::constants::{
    AREA_COORDINATE_HALF_RANGE, MAX_ALGO_AREAS, METERING_AREAS_RANGE, SHARED_BUFFER_PAGE_SIZE,
};

/// Area as written in a request, in -1000..=1000 coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CameraArea {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub weight: i32,
}

impl CameraArea {
    /// An area is usable when it has positive extent inside the coordinate
    /// range and a weight in 1..=1000.
    pub fn is_valid(&self) -> bool {
        let range = -AREA_COORDINATE_HALF_RANGE..=AREA_COORDINATE_HALF_RANGE;
        range.contains(&self.left)
            && range.contains(&self.top)
            && range.contains(&self.right)
            && range.contains(&self.bottom)
            && self.left < self.right
            && self.top < self.bottom
            && (1..=1000).contains(&self.weight)
    }

    /// The `(0,0,0,0,0)` placeholder meaning "no area".
    pub fn is_zero(&self) -> bool {
        *self == CameraArea::default()
    }

    /// Map onto a preview frame of `width` x `height` pixels.
    pub fn to_preview(&self, width: u32, height: u32) -> MeteringArea {
        let span = 2 * AREA_COORDINATE_HALF_RANGE as i64;
        let (width, height) = (width as i64, height as i64);

        let left = (self.left as i64 + AREA_COORDINATE_HALF_RANGE as i64) * width / span;
        let top = (self.top as i64 + AREA_COORDINATE_HALF_RANGE as i64) * height / span;
        let area_width = (self.right - self.left) as i64 * width / span;
        let area_height = (self.bottom - self.top) as i64 * height / span;

        MeteringArea {
            top: top.max(0) as u32,
            left: left.max(0) as u32,
            width: area_width.max(0) as u32,
            height: area_height.max(0) as u32,
            weight: self.weight,
        }
    }
}

/// Parse a request area list such as `(-250,-250,250,250,1000),(0,0,10,10,1)`.
///
/// The single placeholder `(0,0,0,0,0)` yields an empty list.
pub fn parse_areas(input: &str) -> Result<Vec<CameraArea>, String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(Vec::new());
    }

    let mut areas = Vec::new();
    let mut rest = input;
    while !rest.is_empty() {
        let body_start = rest
            .strip_prefix('(')
            .ok_or_else(|| format!("expected '(' at \"{rest}\""))?;
        let (body, tail) = body_start
            .split_once(')')
            .ok_or_else(|| format!("unterminated area in \"{input}\""))?;

        let values = body
            .split(',')
            .map(|v| v.trim().parse::<i32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("invalid area \"({body})\": {e}"))?;
        let [left, top, right, bottom, weight] = values[..] else {
            return Err(format!(
                "area \"({body})\" needs 5 values, got {}",
                values.len()
            ));
        };

        areas.push(CameraArea {
            left,
            top,
            right,
            bottom,
            weight,
        });

        rest = tail.trim_start();
        if let Some(next) = rest.strip_prefix(',') {
            rest = next.trim_start();
            if rest.is_empty() {
                return Err(format!("trailing ',' in \"{input}\""));
            }
        } else if !rest.is_empty() {
            return Err(format!("expected ',' before \"{rest}\""));
        }
    }

    if areas.len() == 1 && areas[0].is_zero() {
        return Ok(Vec::new());
    }

    if let Some(bad) = areas.iter().find(|area| !area.is_valid()) {
        return Err(format!("area {bad:?} is out of range"));
    }

    Ok(areas)
}

/// Weighted rectangle in preview-frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MeteringArea {
    pub top: u32,
    pub left: u32,
    pub width: u32,
    pub height: u32,
    pub weight: i32,
}

/// Rectangle in the device's 0..=255 coordinate range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NormalizedArea {
    pub top: u32,
    pub left: u32,
    pub width: u32,
    pub height: u32,
    pub priority: i32,
}

impl MeteringArea {
    /// Scale into the device range relative to a `frame_width` x
    /// `frame_height` preview. Fractions are dropped.
    ///
    /// A zero frame dimension yields zeros for the affected coordinates.
    pub fn normalize(&self, frame_width: u32, frame_height: u32) -> NormalizedArea {
        let scale = |value: u32, frame: u32| -> u32 {
            if frame == 0 {
                return 0;
            }
            (value as u64 * METERING_AREAS_RANGE as u64 / frame as u64) as u32
        };

        NormalizedArea {
            top: scale(self.top, frame_height),
            left: scale(self.left, frame_width),
            width: scale(self.width, frame_width),
            height: scale(self.height, frame_height),
            priority: self.weight,
        }
    }
}

/// Purpose tag of an algorithm-area record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum AreaPurpose {
    Exposure = 0,
    Focus = 1,
    WhiteBalance = 2,
}

/// One packed area entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct AlgoArea {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
    pub priority: i32,
}

/// Fixed-size algorithm-area record in the device's shared-buffer format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct AlgoAreasLayout {
    pub size: u32,
    pub version: u32,
    pub port_index: u32,
    pub num_areas: u32,
    pub areas: [AlgoArea; MAX_ALGO_AREAS],
    pub purpose: u32,
}

impl AlgoAreasLayout {
    const VERSION: u32 = 0x0000_0101;

    /// Build a record for `areas`; entries beyond the record capacity are
    /// dropped.
    pub fn new(port_index: u32, purpose: AreaPurpose, areas: &[NormalizedArea]) -> Self {
        let mut layout = AlgoAreasLayout {
            size: std::mem::size_of::<AlgoAreasLayout>() as u32,
            version: Self::VERSION,
            port_index,
            num_areas: areas.len().min(MAX_ALGO_AREAS) as u32,
            areas: [AlgoArea::default(); MAX_ALGO_AREAS],
            purpose: purpose as u32,
        };

        for (slot, area) in layout.areas.iter_mut().zip(areas) {
            *slot = AlgoArea {
                left: area.left as i32,
                top: area.top as i32,
                width: area.width as i32,
                height: area.height as i32,
                priority: area.priority,
            };
        }

        layout
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    /// Shared-buffer size for one record: its size rounded up to a whole page.
    pub fn buffer_size() -> usize {
        std::mem::size_of::<AlgoAreasLayout>().div_ceil(SHARED_BUFFER_PAGE_SIZE)
            * SHARED_BUFFER_PAGE_SIZE
    }

    /// Read a record back from the start of a shared buffer.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let size = std::mem::size_of::<AlgoAreasLayout>();
        bytes
            .get(..size)
            .map(bytemuck::pod_read_unaligned::<AlgoAreasLayout>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_areas() {
        let areas = parse_areas("(-1000,-1000,0,0,300), (0,0,1000,1000,1)").unwrap();
        assert_eq!(areas.len(), 2);
        assert_eq!(
            areas[0],
            CameraArea {
                left: -1000,
                top: -1000,
                right: 0,
                bottom: 0,
                weight: 300
            }
        );
    }

    #[test]
    fn test_parse_placeholder_is_empty() {
        assert!(parse_areas("(0,0,0,0,0)").unwrap().is_empty());
        assert!(parse_areas("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(parse_areas("(1,2,3,4)").is_err());
        assert!(parse_areas("(0,0,10,10,1),").is_err());
        assert!(parse_areas("0,0,10,10,1").is_err());
        assert!(parse_areas("(0,0,10,10,1)(0,0,10,10,1)").is_err());
        assert!(parse_areas("(10,0,0,10,1)").is_err());
        assert!(parse_areas("(0,0,10,10,0)").is_err());
    }

    #[test]
    fn test_to_preview_maps_full_range() {
        let area = CameraArea {
            left: -1000,
            top: -1000,
            right: 1000,
            bottom: 1000,
            weight: 1,
        };
        let preview = area.to_preview(640, 480);
        assert_eq!((preview.left, preview.top), (0, 0));
        assert_eq!((preview.width, preview.height), (640, 480));
    }

    #[test]
    fn test_normalize_floors() {
        let area = MeteringArea {
            top: 100,
            left: 100,
            width: 320,
            height: 240,
            weight: 500,
        };
        let normalized = area.normalize(640, 480);
        // 100 * 255 / 480 = 53.125, 100 * 255 / 640 = 39.84
        assert_eq!(normalized.top, 53);
        assert_eq!(normalized.left, 39);
        assert_eq!(normalized.width, 127);
        assert_eq!(normalized.height, 127);
        assert_eq!(normalized.priority, 500);
    }

    #[test]
    fn test_buffer_size_is_page_aligned() {
        let size = AlgoAreasLayout::buffer_size();
        assert_eq!(size % SHARED_BUFFER_PAGE_SIZE, 0);
        assert!(size >= std::mem::size_of::<AlgoAreasLayout>());
    }

    #[test]
    fn test_layout_round_trips_through_bytes() {
        let areas = [NormalizedArea {
            top: 1,
            left: 2,
            width: 3,
            height: 4,
            priority: 5,
        }];
        let layout = AlgoAreasLayout::new(0xFFFF_FFFF, AreaPurpose::Exposure, &areas);
        let decoded = AlgoAreasLayout::from_bytes(layout.as_bytes()).unwrap();
        assert_eq!(decoded.num_areas, 1);
        assert_eq!(decoded.areas[0].priority, 5);
        assert_eq!(decoded.purpose, AreaPurpose::Exposure as u32);
    }

    proptest! {
        #[test]
        fn test_normalized_area_stays_in_range(
            width in 1u32..4096,
            height in 1u32..4096,
            fx in 0.0f64..=1.0,
            fy in 0.0f64..=1.0,
        ) {
            let left = (fx * width as f64) as u32;
            let top = (fy * height as f64) as u32;
            let area = MeteringArea {
                top,
                left,
                width: width - left,
                height: height - top,
                weight: 1,
            };
            let n = area.normalize(width, height);
            prop_assert!(n.left <= METERING_AREAS_RANGE);
            prop_assert!(n.top <= METERING_AREAS_RANGE);
            prop_assert!(n.left + n.width <= METERING_AREAS_RANGE);
            prop_assert!(n.top + n.height <= METERING_AREAS_RANGE);
        }
    }
}
