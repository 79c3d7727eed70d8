//! Viewport state types: fit mode, quarter-turn rotation, frame geometry.

use serde::{Deserialize, Serialize};

/// Minimum zoom in percent of the fit scale.
pub const MIN_ZOOM_PERCENT: i32 = 50;
/// Maximum zoom in percent of the fit scale.
pub const MAX_ZOOM_PERCENT: i32 = 300;
/// Zoom after load and reset.
pub const DEFAULT_ZOOM_PERCENT: i32 = 100;

/// Offsets never shrink below this bound, however small the frame.
const MIN_OFFSET_BOUND: i32 = 200;
/// Offset bound as a multiple of the frame dimension.
const OFFSET_BOUND_FACTOR: f64 = 1.5;

/// How the image is scaled to the frame before zoom is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Fill the whole frame; overflow is cropped.
    #[default]
    Cover,
    /// Show the whole image; the frame may show background.
    Contain,
}

impl FitMode {
    /// Mode classification sent along with a saved crop.
    pub fn save_label(self) -> &'static str {
        match self {
            FitMode::Cover => "manual_cover",
            FitMode::Contain => "manual_contain",
        }
    }

    /// Name used by form controls.
    pub fn as_str(self) -> &'static str {
        match self {
            FitMode::Cover => "cover",
            FitMode::Contain => "contain",
        }
    }
}

impl From<&str> for FitMode {
    /// Anything other than `"cover"` is treated as contain.
    fn from(value: &str) -> Self {
        if value.eq_ignore_ascii_case("cover") {
            FitMode::Cover
        } else {
            FitMode::Contain
        }
    }
}

/// Clockwise rotation in quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Snap an arbitrary angle to the nearest quarter turn in `[0, 360)`.
    pub fn from_degrees(degrees: i32) -> Self {
        let quarter = (degrees.rem_euclid(360) + 45) / 90;
        match quarter % 4 {
            1 => Rotation::Deg90,
            2 => Rotation::Deg180,
            3 => Rotation::Deg270,
            _ => Rotation::Deg0,
        }
    }

    pub fn degrees(self) -> i32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    pub fn radians(self) -> f64 {
        f64::from(self.degrees()).to_radians()
    }

    /// `(self + delta) mod 360`, snapped to a quarter turn.
    pub fn rotated_by(self, delta_degrees: i32) -> Self {
        Self::from_degrees(self.degrees() + delta_degrees.rem_euclid(360))
    }

    /// Quarter turns swap the image axes for fitting purposes.
    #[inline]
    pub fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

/// Mirror axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Mirror left/right (`flip_x`).
    Horizontal,
    /// Mirror top/bottom (`flip_y`).
    Vertical,
}

/// The fixed output frame the image is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFrame {
    pub width: u32,
    pub height: u32,
}

impl OutputFrame {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Frame centre in frame coordinates.
    pub fn center(&self) -> (f64, f64) {
        (f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }

    /// Largest allowed absolute horizontal offset.
    pub fn max_offset_x(&self) -> i32 {
        offset_bound(self.width)
    }

    /// Largest allowed absolute vertical offset.
    pub fn max_offset_y(&self) -> i32 {
        offset_bound(self.height)
    }

    pub fn clamp_offset_x(&self, value: f64) -> i32 {
        clamp_rounded(value, self.max_offset_x())
    }

    pub fn clamp_offset_y(&self, value: f64) -> i32 {
        clamp_rounded(value, self.max_offset_y())
    }
}

fn offset_bound(dimension: u32) -> i32 {
    let scaled = (f64::from(dimension) * OFFSET_BOUND_FACTOR).round() as i32;
    scaled.max(MIN_OFFSET_BOUND)
}

fn clamp_rounded(value: f64, bound: i32) -> i32 {
    if value.is_nan() {
        return 0;
    }
    let bound = f64::from(bound);
    value.round().clamp(-bound, bound) as i32
}

/// Clamp a zoom value into `[MIN_ZOOM_PERCENT, MAX_ZOOM_PERCENT]`.
#[inline]
pub fn clamp_zoom(percent: i32) -> i32 {
    percent.clamp(MIN_ZOOM_PERCENT, MAX_ZOOM_PERCENT)
}

/// Canonical, user-controlled placement of one image on the frame.
///
/// Everything the renderer needs is derived from this record plus the image
/// size; nothing is accumulated between renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportState {
    /// Zoom relative to the fit scale, in percent (50-300).
    pub zoom_percent: i32,
    /// Horizontal offset of the image centre from the frame centre.
    pub offset_x: i32,
    /// Vertical offset of the image centre from the frame centre.
    pub offset_y: i32,
    pub rotation: Rotation,
    /// +1 or -1.
    pub flip_x: i8,
    /// +1 or -1.
    pub flip_y: i8,
    pub fit_mode: FitMode,
}

impl ViewportState {
    pub fn new(fit_mode: FitMode) -> Self {
        Self {
            zoom_percent: DEFAULT_ZOOM_PERCENT,
            offset_x: 0,
            offset_y: 0,
            rotation: Rotation::Deg0,
            flip_x: 1,
            flip_y: 1,
            fit_mode,
        }
    }

    /// Zoom as a multiplier of the fit scale.
    pub fn zoom_factor(&self) -> f64 {
        f64::from(self.zoom_percent) / 100.0
    }

    /// Flip sign for an axis.
    pub fn flip(&self, axis: Axis) -> i8 {
        match axis {
            Axis::Horizontal => self.flip_x,
            Axis::Vertical => self.flip_y,
        }
    }
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::new(FitMode::default())
    }
}
