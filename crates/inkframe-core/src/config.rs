//! Session configuration passed in once by the host page.

use serde::{Deserialize, Serialize};

use crate::gesture::DEFAULT_WHEEL_STEP;
use crate::viewport::{FitMode, OutputFrame, Rgb, WHITE};

/// Output frame width of the 5.65" panel.
pub const DEFAULT_FRAME_WIDTH: u32 = 600;
/// Output frame height of the 5.65" panel.
pub const DEFAULT_FRAME_HEIGHT: u32 = 448;
/// Frame dimensions below this are raised to it.
pub const MIN_FRAME_DIMENSION: u32 = 100;

/// Length of a reorder move animation.
pub const DEFAULT_ANIMATION_MS: f64 = 180.0;
/// Position changes smaller than this (both axes) are not animated.
pub const DEFAULT_MIN_DELTA: f64 = 1.0;

/// Crop editor settings.
///
/// Every field has a default so a host may pass a partial object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub frame_width: u32,
    pub frame_height: u32,
    pub fit_mode: FitMode,
    pub background: Rgb,
    /// Zoom percent per wheel event.
    pub wheel_step: i32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            frame_width: DEFAULT_FRAME_WIDTH,
            frame_height: DEFAULT_FRAME_HEIGHT,
            fit_mode: FitMode::Cover,
            background: WHITE,
            wheel_step: DEFAULT_WHEEL_STEP,
        }
    }
}

impl EditorConfig {
    /// Output frame with both dimensions floored at [`MIN_FRAME_DIMENSION`].
    pub fn frame(&self) -> OutputFrame {
        OutputFrame::new(
            self.frame_width.max(MIN_FRAME_DIMENSION),
            self.frame_height.max(MIN_FRAME_DIMENSION),
        )
    }

    pub fn wheel_step(&self) -> i32 {
        self.wheel_step.max(1)
    }
}

/// Reorder animation settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub duration_ms: f64,
    pub min_delta: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_ANIMATION_MS,
            min_delta: DEFAULT_MIN_DELTA,
        }
    }
}
