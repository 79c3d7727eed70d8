//! Viewport transform engine: placing one image on a fixed output frame.
//!
//! # Coordinate System
//!
//! - Frame coordinates: origin top-left of the output frame, y axis down
//! - Offsets move the image centre away from the frame centre
//! - Rotation is clockwise in quarter turns; flips mirror around the image centre
//! - Zoom is a percentage of the fit scale (cover or contain)
//!
//! # Render Order
//!
//! translate -> rotate -> scale(flip) -> draw centred. The placement is always
//! derived from the canonical [`ViewportState`], never accumulated.

mod engine;
mod render;
mod state;

pub use engine::{fit_scale, ViewportEngine};
pub use render::{Affine, DrawSurface, Placement, RasterSurface, Rgb, WHITE};
pub use state::{
    clamp_zoom, Axis, FitMode, OutputFrame, Rotation, ViewportState, DEFAULT_ZOOM_PERCENT,
    MAX_ZOOM_PERCENT, MIN_ZOOM_PERCENT,
};
