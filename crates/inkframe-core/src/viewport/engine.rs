//! The viewport transform engine.
//!
//! Owns the image, the output frame and the [`ViewportState`]. Every mutation
//! goes through a method here, lands inside its bounds, and reports whether
//! anything visible changed so the caller knows to re-render.

use super::render::{Affine, DrawSurface, Placement, Rgb, WHITE};
use super::state::{
    clamp_zoom, Axis, FitMode, OutputFrame, Rotation, ViewportState, DEFAULT_ZOOM_PERCENT,
};
use crate::decode::DecodedImage;

/// Scale that fits an image onto a frame.
///
/// Quarter turns swap the image axes before fitting. `Cover` fills the frame
/// (the larger of the two axis scales), `Contain` shows the whole image (the
/// smaller). Returns `None` for a zero-sized image or frame.
pub fn fit_scale(
    image_width: u32,
    image_height: u32,
    frame: OutputFrame,
    rotation: Rotation,
    fit_mode: FitMode,
) -> Option<f64> {
    if image_width == 0 || image_height == 0 || frame.width == 0 || frame.height == 0 {
        return None;
    }

    let (eff_w, eff_h) = if rotation.swaps_axes() {
        (image_height, image_width)
    } else {
        (image_width, image_height)
    };

    let width_scale = f64::from(frame.width) / f64::from(eff_w);
    let height_scale = f64::from(frame.height) / f64::from(eff_h);

    Some(match fit_mode {
        FitMode::Cover => width_scale.max(height_scale),
        FitMode::Contain => width_scale.min(height_scale),
    })
}

/// Zoom/pan/rotate/flip state for one image against one output frame.
#[derive(Debug, Clone)]
pub struct ViewportEngine {
    frame: OutputFrame,
    background: Rgb,
    image: Option<DecodedImage>,
    base_scale: f64,
    state: ViewportState,
}

impl ViewportEngine {
    pub fn new(frame: OutputFrame, fit_mode: FitMode) -> Self {
        Self {
            frame,
            background: WHITE,
            image: None,
            base_scale: 1.0,
            state: ViewportState::new(fit_mode),
        }
    }

    pub fn with_background(mut self, background: Rgb) -> Self {
        self.background = background;
        self
    }

    /// Take ownership of a decoded image and seed the state from it.
    ///
    /// A zero-sized image leaves the engine unloaded.
    pub fn load_image(&mut self, image: DecodedImage) {
        if image.is_empty() {
            tracing::warn!(
                width = image.width,
                height = image.height,
                "ignoring empty image"
            );
            self.image = None;
            return;
        }
        tracing::debug!(width = image.width, height = image.height, "image loaded");
        self.image = Some(image);
        self.state = ViewportState::new(self.state.fit_mode);
        self.recompute_base_scale();
    }

    /// Drop the image; the engine goes back to the no-render state.
    pub fn unload(&mut self) {
        self.image = None;
    }

    pub fn is_ready(&self) -> bool {
        self.image.is_some()
    }

    pub fn image(&self) -> Option<&DecodedImage> {
        self.image.as_ref()
    }

    pub fn frame(&self) -> OutputFrame {
        self.frame
    }

    pub fn background(&self) -> Rgb {
        self.background
    }

    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    pub fn base_scale(&self) -> f64 {
        self.base_scale
    }

    /// `base_scale * zoom_percent / 100`.
    pub fn scale(&self) -> f64 {
        self.base_scale * self.state.zoom_factor()
    }

    /// Drawn size of the image at the current scale (before rotation).
    pub fn drawn_size(&self) -> Option<(f64, f64)> {
        let image = self.image.as_ref()?;
        let scale = self.scale();
        Some((
            f64::from(image.width) * scale,
            f64::from(image.height) * scale,
        ))
    }

    fn recompute_base_scale(&mut self) {
        if let Some(image) = &self.image {
            if let Some(scale) = fit_scale(
                image.width,
                image.height,
                self.frame,
                self.state.rotation,
                self.state.fit_mode,
            ) {
                self.base_scale = scale;
            }
        }
    }

    /// Switch between cover and contain, keeping the zoom ratio.
    pub fn set_fit_mode(&mut self, mode: FitMode) -> bool {
        if !self.is_ready() {
            return false;
        }
        let zoom_ratio = self.state.zoom_factor();
        self.state.fit_mode = mode;
        self.recompute_base_scale();
        self.state.zoom_percent = clamp_zoom((zoom_ratio * 100.0).round() as i32);
        tracing::debug!(mode = mode.as_str(), base_scale = self.base_scale, "fit mode");
        true
    }

    /// Rotate clockwise by `delta_degrees`, snapped to quarter turns.
    pub fn rotate(&mut self, delta_degrees: i32) -> bool {
        if !self.is_ready() {
            return false;
        }
        self.state.rotation = self.state.rotation.rotated_by(delta_degrees);
        self.recompute_base_scale();
        tracing::debug!(
            rotation = self.state.rotation.degrees(),
            base_scale = self.base_scale,
            "rotated"
        );
        true
    }

    pub fn rotate_left(&mut self) -> bool {
        self.rotate(-90)
    }

    pub fn rotate_right(&mut self) -> bool {
        self.rotate(90)
    }

    /// Mirror along one axis.
    pub fn flip(&mut self, axis: Axis) -> bool {
        if !self.is_ready() {
            return false;
        }
        match axis {
            Axis::Horizontal => self.state.flip_x = -self.state.flip_x,
            Axis::Vertical => self.state.flip_y = -self.state.flip_y,
        }
        true
    }

    /// Back to the fitted, unrotated, unflipped, centred view.
    pub fn reset_view(&mut self) -> bool {
        if !self.is_ready() {
            return false;
        }
        self.state = ViewportState::new(self.state.fit_mode);
        self.recompute_base_scale();
        debug_assert_eq!(self.state.zoom_percent, DEFAULT_ZOOM_PERCENT);
        true
    }

    /// Set zoom directly (slider input), clamped.
    pub fn set_zoom(&mut self, percent: i32) -> bool {
        if !self.is_ready() {
            return false;
        }
        let next = clamp_zoom(percent);
        let changed = next != self.state.zoom_percent;
        self.state.zoom_percent = next;
        changed
    }

    /// Set offsets directly (slider input or pan), clamped.
    pub fn set_offset(&mut self, x: f64, y: f64) -> bool {
        if !self.is_ready() {
            return false;
        }
        let next_x = self.frame.clamp_offset_x(x);
        let next_y = self.frame.clamp_offset_y(y);
        let changed = (next_x, next_y) != (self.state.offset_x, self.state.offset_y);
        self.state.offset_x = next_x;
        self.state.offset_y = next_y;
        changed
    }

    /// Zoom by `delta` percent, keeping the point under `(focal_x, focal_y)`
    /// (frame coordinates) stationary.
    pub fn zoom_by(&mut self, delta: i32, focal_x: f64, focal_y: f64) -> bool {
        if !self.is_ready() {
            return false;
        }
        let prev = self.state.zoom_percent;
        let next = clamp_zoom(prev.saturating_add(delta));
        if next == prev {
            return false;
        }

        let ratio = f64::from(next) / f64::from(prev);
        let (cx, cy) = self.frame.center();
        let rel_x = focal_x - cx;
        let rel_y = focal_y - cy;

        let new_x = rel_x - (rel_x - f64::from(self.state.offset_x)) * ratio;
        let new_y = rel_y - (rel_y - f64::from(self.state.offset_y)) * ratio;

        self.state.zoom_percent = next;
        self.state.offset_x = self.frame.clamp_offset_x(new_x);
        self.state.offset_y = self.frame.clamp_offset_y(new_y);
        tracing::trace!(
            zoom = next,
            offset_x = self.state.offset_x,
            offset_y = self.state.offset_y,
            "anchored zoom"
        );
        true
    }

    /// Canvas placement for the current state, `None` before an image loads.
    pub fn placement(&self) -> Option<Placement> {
        let (draw_width, draw_height) = self.drawn_size()?;
        let (cx, cy) = self.frame.center();
        Some(Placement {
            center_x: cx + f64::from(self.state.offset_x),
            center_y: cy + f64::from(self.state.offset_y),
            rotation: self.state.rotation,
            flip_x: f64::from(self.state.flip_x),
            flip_y: f64::from(self.state.flip_y),
            draw_width,
            draw_height,
        })
    }

    /// Transform from image pixel coordinates to frame coordinates.
    pub fn image_to_frame(&self) -> Option<Affine> {
        let image = self.image.as_ref()?;
        Some(self.placement()?.image_to_frame(image.width, image.height))
    }

    /// Map a frame point back into image pixel coordinates.
    pub fn frame_to_image(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        Some(self.image_to_frame()?.invert()?.apply(x, y))
    }

    /// Fill the frame and draw the image. Does nothing before an image loads.
    pub fn render<S: DrawSurface + ?Sized>(&self, surface: &mut S) -> bool {
        let (Some(image), Some(placement)) = (self.image.as_ref(), self.placement()) else {
            return false;
        };
        surface.fill(self.background);
        surface.draw_image(image, &placement);
        true
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::viewport::state::{MAX_ZOOM_PERCENT, MIN_ZOOM_PERCENT};
    use proptest::prelude::*;

    fn rotation_strategy() -> impl Strategy<Value = Rotation> {
        prop_oneof![
            Just(Rotation::Deg0),
            Just(Rotation::Deg90),
            Just(Rotation::Deg180),
            Just(Rotation::Deg270),
        ]
    }

    fn loaded(frame: (u32, u32), image: (u32, u32), mode: FitMode) -> ViewportEngine {
        let mut engine = ViewportEngine::new(OutputFrame::new(frame.0, frame.1), mode);
        engine.load_image(DecodedImage::filled(image.0, image.1, [0, 0, 0]));
        engine
    }

    proptest! {
        /// Property: contain always fits the rotated image inside the frame.
        #[test]
        fn prop_contain_fits_inside_frame(
            (fw, fh) in (100u32..=1200, 100u32..=1200),
            (iw, ih) in (1u32..=4000, 1u32..=4000),
            rotation in rotation_strategy(),
        ) {
            let frame = OutputFrame::new(fw, fh);
            let scale = fit_scale(iw, ih, frame, rotation, FitMode::Contain).unwrap();
            let (mut w, mut h) = (f64::from(iw) * scale, f64::from(ih) * scale);
            if rotation.swaps_axes() {
                std::mem::swap(&mut w, &mut h);
            }
            prop_assert!(w <= f64::from(fw) + 1e-6);
            prop_assert!(h <= f64::from(fh) + 1e-6);
        }

        /// Property: cover always covers the frame.
        #[test]
        fn prop_cover_covers_frame(
            (fw, fh) in (100u32..=1200, 100u32..=1200),
            (iw, ih) in (1u32..=4000, 1u32..=4000),
            rotation in rotation_strategy(),
        ) {
            let frame = OutputFrame::new(fw, fh);
            let scale = fit_scale(iw, ih, frame, rotation, FitMode::Cover).unwrap();
            let (mut w, mut h) = (f64::from(iw) * scale, f64::from(ih) * scale);
            if rotation.swaps_axes() {
                std::mem::swap(&mut w, &mut h);
            }
            prop_assert!(w >= f64::from(fw) - 1e-6);
            prop_assert!(h >= f64::from(fh) - 1e-6);
        }

        /// Property: zoom and offsets stay in bounds for any zoom_by sequence.
        #[test]
        fn prop_zoom_by_stays_in_bounds(
            steps in prop::collection::vec((-400i32..=400, -2000.0f64..2000.0, -2000.0f64..2000.0), 1..30),
        ) {
            let mut engine = loaded((600, 448), (1200, 800), FitMode::Cover);
            let frame = engine.frame();
            for (delta, x, y) in steps {
                engine.zoom_by(delta, x, y);
                let s = engine.state();
                prop_assert!((MIN_ZOOM_PERCENT..=MAX_ZOOM_PERCENT).contains(&s.zoom_percent));
                prop_assert!(s.offset_x.abs() <= frame.max_offset_x());
                prop_assert!(s.offset_y.abs() <= frame.max_offset_y());
            }
        }

        /// Property: the image point under the focal coordinate stays put.
        #[test]
        fn prop_anchored_zoom_fixes_focal_point(
            start_zoom in 60i32..=250,
            delta in -40i32..=40,
            fx in 0.0f64..600.0,
            fy in 0.0f64..448.0,
            rotation_turns in 0i32..4,
            flip in any::<bool>(),
        ) {
            let mut engine = loaded((600, 448), (1200, 800), FitMode::Cover);
            engine.rotate(rotation_turns * 90);
            if flip {
                engine.flip(Axis::Horizontal);
            }
            engine.set_zoom(start_zoom);

            let (u, v) = engine.frame_to_image(fx, fy).unwrap();
            let changed = engine.zoom_by(delta, fx, fy);
            let (x, y) = engine.image_to_frame().unwrap().apply(u, v);

            // Offsets are small here, so no clamping interferes; rounding
            // the offsets costs at most half a pixel per axis.
            if changed {
                prop_assert!((x - fx).abs() <= 1.0, "x drifted: {} -> {}", fx, x);
                prop_assert!((y - fy).abs() <= 1.0, "y drifted: {} -> {}", fy, y);
            }
        }

        /// Property: four right turns restore rotation and base scale.
        #[test]
        fn prop_full_turn_restores(
            (iw, ih) in (1u32..=3000, 1u32..=3000),
            mode in prop_oneof![Just(FitMode::Cover), Just(FitMode::Contain)],
        ) {
            let mut engine = loaded((600, 448), (iw, ih), mode);
            let base = engine.base_scale();
            let rotation = engine.state().rotation;
            for _ in 0..4 {
                engine.rotate_right();
            }
            prop_assert_eq!(engine.state().rotation, rotation);
            prop_assert_eq!(engine.base_scale(), base);
        }
    }
}
