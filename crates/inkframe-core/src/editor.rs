//! One crop session: an image, its viewport, the gestures driving it and the
//! save round trip.

use thiserror::Error;

use crate::config::EditorConfig;
use crate::decode::{decode_image, DecodeError, DecodedImage};
use crate::encode::{encode_png, EncodeError};
use crate::gesture::{wheel_zoom, GesturePhase, GestureTracker, PointerCapture, PointerContact};
use crate::persist::{CropStore, CropSubmission, PersistError, SaveReceipt};
use crate::viewport::{
    Axis, DrawSurface, FitMode, OutputFrame, RasterSurface, ViewportEngine, ViewportState,
};

/// Why a save did not go through. The editor state is left as it was.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("no image loaded")]
    NotReady,

    #[error("a save is already in progress")]
    InProgress,

    #[error("failed to encode output: {0}")]
    Encode(#[from] EncodeError),

    #[error("failed to store output: {0}")]
    Persist(#[from] PersistError),
}

impl SaveError {
    pub fn is_retryable(&self) -> bool {
        match self {
            SaveError::Persist(e) => e.is_retryable(),
            SaveError::InProgress => true,
            SaveError::NotReady | SaveError::Encode(_) => false,
        }
    }
}

/// Crop editor for a single queued image.
#[derive(Debug, Clone)]
pub struct CropEditor {
    image_id: String,
    config: EditorConfig,
    viewport: ViewportEngine,
    gestures: GestureTracker,
    saving: bool,
}

impl CropEditor {
    pub fn new(image_id: impl Into<String>, config: EditorConfig) -> Self {
        let viewport =
            ViewportEngine::new(config.frame(), config.fit_mode).with_background(config.background);
        Self {
            image_id: image_id.into(),
            config,
            viewport,
            gestures: GestureTracker::new(),
            saving: false,
        }
    }

    pub fn image_id(&self) -> &str {
        &self.image_id
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn frame(&self) -> OutputFrame {
        self.viewport.frame()
    }

    pub fn viewport(&self) -> &ViewportEngine {
        &self.viewport
    }

    pub fn state(&self) -> &ViewportState {
        self.viewport.state()
    }

    pub fn is_ready(&self) -> bool {
        self.viewport.is_ready()
    }

    pub fn gesture_phase(&self) -> GesturePhase {
        self.gestures.phase()
    }

    /// Decode and load an uploaded file.
    ///
    /// On failure the editor drops any previous image and stays in the
    /// no-render state.
    pub fn load_image_bytes(&mut self, bytes: &[u8]) -> Result<(), DecodeError> {
        self.gestures.clear();
        match decode_image(bytes) {
            Ok(image) => {
                self.viewport.load_image(image);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(image_id = %self.image_id, error = %e, "image decode failed");
                self.viewport.unload();
                Err(e)
            }
        }
    }

    pub fn load_image(&mut self, image: DecodedImage) {
        self.gestures.clear();
        self.viewport.load_image(image);
    }

    pub fn pointer_down<C: PointerCapture + ?Sized>(
        &mut self,
        id: i32,
        x: f64,
        y: f64,
        capture: &mut C,
    ) {
        self.gestures
            .pointer_down(PointerContact { id, x, y }, &self.viewport, capture);
    }

    pub fn pointer_move(&mut self, id: i32, x: f64, y: f64) -> bool {
        self.gestures.pointer_move(id, x, y, &mut self.viewport)
    }

    pub fn pointer_up<C: PointerCapture + ?Sized>(&mut self, id: i32, capture: &mut C) -> bool {
        self.gestures.pointer_up(id, &self.viewport, capture)
    }

    pub fn pointer_cancel<C: PointerCapture + ?Sized>(&mut self, id: i32, capture: &mut C) -> bool {
        self.gestures.pointer_cancel(id, &self.viewport, capture)
    }

    pub fn pointer_leave<C: PointerCapture + ?Sized>(&mut self, id: i32, capture: &mut C) -> bool {
        self.gestures.pointer_cancel(id, &self.viewport, capture)
    }

    pub fn wheel(&mut self, delta_y: f64, x: f64, y: f64) -> bool {
        wheel_zoom(&mut self.viewport, delta_y, x, y, self.config.wheel_step())
    }

    pub fn set_fit_mode(&mut self, mode: FitMode) -> bool {
        self.viewport.set_fit_mode(mode)
    }

    pub fn rotate_left(&mut self) -> bool {
        self.viewport.rotate_left()
    }

    pub fn rotate_right(&mut self) -> bool {
        self.viewport.rotate_right()
    }

    pub fn flip(&mut self, axis: Axis) -> bool {
        self.viewport.flip(axis)
    }

    pub fn reset_view(&mut self) -> bool {
        self.viewport.reset_view()
    }

    pub fn set_zoom(&mut self, percent: i32) -> bool {
        self.viewport.set_zoom(percent)
    }

    pub fn set_offset(&mut self, x: f64, y: f64) -> bool {
        self.viewport.set_offset(x, y)
    }

    pub fn render<S: DrawSurface + ?Sized>(&self, surface: &mut S) -> bool {
        self.viewport.render(surface)
    }

    /// Render the frame in software.
    pub fn render_raster(&self) -> Option<RasterSurface> {
        let frame = self.viewport.frame();
        let mut surface = RasterSurface::new(frame.width, frame.height);
        self.viewport.render(&mut surface).then_some(surface)
    }

    /// Render at frame size and encode as PNG.
    pub fn export(&self) -> Result<CropSubmission, SaveError> {
        let surface = self.render_raster().ok_or(SaveError::NotReady)?;
        let png = encode_png(surface.pixels(), surface.width(), surface.height())?;
        Ok(CropSubmission {
            image_id: self.image_id.clone(),
            png,
            mode: self.viewport.state().fit_mode,
        })
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Mark a save as in flight. Returns false if one already is.
    pub fn begin_save(&mut self) -> bool {
        if self.saving {
            return false;
        }
        self.saving = true;
        true
    }

    pub fn finish_save(&mut self) {
        self.saving = false;
    }

    /// Export and hand the result to `store`.
    ///
    /// Any failure leaves the viewport untouched so the user can retry.
    pub fn save<S: CropStore + ?Sized>(&mut self, store: &mut S) -> Result<SaveReceipt, SaveError> {
        if !self.is_ready() {
            return Err(SaveError::NotReady);
        }
        if !self.begin_save() {
            return Err(SaveError::InProgress);
        }

        let result = self
            .export()
            .and_then(|submission| store.save_crop(&submission).map_err(SaveError::from));
        self.finish_save();

        match &result {
            Ok(receipt) => {
                tracing::debug!(
                    image_id = %self.image_id,
                    next = receipt.next_location(),
                    "crop saved"
                );
            }
            Err(e) => {
                tracing::warn!(image_id = %self.image_id, error = %e, "crop save failed");
            }
        }
        result
    }
}
