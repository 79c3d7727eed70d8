//! Crop editor bindings.
//!
//! Wraps [`CropEditor`] for the crop page: pointer and wheel events come in
//! from the canvas listeners, the frame is rendered in software and blitted
//! with `putImageData`, and the save button flow is driven through
//! `begin_save` / `export_png` / `finish_save` while the page does the upload.

use inkframe_core::gesture::{CaptureError, PointerCapture};
use inkframe_core::viewport::{Axis, FitMode};
use inkframe_core::{CropEditor, EditorConfig};
use wasm_bindgen::prelude::*;
use wasm_bindgen::Clamped;
use web_sys::{CanvasRenderingContext2d, Element, ImageData};

use crate::js_error;

/// Pointer capture on the editor canvas, when one is attached.
struct ElementCapture<'a>(Option<&'a Element>);

impl PointerCapture for ElementCapture<'_> {
    fn capture(&mut self, pointer_id: i32) -> Result<(), CaptureError> {
        let Some(element) = self.0 else {
            return Ok(());
        };
        element
            .set_pointer_capture(pointer_id)
            .map_err(|e| CaptureError {
                pointer_id,
                reason: format!("{e:?}"),
            })
    }

    fn release(&mut self, pointer_id: i32) -> Result<(), CaptureError> {
        let Some(element) = self.0 else {
            return Ok(());
        };
        element
            .release_pointer_capture(pointer_id)
            .map_err(|e| CaptureError {
                pointer_id,
                reason: format!("{e:?}"),
            })
    }
}

/// Axis names used by the flip buttons.
fn parse_axis(axis: &str) -> Option<Axis> {
    match axis {
        "x" | "horizontal" => Some(Axis::Horizontal),
        "y" | "vertical" => Some(Axis::Vertical),
        _ => None,
    }
}

/// Crop editor session for one queued image.
#[wasm_bindgen]
pub struct JsCropEditor {
    inner: CropEditor,
    canvas: Option<Element>,
}

#[wasm_bindgen]
impl JsCropEditor {
    /// Create an editor. `config` may be `undefined` or a partial object.
    #[wasm_bindgen(constructor)]
    pub fn new(image_id: String, config: JsValue) -> Result<JsCropEditor, JsValue> {
        let config: EditorConfig = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(js_error)?
        };
        Ok(Self::with_config(image_id, config))
    }

    /// Element that receives pointer capture.
    pub fn attach_canvas(&mut self, canvas: Element) {
        self.canvas = Some(canvas);
    }

    /// Decode and load the uploaded file bytes.
    pub fn load_image(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        self.inner.load_image_bytes(bytes).map_err(js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn ready(&self) -> bool {
        self.inner.is_ready()
    }

    #[wasm_bindgen(getter)]
    pub fn frame_width(&self) -> u32 {
        self.inner.frame().width
    }

    #[wasm_bindgen(getter)]
    pub fn frame_height(&self) -> u32 {
        self.inner.frame().height
    }

    #[wasm_bindgen(getter)]
    pub fn zoom(&self) -> i32 {
        self.inner.state().zoom_percent
    }

    pub fn pointer_down(&mut self, pointer_id: i32, x: f64, y: f64) {
        let mut capture = ElementCapture(self.canvas.as_ref());
        self.inner.pointer_down(pointer_id, x, y, &mut capture);
    }

    /// Returns true when the frame needs a re-render.
    pub fn pointer_move(&mut self, pointer_id: i32, x: f64, y: f64) -> bool {
        self.inner.pointer_move(pointer_id, x, y)
    }

    pub fn pointer_up(&mut self, pointer_id: i32) {
        let mut capture = ElementCapture(self.canvas.as_ref());
        self.inner.pointer_up(pointer_id, &mut capture);
    }

    pub fn pointer_cancel(&mut self, pointer_id: i32) {
        let mut capture = ElementCapture(self.canvas.as_ref());
        self.inner.pointer_cancel(pointer_id, &mut capture);
    }

    pub fn pointer_leave(&mut self, pointer_id: i32) {
        let mut capture = ElementCapture(self.canvas.as_ref());
        self.inner.pointer_leave(pointer_id, &mut capture);
    }

    pub fn wheel(&mut self, delta_y: f64, x: f64, y: f64) -> bool {
        self.inner.wheel(delta_y, x, y)
    }

    /// `"cover"` or `"contain"`; anything else counts as contain.
    pub fn set_fit_mode(&mut self, mode: &str) -> bool {
        self.inner.set_fit_mode(FitMode::from(mode))
    }

    pub fn rotate_left(&mut self) -> bool {
        self.inner.rotate_left()
    }

    pub fn rotate_right(&mut self) -> bool {
        self.inner.rotate_right()
    }

    /// `"x"` / `"horizontal"` or `"y"` / `"vertical"`.
    pub fn flip(&mut self, axis: &str) -> bool {
        match parse_axis(axis) {
            Some(axis) => self.inner.flip(axis),
            None => {
                tracing::warn!(axis, "unknown flip axis");
                false
            }
        }
    }

    pub fn reset_view(&mut self) -> bool {
        self.inner.reset_view()
    }

    pub fn set_zoom(&mut self, percent: i32) -> bool {
        self.inner.set_zoom(percent)
    }

    pub fn set_offset(&mut self, x: f64, y: f64) -> bool {
        self.inner.set_offset(x, y)
    }

    /// Current viewport state as a plain object.
    pub fn state(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.inner.state()).map_err(js_error)
    }

    /// Draw the frame onto `ctx`. Returns false while no image is loaded.
    pub fn render(&self, ctx: &CanvasRenderingContext2d) -> Result<bool, JsValue> {
        let Some(surface) = self.inner.render_raster() else {
            return Ok(false);
        };
        let rgba = surface.to_rgba();
        let data = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(rgba.as_slice()),
            surface.width(),
            surface.height(),
        )?;
        ctx.put_image_data(&data, 0.0, 0.0)?;
        Ok(true)
    }

    /// Frame-sized PNG of the current view.
    pub fn export_png(&self) -> Result<Vec<u8>, JsValue> {
        self.inner
            .export()
            .map(|submission| submission.png)
            .map_err(js_error)
    }

    /// `manual_cover` or `manual_contain`, sent with the upload.
    pub fn mode_label(&self) -> String {
        self.inner.state().fit_mode.save_label().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn saving(&self) -> bool {
        self.inner.is_saving()
    }

    /// Returns false if a save is already in flight.
    pub fn begin_save(&mut self) -> bool {
        self.inner.begin_save()
    }

    /// The view is kept either way so a failed upload can be retried.
    pub fn finish_save(&mut self, ok: bool) {
        if !ok {
            tracing::warn!(image_id = self.inner.image_id(), "crop upload failed");
        }
        self.inner.finish_save();
    }
}

impl JsCropEditor {
    pub(crate) fn with_config(image_id: String, config: EditorConfig) -> Self {
        Self {
            inner: CropEditor::new(image_id, config),
            canvas: None,
        }
    }
}
