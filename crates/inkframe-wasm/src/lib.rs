//! Inkframe WASM - WebAssembly bindings for the Inkframe editing engines
//!
//! This crate exposes the inkframe-core engines to the crop and queue pages.
//!
//! # Module Structure
//!
//! - `editor` - Crop editor session bound to a canvas (`JsCropEditor`)
//! - `reorder` - Drag-to-reorder queue list (`JsReorderList`, `plan_transitions`)
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsCropEditor } from '@inkframe/wasm';
//!
//! await init();
//!
//! const editor = new JsCropEditor(imageId, { frame_width: 600, frame_height: 448 });
//! editor.attach_canvas(canvas);
//! editor.load_image(new Uint8Array(await file.arrayBuffer()));
//! editor.render(canvas.getContext('2d'));
//! ```

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer};
use tracing_web::MakeWebConsoleWriter;
use wasm_bindgen::prelude::*;

mod editor;
mod reorder;

pub use editor::JsCropEditor;
pub use reorder::{plan_transitions, JsReorderList};

/// Default log filter for the browser console.
const LOG_FILTER: &str = "info,inkframe_core=debug";

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .without_time()
        .with_writer(MakeWebConsoleWriter::new())
        .with_filter(EnvFilter::new(LOG_FILTER));

    // A second init (e.g. a test harness) keeps the first subscriber
    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        tracing::debug!("tracing already initialized");
    }
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Convert any displayable error into a JS exception value.
pub(crate) fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}
