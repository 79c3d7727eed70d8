//! Inkframe Core - interactive editing engines for an e-ink photo frame
//!
//! This crate provides the pieces behind the upload, crop and reorder pages:
//! the viewport transform engine, pointer gesture handling, the reorderable
//! list with its move animation, the crop editor session and the image queue.
//! Nothing here touches the browser; the bindings crate wires it to the page.

pub mod config;
pub mod decode;
pub mod editor;
pub mod encode;
pub mod gesture;
pub mod persist;
pub mod queue;
pub mod reorder;
pub mod viewport;

pub use config::{AnimationConfig, EditorConfig};
pub use editor::{CropEditor, SaveError};
pub use gesture::{
    CaptureError, GestureAnchor, GesturePhase, GestureTracker, NoCapture, PointerCapture,
    PointerContact,
};
pub use persist::{CropStore, CropSubmission, OrderStore, PersistError, SaveReceipt};
pub use queue::{ImageQueue, QueueError};
pub use reorder::{OrderedList, ReorderEngine, TransitionSet};
pub use viewport::{Axis, FitMode, OutputFrame, Rotation, ViewportEngine, ViewportState};
