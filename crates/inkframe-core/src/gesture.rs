//! Pointer gesture state machine: single-contact pan, two-contact pinch zoom.
//!
//! ```text
//!            down (1 contact)            down (2 contacts)
//!   Idle ─────────────────────▶ Panning ─────────────────▶ Pinching
//!    ▲                            │  ▲                        │
//!    └──── up (0 contacts) ───────┘  └── up (1 contact left) ─┘
//! ```
//!
//! Anchors are re-derived on every contact-count transition from the live
//! contacts and the current viewport state, so a pan that resumes after a
//! pinch starts from where the pinch left the image.

use thiserror::Error;

use crate::viewport::{clamp_zoom, ViewportEngine};

/// Zoom step (percent) per wheel notch.
pub const DEFAULT_WHEEL_STEP: i32 = 6;

/// One active touch or pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerContact {
    pub id: i32,
    pub x: f64,
    pub y: f64,
}

impl PointerContact {
    pub fn distance_to(&self, other: &PointerContact) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanAnchor {
    pub start_x: f64,
    pub start_y: f64,
    pub start_offset_x: i32,
    pub start_offset_y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchAnchor {
    pub start_distance: f64,
    pub start_zoom_percent: i32,
}

/// Reference point of the gesture in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureAnchor {
    Pan(PanAnchor),
    Pinch(PinchAnchor),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Idle,
    Panning,
    Pinching,
}

/// Failure to capture or release a pointer on the input element.
#[derive(Debug, Error)]
#[error("pointer capture failed for pointer {pointer_id}: {reason}")]
pub struct CaptureError {
    pub pointer_id: i32,
    pub reason: String,
}

/// Routes a pointer's events to the editing surface while it is down.
pub trait PointerCapture {
    fn capture(&mut self, pointer_id: i32) -> Result<(), CaptureError>;

    /// Failures here are ignorable: the pointer may already be gone.
    fn release(&mut self, pointer_id: i32) -> Result<(), CaptureError>;
}

/// For hosts without pointer capture.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapture;

impl PointerCapture for NoCapture {
    fn capture(&mut self, _pointer_id: i32) -> Result<(), CaptureError> {
        Ok(())
    }

    fn release(&mut self, _pointer_id: i32) -> Result<(), CaptureError> {
        Ok(())
    }
}

/// Tracks live contacts and turns their motion into viewport changes.
#[derive(Debug, Clone, Default)]
pub struct GestureTracker {
    /// In arrival order; the first two drive a pinch.
    contacts: Vec<PointerContact>,
    anchor: Option<GestureAnchor>,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> GesturePhase {
        match self.anchor {
            None => GesturePhase::Idle,
            Some(GestureAnchor::Pan(_)) => GesturePhase::Panning,
            Some(GestureAnchor::Pinch(_)) => GesturePhase::Pinching,
        }
    }

    pub fn anchor(&self) -> Option<&GestureAnchor> {
        self.anchor.as_ref()
    }

    pub fn contacts(&self) -> &[PointerContact] {
        &self.contacts
    }

    /// A pointer went down on the editing surface.
    pub fn pointer_down<C: PointerCapture + ?Sized>(
        &mut self,
        contact: PointerContact,
        engine: &ViewportEngine,
        capture: &mut C,
    ) {
        if let Err(e) = capture.capture(contact.id) {
            tracing::warn!(error = %e, "pointer capture failed");
        }

        if let Some(existing) = self.contacts.iter_mut().find(|c| c.id == contact.id) {
            *existing = contact;
            return;
        }
        self.contacts.push(contact);
        self.reanchor(engine);
    }

    /// A tracked pointer moved. Returns true when the viewport changed.
    pub fn pointer_move(&mut self, id: i32, x: f64, y: f64, engine: &mut ViewportEngine) -> bool {
        let Some(contact) = self.contacts.iter_mut().find(|c| c.id == id) else {
            return false;
        };
        contact.x = x;
        contact.y = y;

        match (self.contacts.len(), self.anchor) {
            (2, Some(GestureAnchor::Pinch(anchor))) => {
                if anchor.start_distance <= f64::EPSILON {
                    return false;
                }
                let distance = self.contacts[0].distance_to(&self.contacts[1]);
                let ratio = distance / anchor.start_distance;
                let next = clamp_zoom((f64::from(anchor.start_zoom_percent) * ratio).round() as i32);
                if next == engine.state().zoom_percent {
                    return false;
                }
                tracing::trace!(zoom = next, ratio, "pinch");
                engine.set_zoom(next)
            }
            (1, Some(GestureAnchor::Pan(anchor))) => {
                let next_x = f64::from(anchor.start_offset_x) + (x - anchor.start_x);
                let next_y = f64::from(anchor.start_offset_y) + (y - anchor.start_y);
                engine.set_offset(next_x, next_y)
            }
            _ => false,
        }
    }

    /// A pointer was released, cancelled, or left the surface.
    ///
    /// Returns true if the pointer was being tracked. Capture release failures
    /// are logged and dropped.
    pub fn pointer_up<C: PointerCapture + ?Sized>(
        &mut self,
        id: i32,
        engine: &ViewportEngine,
        capture: &mut C,
    ) -> bool {
        let before = self.contacts.len();
        self.contacts.retain(|c| c.id != id);
        let tracked = self.contacts.len() != before;
        if tracked {
            self.reanchor(engine);
        }

        if let Err(e) = capture.release(id) {
            tracing::debug!(error = %e, "ignoring pointer capture release failure");
        }
        tracked
    }

    /// Same as [`pointer_up`](Self::pointer_up); cancel and leave clear state
    /// exactly like a release.
    pub fn pointer_cancel<C: PointerCapture + ?Sized>(
        &mut self,
        id: i32,
        engine: &ViewportEngine,
        capture: &mut C,
    ) -> bool {
        self.pointer_up(id, engine, capture)
    }

    /// Forget every contact (session end).
    pub fn clear(&mut self) {
        self.contacts.clear();
        self.anchor = None;
    }

    fn reanchor(&mut self, engine: &ViewportEngine) {
        let previous = self.phase();
        let state = engine.state();
        match self.contacts.as_slice() {
            [] => self.anchor = None,
            [only] => {
                self.anchor = Some(GestureAnchor::Pan(PanAnchor {
                    start_x: only.x,
                    start_y: only.y,
                    start_offset_x: state.offset_x,
                    start_offset_y: state.offset_y,
                }));
            }
            [first, second] => {
                self.anchor = Some(GestureAnchor::Pinch(PinchAnchor {
                    start_distance: first.distance_to(second),
                    start_zoom_percent: state.zoom_percent,
                }));
            }
            // Extra contacts ride along without re-anchoring
            _ => {}
        }
        let phase = self.phase();
        if phase != previous {
            tracing::debug!(?previous, ?phase, contacts = self.contacts.len(), "gesture phase");
        }
    }
}

/// Wheel input: one fixed zoom step per event, anchored at the pointer.
///
/// Scrolling up (`delta_y < 0`) zooms in; anything else zooms out.
pub fn wheel_zoom(engine: &mut ViewportEngine, delta_y: f64, x: f64, y: f64, step: i32) -> bool {
    let delta = if delta_y < 0.0 { step } else { -step };
    engine.zoom_by(delta, x, y)
}
