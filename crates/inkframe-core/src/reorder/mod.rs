//! Drag-to-reorder list engine and its move animation.
//!
//! The [`OrderedList`] is the only record of order; layouts derive positions
//! from it. A reorder runs as snapshot, pure list mutation, snapshot, then
//! transition planning.

mod animation;
mod drag;
mod list;

pub use animation::{
    ease, plan_transitions, GridLayout, Layout, LayoutSnapshot, MoveTransition, Rect,
    TransitionSet,
};
pub use drag::{DragPhase, DragSession, ReorderEngine};
pub use list::{ListError, MoveDirection, OrderedList};
