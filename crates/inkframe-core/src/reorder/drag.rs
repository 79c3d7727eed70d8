//! Drag-to-reorder session handling.

use crate::config::AnimationConfig;
use crate::persist::{OrderStore, PersistError};
use crate::reorder::animation::{plan_transitions, Layout, LayoutSnapshot, TransitionSet};
use crate::reorder::list::OrderedList;

/// The item being dragged and the last target it was dragged over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    pub active_item: String,
    pub last_entered_target: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    Dragging,
}

/// Owns the list and at most one drag session.
#[derive(Debug, Clone, Default)]
pub struct ReorderEngine {
    list: OrderedList,
    session: Option<DragSession>,
}

impl ReorderEngine {
    pub fn new(list: OrderedList) -> Self {
        Self {
            list,
            session: None,
        }
    }

    pub fn list(&self) -> &OrderedList {
        &self.list
    }

    pub fn order(&self) -> &[String] {
        self.list.ids()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn phase(&self) -> DragPhase {
        if self.session.is_some() {
            DragPhase::Dragging
        } else {
            DragPhase::Idle
        }
    }

    /// Start dragging `item`. Ignored for unknown items or during a drag.
    pub fn drag_start(&mut self, item: &str) -> bool {
        if self.session.is_some() || !self.list.contains(item) {
            return false;
        }
        tracing::debug!(item, "drag start");
        self.session = Some(DragSession {
            active_item: item.to_string(),
            last_entered_target: None,
        });
        true
    }

    /// The dragged item entered `target`. Returns true if the order changed.
    pub fn drag_enter(&mut self, target: &str) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if session.active_item == target
            || session.last_entered_target.as_deref() == Some(target)
        {
            return false;
        }
        if !self.list.would_move(&session.active_item, target) {
            return false;
        }

        match self.list.move_relative(&session.active_item, target) {
            Ok(Some(direction)) => {
                tracing::debug!(active = %session.active_item, target, ?direction, "reorder");
                session.last_entered_target = Some(target.to_string());
                true
            }
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(error = %e, "reorder failed");
                false
            }
        }
    }

    /// [`drag_enter`](Self::drag_enter) with a move animation.
    ///
    /// Snapshots `layout` before and after the move (including offsets still
    /// playing in `transitions`) and starts the compensating transitions.
    pub fn drag_enter_animated<L: Layout + ?Sized>(
        &mut self,
        target: &str,
        layout: &L,
        transitions: &mut TransitionSet,
        config: &AnimationConfig,
        now_ms: f64,
    ) -> bool {
        transitions.advance(now_ms);
        let before = LayoutSnapshot::capture(&self.list, layout, transitions);
        if !self.drag_enter(target) {
            return false;
        }
        let after = LayoutSnapshot::capture(&self.list, layout, &TransitionSet::new());
        let planned = plan_transitions(&before, &after, config);
        tracing::trace!(count = planned.len(), "move transitions");
        transitions.start(planned, now_ms);
        true
    }

    /// End the drag and submit the full order once, moved or not.
    ///
    /// Without an active session nothing is submitted.
    pub fn drag_end<S: OrderStore + ?Sized>(&mut self, store: &mut S) -> Result<(), PersistError> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };
        tracing::debug!(item = %session.active_item, "drag end");
        store.submit_order(self.list.ids()).map_err(|e| {
            tracing::warn!(error = %e, "order submission failed");
            e
        })
    }

    /// Cancelling tears down and submits exactly like a normal end.
    pub fn drag_cancel<S: OrderStore + ?Sized>(
        &mut self,
        store: &mut S,
    ) -> Result<(), PersistError> {
        self.drag_end(store)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn drag_sessions_keep_ids_and_submit_once(
            len in 2usize..10,
            start in 0usize..10,
            enters in prop::collection::vec(0usize..10, 0..15),
        ) {
            let ids: Vec<String> = (0..len).map(|i| i.to_string()).collect();
            let mut engine = ReorderEngine::new(OrderedList::new(ids.clone()).unwrap());
            let mut submitted = Vec::new();

            struct Sink<'a>(&'a mut Vec<Vec<String>>);
            impl OrderStore for Sink<'_> {
                fn submit_order(&mut self, ids: &[String]) -> Result<(), PersistError> {
                    self.0.push(ids.to_vec());
                    Ok(())
                }
            }

            engine.drag_start(&ids[start % len]);
            for e in enters {
                engine.drag_enter(&ids[e % len]);
            }
            engine.drag_end(&mut Sink(&mut submitted)).unwrap();

            prop_assert_eq!(submitted.len(), 1);
            let mut order = submitted[0].clone();
            order.sort();
            let mut expected = ids;
            expected.sort();
            prop_assert_eq!(order, expected);
        }
    }
}
