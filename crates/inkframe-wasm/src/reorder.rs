//! Queue reorder bindings.
//!
//! The page forwards `dragstart` / `dragenter` / `dragend` from the queue
//! cards. [`JsReorderList::drag_enter_measured`] runs the whole move: it takes
//! the card rects before the move, calls back into the page to re-render in
//! the new order and measure again, and returns the transitions to play.

use inkframe_core::persist::{OrderStore, PersistError};
use inkframe_core::reorder::{self, LayoutSnapshot, OrderedList, Rect, ReorderEngine, TransitionSet};
use inkframe_core::AnimationConfig;
use serde::Deserialize;
use wasm_bindgen::prelude::*;

use crate::js_error;

/// Submits the order by calling a JS function with an array of ids.
///
/// Whatever the function returns (usually the `fetch` promise) is kept in
/// `reply` and handed back to the page.
struct JsOrderStore<'a> {
    submit: &'a js_sys::Function,
    reply: JsValue,
}

impl<'a> JsOrderStore<'a> {
    fn new(submit: &'a js_sys::Function) -> Self {
        Self {
            submit,
            reply: JsValue::UNDEFINED,
        }
    }
}

impl OrderStore for JsOrderStore<'_> {
    fn submit_order(&mut self, ids: &[String]) -> Result<(), PersistError> {
        self.reply = self
            .submit
            .call1(&JsValue::NULL, &order_array(ids))
            .map_err(|e| PersistError::Transport(format!("{e:?}")))?;
        Ok(())
    }
}

/// One card as measured by `getBoundingClientRect`.
#[derive(Debug, Deserialize)]
struct MeasuredItem {
    id: String,
    left: f64,
    top: f64,
    #[serde(default)]
    width: f64,
    #[serde(default)]
    height: f64,
}

fn snapshot(items: Vec<MeasuredItem>) -> LayoutSnapshot {
    LayoutSnapshot::from_rects(
        items
            .into_iter()
            .map(|item| (item.id, Rect::new(item.left, item.top, item.width, item.height))),
    )
}

fn measured(value: JsValue) -> Result<LayoutSnapshot, JsValue> {
    let items: Vec<MeasuredItem> = serde_wasm_bindgen::from_value(value).map_err(js_error)?;
    Ok(snapshot(items))
}

fn order_array(ids: &[String]) -> js_sys::Array {
    ids.iter().map(|id| JsValue::from_str(id)).collect()
}

/// Drag-to-reorder list over the ready images.
#[wasm_bindgen]
pub struct JsReorderList {
    engine: ReorderEngine,
    transitions: TransitionSet,
    animation: AnimationConfig,
}

#[wasm_bindgen]
impl JsReorderList {
    /// Fails on duplicate ids.
    #[wasm_bindgen(constructor)]
    pub fn new(ids: Vec<String>) -> Result<JsReorderList, JsValue> {
        OrderedList::new(ids)
            .map(|list| JsReorderList {
                engine: ReorderEngine::new(list),
                transitions: TransitionSet::new(),
                animation: AnimationConfig::default(),
            })
            .map_err(js_error)
    }

    pub fn drag_start(&mut self, id: &str) -> bool {
        self.engine.drag_start(id)
    }

    /// Returns true when the order changed and the cards need re-rendering.
    pub fn drag_enter(&mut self, id: &str) -> bool {
        self.engine.drag_enter(id)
    }

    /// Enter `target` and plan the move animation.
    ///
    /// `before` is the current measurement of the cards. When the order
    /// changes, `rerender` is called with the new order and must return the
    /// measurement taken after re-rendering. Returns
    /// `[{ id, dx, dy, duration_ms }]`, empty when nothing moved.
    pub fn drag_enter_measured(
        &mut self,
        target: &str,
        before: JsValue,
        rerender: &js_sys::Function,
        now_ms: f64,
    ) -> Result<JsValue, JsValue> {
        self.transitions.advance(now_ms);
        let before = measured(before)?;
        if !self.engine.drag_enter(target) {
            return Ok(js_sys::Array::new().into());
        }

        let after = rerender.call1(&JsValue::NULL, &order_array(self.engine.order()))?;
        let planned = reorder::plan_transitions(&before, &measured(after)?, &self.animation);
        let value = serde_wasm_bindgen::to_value(&planned).map_err(js_error)?;
        self.transitions.start(planned, now_ms);
        Ok(value)
    }

    /// Drop finished transitions. Returns true while any are still playing.
    pub fn advance(&mut self, now_ms: f64) -> bool {
        self.transitions.advance(now_ms)
    }

    #[wasm_bindgen(getter)]
    pub fn animating(&self) -> bool {
        !self.transitions.is_idle()
    }

    #[wasm_bindgen(getter)]
    pub fn dragging(&self) -> bool {
        self.engine.session().is_some()
    }

    pub fn order(&self) -> Vec<String> {
        self.engine.order().to_vec()
    }

    /// End the drag and pass the full order to `submit` once.
    ///
    /// Returns what `submit` returned, so the page can await the save and
    /// report a rejection. `undefined` when no drag was active.
    pub fn drag_end(&mut self, submit: &js_sys::Function) -> Result<JsValue, JsValue> {
        let mut store = JsOrderStore::new(submit);
        self.engine.drag_end(&mut store).map_err(js_error)?;
        Ok(store.reply)
    }

    pub fn drag_cancel(&mut self, submit: &js_sys::Function) -> Result<JsValue, JsValue> {
        let mut store = JsOrderStore::new(submit);
        self.engine.drag_cancel(&mut store).map_err(js_error)?;
        Ok(store.reply)
    }
}

/// Plan move animations from two measurements of the cards.
///
/// `before` and `after` are arrays of `{ id, left, top, width, height }`.
/// Returns `[{ id, dx, dy, duration_ms }]` for every card that moved at least
/// one pixel; the page applies `translate(dx, dy)` instantly and then
/// transitions to zero with `ease` timing.
#[wasm_bindgen]
pub fn plan_transitions(before: JsValue, after: JsValue) -> Result<JsValue, JsValue> {
    let planned = reorder::plan_transitions(
        &measured(before)?,
        &measured(after)?,
        &AnimationConfig::default(),
    );
    serde_wasm_bindgen::to_value(&planned).map_err(js_error)
}
