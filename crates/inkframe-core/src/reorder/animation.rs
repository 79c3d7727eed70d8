//! Move animation: snapshot before, mutate, snapshot after, play the delta.
//!
//! Items that changed position are first shifted back to where they were
//! (the inverted offset) and then eased to zero, so the user sees them glide
//! into their new slot. Finished transitions are dropped immediately and the
//! item returns to its static layout.

use serde::{Deserialize, Serialize};

use crate::config::AnimationConfig;
use crate::reorder::list::OrderedList;

/// Axis-aligned item bounds in layout coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn translated(self, dx: f64, dy: f64) -> Self {
        Self {
            left: self.left + dx,
            top: self.top + dy,
            ..self
        }
    }
}

/// Maps a position in the order to where that slot is drawn.
pub trait Layout {
    fn slot_rect(&self, index: usize) -> Rect;
}

/// Fixed-size cells flowing left to right, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub columns: usize,
    pub cell_width: f64,
    pub cell_height: f64,
    pub gap: f64,
}

impl Layout for GridLayout {
    fn slot_rect(&self, index: usize) -> Rect {
        let columns = self.columns.max(1);
        let col = (index % columns) as f64;
        let row = (index / columns) as f64;
        Rect::new(
            col * (self.cell_width + self.gap),
            row * (self.cell_height + self.gap),
            self.cell_width,
            self.cell_height,
        )
    }
}

/// Where every visible item is at one instant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    entries: Vec<(String, Rect)>,
}

impl LayoutSnapshot {
    /// Rects of every item in `list`, including any in-flight animation offset.
    pub fn capture<L: Layout + ?Sized>(
        list: &OrderedList,
        layout: &L,
        in_flight: &TransitionSet,
    ) -> Self {
        let entries = list
            .ids()
            .iter()
            .enumerate()
            .map(|(index, id)| {
                let (dx, dy) = in_flight.visual_offset(id);
                (id.clone(), layout.slot_rect(index).translated(dx, dy))
            })
            .collect();
        Self { entries }
    }

    /// From externally measured bounds.
    pub fn from_rects<I, S>(rects: I) -> Self
    where
        I: IntoIterator<Item = (S, Rect)>,
        S: Into<String>,
    {
        Self {
            entries: rects.into_iter().map(|(id, r)| (id.into(), r)).collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Rect> {
        self.entries.iter().find(|(x, _)| x == id).map(|(_, r)| r)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One item's compensating move: start displaced by `(dx, dy)`, end at zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveTransition {
    pub id: String,
    pub dx: f64,
    pub dy: f64,
    pub duration_ms: f64,
}

/// Transitions for every item that moved at least `min_delta` on some axis.
///
/// Items missing from either snapshot are skipped.
pub fn plan_transitions(
    before: &LayoutSnapshot,
    after: &LayoutSnapshot,
    config: &AnimationConfig,
) -> Vec<MoveTransition> {
    after
        .entries
        .iter()
        .filter_map(|(id, new)| {
            let old = before.get(id)?;
            let dx = old.left - new.left;
            let dy = old.top - new.top;
            if dx.abs() < config.min_delta && dy.abs() < config.min_delta {
                return None;
            }
            Some(MoveTransition {
                id: id.clone(),
                dx,
                dy,
                duration_ms: config.duration_ms,
            })
        })
        .collect()
}

/// CSS `ease`: cubic-bezier(0.25, 0.1, 0.25, 1.0).
pub fn ease(t: f64) -> f64 {
    cubic_bezier(0.25, 0.1, 0.25, 1.0, t)
}

fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64, t: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }

    let sample = |p1: f64, p2: f64, s: f64| {
        let inv = 1.0 - s;
        3.0 * inv * inv * s * p1 + 3.0 * inv * s * s * p2 + s * s * s
    };
    let slope = |p1: f64, p2: f64, s: f64| {
        let inv = 1.0 - s;
        3.0 * inv * inv * p1 + 6.0 * inv * s * (p2 - p1) + 3.0 * s * s * (1.0 - p2)
    };

    // Newton first, bisection if the slope flattens out
    let mut s = t;
    for _ in 0..8 {
        let err = sample(x1, x2, s) - t;
        if err.abs() < 1e-7 {
            return sample(y1, y2, s);
        }
        let d = slope(x1, x2, s);
        if d.abs() < 1e-6 {
            break;
        }
        s -= err / d;
    }

    let (mut lo, mut hi) = (0.0, 1.0);
    s = t;
    for _ in 0..40 {
        let x = sample(x1, x2, s);
        if (x - t).abs() < 1e-7 {
            break;
        }
        if x < t {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) / 2.0;
    }
    sample(y1, y2, s)
}

#[derive(Debug, Clone, PartialEq)]
struct Running {
    transition: MoveTransition,
    started_ms: f64,
}

/// Transitions currently playing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionSet {
    running: Vec<Running>,
    now_ms: f64,
}

impl TransitionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin playing `transitions` at `now_ms`, replacing any running
    /// transition for the same item.
    pub fn start(&mut self, transitions: Vec<MoveTransition>, now_ms: f64) {
        self.now_ms = now_ms;
        for transition in transitions {
            self.running.retain(|r| r.transition.id != transition.id);
            self.running.push(Running {
                transition,
                started_ms: now_ms,
            });
        }
    }

    /// Move the clock forward and drop transitions that have finished.
    ///
    /// Returns true while anything is still playing.
    pub fn advance(&mut self, now_ms: f64) -> bool {
        self.now_ms = now_ms;
        self.running
            .retain(|r| now_ms - r.started_ms < r.transition.duration_ms);
        !self.running.is_empty()
    }

    /// Current displacement of `id` from its static layout position.
    pub fn visual_offset(&self, id: &str) -> (f64, f64) {
        let Some(r) = self.running.iter().find(|r| r.transition.id == id) else {
            return (0.0, 0.0);
        };
        if r.transition.duration_ms <= 0.0 {
            return (0.0, 0.0);
        }
        let t = ((self.now_ms - r.started_ms) / r.transition.duration_ms).clamp(0.0, 1.0);
        let remaining = 1.0 - ease(t);
        (r.transition.dx * remaining, r.transition.dy * remaining)
    }

    pub fn is_idle(&self) -> bool {
        self.running.is_empty()
    }

    pub fn len(&self) -> usize {
        self.running.len()
    }

    pub fn clear(&mut self) {
        self.running.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> GridLayout {
        GridLayout {
            columns: 4,
            cell_width: 100.0,
            cell_height: 80.0,
            gap: 10.0,
        }
    }

    fn list(ids: &[&str]) -> OrderedList {
        OrderedList::new(ids.iter().copied()).unwrap()
    }

    #[test]
    fn test_grid_slots() {
        let grid = GridLayout {
            columns: 2,
            ..row()
        };
        assert_eq!(grid.slot_rect(0), Rect::new(0.0, 0.0, 100.0, 80.0));
        assert_eq!(grid.slot_rect(1), Rect::new(110.0, 0.0, 100.0, 80.0));
        assert_eq!(grid.slot_rect(3), Rect::new(110.0, 90.0, 100.0, 80.0));
    }

    #[test]
    fn test_plan_for_forward_move() {
        let idle = TransitionSet::new();
        let mut l = list(&["a", "b", "c", "d"]);
        let before = LayoutSnapshot::capture(&l, &row(), &idle);
        l.move_relative("a", "c").unwrap();
        let after = LayoutSnapshot::capture(&l, &row(), &idle);

        let plan = plan_transitions(&before, &after, &AnimationConfig::default());
        let ids: Vec<_> = plan.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["b", "c", "a"]);

        // `a` jumped from slot 0 to slot 2 and starts displaced back to slot 0
        let a = &plan[2];
        assert_eq!((a.dx, a.dy), (-220.0, 0.0));
        assert_eq!(a.duration_ms, 180.0);
        assert_eq!((plan[0].dx, plan[0].dy), (110.0, 0.0));
    }

    #[test]
    fn test_sub_threshold_moves_are_skipped() {
        let before = LayoutSnapshot::from_rects([
            ("a", Rect::new(0.0, 0.0, 10.0, 10.0)),
            ("b", Rect::new(20.0, 0.0, 10.0, 10.0)),
        ]);
        let after = LayoutSnapshot::from_rects([
            ("a", Rect::new(0.6, -0.9, 10.0, 10.0)),
            ("b", Rect::new(20.0, 1.0, 10.0, 10.0)),
            ("c", Rect::new(40.0, 0.0, 10.0, 10.0)),
        ]);

        let plan = plan_transitions(&before, &after, &AnimationConfig::default());
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].id, "b");
        assert_eq!(plan[0].dy, -1.0);
    }

    #[test]
    fn test_ease_curve() {
        assert_eq!(ease(0.0), 0.0);
        assert_eq!(ease(1.0), 1.0);
        let mid = ease(0.5);
        // CSS ease is front-loaded
        assert!(mid > 0.75 && mid < 0.85, "ease(0.5) = {mid}");
        assert!(ease(0.25) < ease(0.5));
    }

    #[test]
    fn test_transition_set_plays_and_cleans_up() {
        let mut set = TransitionSet::new();
        set.start(
            vec![MoveTransition {
                id: "a".into(),
                dx: -220.0,
                dy: 0.0,
                duration_ms: 180.0,
            }],
            1000.0,
        );

        assert_eq!(set.visual_offset("a"), (-220.0, 0.0));
        assert_eq!(set.visual_offset("b"), (0.0, 0.0));

        assert!(set.advance(1090.0));
        let (dx, _) = set.visual_offset("a");
        assert!(dx > -220.0 && dx < 0.0);

        assert!(!set.advance(1180.0));
        assert!(set.is_idle());
        assert_eq!(set.visual_offset("a"), (0.0, 0.0));
    }

    #[test]
    fn test_restart_replaces_running_transition() {
        let mut set = TransitionSet::new();
        let t = |dx| MoveTransition {
            id: "a".into(),
            dx,
            dy: 0.0,
            duration_ms: 180.0,
        };
        set.start(vec![t(100.0)], 0.0);
        set.start(vec![t(50.0)], 60.0);
        assert_eq!(set.len(), 1);
        assert_eq!(set.visual_offset("a"), (50.0, 0.0));
    }

    #[test]
    fn test_capture_includes_in_flight_offset() {
        let mut set = TransitionSet::new();
        set.start(
            vec![MoveTransition {
                id: "b".into(),
                dx: 40.0,
                dy: -8.0,
                duration_ms: 180.0,
            }],
            0.0,
        );
        let snapshot = LayoutSnapshot::capture(&list(&["a", "b"]), &row(), &set);
        assert_eq!(snapshot.get("b"), Some(&Rect::new(150.0, -8.0, 100.0, 80.0)));
        assert_eq!(snapshot.get("a"), Some(&Rect::new(0.0, 0.0, 100.0, 80.0)));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn ease_is_monotonic(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(ease(lo) <= ease(hi) + 1e-6);
        }

        #[test]
        fn planned_deltas_exceed_threshold(
            dx in -5.0f64..5.0,
            dy in -5.0f64..5.0,
        ) {
            let before = LayoutSnapshot::from_rects([("x", Rect::new(0.0, 0.0, 1.0, 1.0))]);
            let after = LayoutSnapshot::from_rects([("x", Rect::new(-dx, -dy, 1.0, 1.0))]);
            let plan = plan_transitions(&before, &after, &AnimationConfig::default());
            if dx.abs() < 1.0 && dy.abs() < 1.0 {
                prop_assert!(plan.is_empty());
            } else {
                prop_assert_eq!(plan.len(), 1);
                prop_assert!((plan[0].dx - dx).abs() < 1e-9);
                prop_assert!((plan[0].dy - dy).abs() < 1e-9);
            }
        }
    }
}
