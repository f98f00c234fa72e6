//! Double-buffered, frame-stepped action sequencer.
//!
//! An [`ActionList`] owns two buffers of [`ScheduledAction`]s. Between
//! updates every live action sits in the *back* buffer, which is also where
//! [`push`](ActionList::push) appends. Each [`update`](ActionList::update):
//!
//! 1. swaps the buffers, so the pending actions become the *front* buffer
//! 2. clears the blocked-groups set and the new back buffer
//! 3. scales `dt` by the list's multiplier (and the global time scale unless
//!    the list ignores it)
//! 4. walks the front buffer in push order, processing every action whose
//!    groups are not blocked so far this frame
//! 5. requeues every action that is not done into the back buffer and adds
//!    its blocking groups to the blocked set
//!
//! Actions spawned while the walk is running land in the back buffer, so they
//! first run next frame and never invalidate the walk.
//!
//! # Group blocking
//!
//! Blocking only looks backwards: an action can suppress later actions of
//! the same pass but never an earlier one. A suppressed action is kept alive
//! and still contributes its own blocking groups.
//!
//! # Reversal
//!
//! When an action asks for a reversal during the walk, the walk stops right
//! after that action. The unprocessed remainder is carried over untouched,
//! then the whole back buffer is reversed in order and every action in it
//! flips direction.

use log::debug;

use crate::actions::{Action, ScheduledAction};
use crate::bitset::Bitset;

/// Step used by [`ActionList::fast_forward`], large enough to finish any
/// timed action in one pass.
pub const FAST_FORWARD_SECONDS: f64 = 1.0e12;

pub struct ActionList {
    buffers: [Vec<ScheduledAction>; 2],
    /// Index of the buffer being walked.
    front: usize,
    blocked_groups: Bitset,
    delta_multiplier: f64,
    ignore_time_scale: bool,
    dirty_by_reverse: bool,
    frame: u64,
}

impl Default for ActionList {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionList {
    pub fn new() -> Self {
        Self {
            buffers: [Vec::new(), Vec::new()],
            front: 0,
            blocked_groups: Bitset::new(),
            delta_multiplier: 1.0,
            ignore_time_scale: false,
            dirty_by_reverse: false,
            frame: 0,
        }
    }

    /// Scale every `dt` this list receives by `multiplier` (clamped to `>= 0`).
    pub fn with_delta_multiplier(mut self, multiplier: f64) -> Self {
        self.set_delta_multiplier(multiplier);
        self
    }

    /// Ignore the global time scale passed to
    /// [`update_with_time_scale`](Self::update_with_time_scale).
    pub fn ignoring_time_scale(mut self, ignore: bool) -> Self {
        self.ignore_time_scale = ignore;
        self
    }

    pub fn set_delta_multiplier(&mut self, multiplier: f64) {
        self.delta_multiplier = multiplier.max(0.0);
    }

    pub fn delta_multiplier(&self) -> f64 {
        self.delta_multiplier
    }

    pub fn set_ignore_time_scale(&mut self, ignore: bool) {
        self.ignore_time_scale = ignore;
    }

    pub fn ignores_time_scale(&self) -> bool {
        self.ignore_time_scale
    }

    #[inline]
    fn back(&self) -> usize {
        self.front ^ 1
    }

    /// Append an action to run from the next update on.
    pub fn push(&mut self, action: ScheduledAction) {
        let back = self.back();
        self.buffers[back].push(action);
    }

    /// Wrap and append a plain [`Action`].
    pub fn push_action(&mut self, action: impl Action + 'static) {
        self.push(ScheduledAction::new(action));
    }

    /// Insert an action ahead of every pending one.
    pub fn push_front(&mut self, action: ScheduledAction) {
        let back = self.back();
        self.buffers[back].insert(0, action);
    }

    /// Number of pending actions.
    pub fn len(&self) -> usize {
        self.buffers[self.back()].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pending actions in the order they will run.
    pub fn iter(&self) -> impl Iterator<Item = &ScheduledAction> {
        self.buffers[self.back()].iter()
    }

    /// Groups blocked by the last update.
    pub fn blocked_groups(&self) -> &Bitset {
        &self.blocked_groups
    }

    /// `true` if a reversal interrupted the last update (or happened since).
    pub fn is_dirty_by_reverse(&self) -> bool {
        self.dirty_by_reverse
    }

    /// Number of updates run so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Discard every pending action. Entered actions get their `exit` hook.
    pub fn clear(&mut self) {
        for buffer in self.buffers.iter_mut() {
            for mut action in buffer.drain(..) {
                action.discard();
            }
        }
    }

    /// Advance one frame with no global time scale.
    pub fn update(&mut self, dt: f64) {
        self.update_with_time_scale(dt, 1.0);
    }

    /// Advance one frame. `time_scale` is honoured unless the list ignores it.
    pub fn update_with_time_scale(&mut self, dt: f64, time_scale: f64) {
        let scale = if self.ignore_time_scale { 1.0 } else { time_scale };
        self.step(dt * self.delta_multiplier * scale);
    }

    /// Run one update with an effectively infinite `dt`, flushing every
    /// action that does not wait on an external condition.
    pub fn fast_forward(&mut self) {
        debug!("fast-forwarding {} actions", self.len());
        self.step(FAST_FORWARD_SECONDS);
    }

    /// Reverse the order of pending actions and flip each one's direction.
    pub fn reverse(&mut self) {
        let back = self.back();
        let buffer = &mut self.buffers[back];
        buffer.reverse();
        for action in buffer.iter_mut() {
            action.reverse();
        }
        self.dirty_by_reverse = true;
        debug!("reversed {} actions", buffer.len());
    }

    fn step(&mut self, dt: f64) {
        self.front = self.back();
        let back = self.back();
        self.blocked_groups.clear_all();
        self.buffers[back].clear();
        self.dirty_by_reverse = false;
        self.frame += 1;

        let mut front = std::mem::take(&mut self.buffers[self.front]);
        let mut execution_index = 0;
        let mut walk = front.drain(..).enumerate();

        while let Some((list_index, mut action)) = walk.next() {
            if action
                .participating_groups()
                .intersects(&self.blocked_groups)
            {
                self.blocked_groups.union_with(action.blocking_groups());
                self.buffers[back].push(action);
                continue;
            }

            let reverse_requested =
                action.process(dt, execution_index, list_index, &mut self.buffers[back]);
            execution_index += 1;

            if !action.is_done() {
                self.blocked_groups.union_with(action.blocking_groups());
                self.buffers[back].push(action);
            }

            if reverse_requested {
                self.buffers[back].extend(walk.by_ref().map(|(_, a)| a));
                self.reverse();
                break;
            }
        }
        drop(walk);

        // Hand the emptied buffer back so its capacity is reused.
        self.buffers[self.front] = front;
    }
}

impl std::fmt::Debug for ActionList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionList")
            .field("pending", &self.buffers[self.back()])
            .field("blocked_groups", &self.blocked_groups)
            .field("delta_multiplier", &self.delta_multiplier)
            .field("ignore_time_scale", &self.ignore_time_scale)
            .field("frame", &self.frame)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::instant::FunctionCaller;
    use crate::actions::timed::{Looper, Wait};
    use crate::actions::{ActionContext, Span};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    type Trace = Rc<RefCell<Vec<&'static str>>>;

    /// Logs its name every frame it is processed.
    struct Tracer {
        name: &'static str,
        span: Span,
        trace: Trace,
    }

    impl Action for Tracer {
        fn span(&self) -> Span {
            self.span
        }
        fn update(&mut self, _progress: f64, _ctx: &mut ActionContext<'_>) {
            self.trace.borrow_mut().push(self.name);
        }
    }

    fn tracer(name: &'static str, span: Span, trace: &Trace) -> ScheduledAction {
        ScheduledAction::new(Tracer {
            name,
            span,
            trace: Rc::clone(trace),
        })
    }

    #[test]
    fn processes_in_push_order_and_requeues_live_actions() {
        let trace: Trace = Rc::default();
        let mut list = ActionList::new();
        list.push(tracer("a", Span::Indefinite, &trace));
        list.push(tracer("b", Span::Instant, &trace));
        list.push(tracer("c", Span::Indefinite, &trace));

        list.update(0.1);
        assert_eq!(*trace.borrow(), vec!["a", "b", "c"]);
        assert_eq!(list.len(), 2);
        assert!(list.iter().all(|a| (a.elapsed() - 0.1).abs() < 1e-9));

        trace.borrow_mut().clear();
        list.update(0.1);
        assert_eq!(*trace.borrow(), vec!["a", "c"]);
    }

    #[test]
    fn push_front_runs_first() {
        let trace: Trace = Rc::default();
        let mut list = ActionList::new();
        list.push(tracer("late", Span::Instant, &trace));
        list.push_front(tracer("early", Span::Instant, &trace));
        list.update(0.1);
        assert_eq!(*trace.borrow(), vec!["early", "late"]);
        assert!(list.is_empty());
    }

    #[test]
    fn blocking_only_affects_later_actions() {
        let trace: Trace = Rc::default();
        let mut list = ActionList::new();
        list.push(tracer("before", Span::Indefinite, &trace).in_groups(&[3]));
        list.push(tracer("blocker", Span::Indefinite, &trace).blocking(&[3]));
        list.push(tracer("after", Span::Indefinite, &trace).in_groups(&[3]));
        list.push(tracer("other", Span::Indefinite, &trace).in_groups(&[4]));

        list.update(0.1);
        assert_eq!(*trace.borrow(), vec!["before", "blocker", "other"]);
        assert!(list.blocked_groups().get(3));
        // Skipped actions stay alive.
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn finished_blocker_releases_group_next_frame() {
        let trace: Trace = Rc::default();
        let mut list = ActionList::new();
        list.push(ScheduledAction::new(Wait::new(1.0)).blocking(&[0]));
        list.push(tracer("gated", Span::Indefinite, &trace).in_groups(&[0]));

        list.update(0.5);
        assert!(trace.borrow().is_empty());
        list.update(0.5);
        // Wait finished this frame, so it no longer blocks.
        assert_eq!(*trace.borrow(), vec!["gated"]);
    }

    #[test]
    fn execution_index_skips_blocked_actions() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut list = ActionList::new();
        list.push(ScheduledAction::new(Wait::new(10.0)).blocking(&[1]));
        list.push(ScheduledAction::new(Wait::new(10.0)).in_groups(&[1]));
        let s = Rc::clone(&seen);
        list.push_action(Looper::new(move |ctx, _| {
            s.borrow_mut()
                .push((ctx.execution_index(), ctx.list_index()));
        }));
        list.update(0.1);
        assert_eq!(*seen.borrow(), vec![(1, 2)]);
    }

    #[test]
    fn spawned_actions_run_next_frame() {
        let trace: Trace = Rc::default();
        let mut list = ActionList::new();
        let t = Rc::clone(&trace);
        list.push_action(Looper::new(move |ctx, _| {
            t.borrow_mut().push("parent");
            ctx.push(tracer("child", Span::Instant, &t));
            ctx.finish();
        }));
        list.update(0.1);
        assert_eq!(*trace.borrow(), vec!["parent"]);
        assert_eq!(list.len(), 1);
        list.update(0.1);
        assert_eq!(*trace.borrow(), vec!["parent", "child"]);
        assert!(list.is_empty());
    }

    #[test]
    fn delta_multiplier_and_time_scale() {
        let mut list = ActionList::new().with_delta_multiplier(2.0);
        list.push(ScheduledAction::new(Wait::new(10.0)));
        list.update_with_time_scale(1.0, 0.5);
        assert!((list.iter().next().unwrap().elapsed() - 1.0).abs() < 1e-9);

        let mut unscaled = ActionList::new().ignoring_time_scale(true);
        unscaled.push(ScheduledAction::new(Wait::new(10.0)));
        unscaled.update_with_time_scale(1.0, 0.0);
        assert!((unscaled.iter().next().unwrap().elapsed() - 1.0).abs() < 1e-9);

        let mut frozen = ActionList::new().with_delta_multiplier(-3.0);
        assert_eq!(frozen.delta_multiplier(), 0.0);
        frozen.push(ScheduledAction::new(Wait::new(1.0)));
        frozen.update(5.0);
        assert_eq!(frozen.len(), 1);
    }

    #[test]
    fn fast_forward_flushes_timed_but_not_conditional() {
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let mut list = ActionList::new();
        list.push(ScheduledAction::new(Wait::new(3600.0)).with_delay(60.0));
        list.push_action(FunctionCaller::new(move || h.set(h.get() + 1)));
        list.push_action(Looper::new(|_, _| {}));
        list.fast_forward();
        assert_eq!(hits.get(), 1);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn reverse_request_interrupts_the_walk() {
        let trace: Trace = Rc::default();
        let mut list = ActionList::new();
        let t = Rc::clone(&trace);
        let mut asked = false;
        list.push(ScheduledAction::new(Looper::timed(5.0, move |ctx, _| {
            t.borrow_mut().push("a");
            if !asked {
                asked = true;
                ctx.reverse_list();
            }
        })));
        list.push(tracer("b", Span::seconds(5.0), &trace));
        list.push(tracer("c", Span::seconds(5.0), &trace));

        list.update(1.0);
        assert_eq!(*trace.borrow(), vec!["a"]);
        assert!(list.is_dirty_by_reverse());
        assert!(list.iter().all(|a| a.is_reversed()));
        assert_eq!(list.len(), 3);
        let firsts: Vec<_> = list.iter().map(|a| a.has_entered()).collect();
        assert_eq!(firsts, vec![false, false, true]);

        // b and c never started, so unwinding retires them silently; a unwinds.
        list.update(0.5);
        assert_eq!(*trace.borrow(), vec!["a", "a"]);
        assert_eq!(list.len(), 1);
        assert!(!list.is_dirty_by_reverse());
        list.update(0.5);
        assert!(list.is_empty());
    }

    #[test]
    fn clear_runs_exit_for_entered_actions() {
        let exits = Rc::new(Cell::new(0));

        struct Exiting(Rc<Cell<i32>>);
        impl Action for Exiting {
            fn update(&mut self, _progress: f64, _ctx: &mut ActionContext<'_>) {}
            fn exit(&mut self, _ctx: &mut ActionContext<'_>) {
                self.0.set(self.0.get() + 1);
            }
        }

        let mut list = ActionList::new();
        list.push_action(Exiting(Rc::clone(&exits)));
        list.push(ScheduledAction::new(Exiting(Rc::clone(&exits))).with_delay(10.0));
        list.update(0.1);
        list.clear();
        assert!(list.is_empty());
        assert_eq!(exits.get(), 1);
    }
}
