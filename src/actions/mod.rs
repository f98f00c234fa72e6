//! Actions: schedulable units of game logic.
//!
//! An [`Action`] supplies behavior through four hooks (`enter`, `update`,
//! `exit`, `on_reverse`). The lifecycle around those hooks is owned by
//! [`ScheduledAction`], the entry an [`ActionList`](crate::actionlist::ActionList)
//! stores:
//!
//! ```text
//! Idle ──(delay elapsed)──▶ Entered ──(update every live frame)──▶ Exited
//!                              ▲  │
//!                              └──┘ reverse() flips the direction
//! ```
//!
//! # Timing
//!
//! Every action declares a [`Span`]:
//! - [`Span::Instant`] – zero duration; entering finishes it, so `update`
//!   runs exactly once and the action retires the same frame
//! - [`Span::Finite`] – done once the time past the delay reaches the duration
//! - [`Span::Indefinite`] – runs until something calls
//!   [`ActionContext::finish`]
//!
//! A reversed action runs its clock backwards and is done once it unwinds to
//! zero.
//!
//! # Leaf actions
//!
//! - [`instant`] – [`FunctionCaller`](instant::FunctionCaller), [`Setter`](instant::Setter)
//! - [`timed`] – [`Looper`](timed::Looper), [`Wait`](timed::Wait), [`Condition`](timed::Condition)
//! - [`interpolator`] – eased tweens of a [`ValueRef`](crate::value::ValueRef)
//! - [`signal`] – [`SignalEmitter`](signal::SignalEmitter)
//! - [`second_order`] – a [`SecondOrderDynamics`](crate::dynamics::SecondOrderDynamics) follower

pub mod instant;
pub mod interpolator;
pub mod second_order;
pub mod signal;
pub mod timed;

use log::debug;

use crate::bitset::Bitset;
use crate::playhead::Playhead;

/// Declared lifetime of an action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Span {
    Instant,
    Finite(Playhead),
    Indefinite,
}

impl Span {
    pub fn seconds(seconds: f64) -> Self {
        Span::Finite(Playhead::from_seconds(seconds.max(0.0)))
    }
}

/// Per-call view handed to action hooks.
///
/// Hooks use it to read timing, finish themselves, spawn follow-up actions
/// into the owning list's next frame, or ask the owning list to reverse.
pub struct ActionContext<'a> {
    dt: f64,
    execution_index: usize,
    list_index: usize,
    elapsed: f64,
    reversed: bool,
    finish_requested: bool,
    reverse_requested: bool,
    spawned: &'a mut Vec<ScheduledAction>,
}

impl<'a> ActionContext<'a> {
    pub fn new(
        dt: f64,
        execution_index: usize,
        list_index: usize,
        elapsed: f64,
        reversed: bool,
        spawned: &'a mut Vec<ScheduledAction>,
    ) -> Self {
        Self {
            dt,
            execution_index,
            list_index,
            elapsed,
            reversed,
            finish_requested: false,
            reverse_requested: false,
            spawned,
        }
    }

    /// Scaled frame delta in seconds.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// How many actions the list processed before this one this frame.
    pub fn execution_index(&self) -> usize {
        self.execution_index
    }

    /// Position of this action in the list this frame.
    pub fn list_index(&self) -> usize {
        self.list_index
    }

    /// Seconds since the delay ended.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// Mark the action done; it exits at the end of this call.
    pub fn finish(&mut self) {
        self.finish_requested = true;
    }

    pub fn is_finish_requested(&self) -> bool {
        self.finish_requested
    }

    /// Ask the owning list to reverse once this action has been processed.
    /// The rest of the current frame is skipped.
    pub fn reverse_list(&mut self) {
        self.reverse_requested = true;
    }

    pub fn is_reverse_requested(&self) -> bool {
        self.reverse_requested
    }

    /// Queue `action` for the owning list's next frame.
    pub fn push(&mut self, action: ScheduledAction) {
        self.spawned.push(action);
    }
}

/// Behavior hooks of a schedulable action.
pub trait Action {
    /// Declared lifetime. Read once when the action is scheduled.
    fn span(&self) -> Span {
        Span::Indefinite
    }

    /// Called once on the first frame after the delay.
    fn enter(&mut self, _ctx: &mut ActionContext<'_>) {}

    /// Called every live frame with progress in `[0, 1]`.
    fn update(&mut self, progress: f64, ctx: &mut ActionContext<'_>);

    /// Called once when the action is done or discarded after entering.
    fn exit(&mut self, _ctx: &mut ActionContext<'_>) {}

    /// Called whenever the direction flips.
    fn on_reverse(&mut self, _reversed: bool) {}

    /// Name used in log output.
    fn label(&self) -> &str {
        "action"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Entered,
    Exited,
}

/// An [`Action`] together with its scheduling state.
pub struct ScheduledAction {
    behavior: Box<dyn Action>,
    span: Span,
    delay: Playhead,
    participating_groups: Bitset,
    blocking_groups: Bitset,
    time_passed: Playhead,
    /// High-water mark of `time_passed`, used as the duration of indefinite
    /// actions when they unwind.
    farthest: Playhead,
    stage: Stage,
    done: bool,
    reversed: bool,
}

impl ScheduledAction {
    pub fn new(action: impl Action + 'static) -> Self {
        Self::from_box(Box::new(action))
    }

    pub fn from_box(behavior: Box<dyn Action>) -> Self {
        Self {
            span: behavior.span(),
            behavior,
            delay: Playhead::ZERO,
            participating_groups: Bitset::new(),
            blocking_groups: Bitset::new(),
            time_passed: Playhead::ZERO,
            farthest: Playhead::ZERO,
            stage: Stage::Idle,
            done: false,
            reversed: false,
        }
    }

    /// Wait `seconds` before entering.
    pub fn with_delay(mut self, seconds: f64) -> Self {
        self.delay = Playhead::from_seconds(seconds.max(0.0));
        self
    }

    /// Override the duration of a finite action. Instant actions stay pinned
    /// at zero and indefinite actions derive their length from processing, so
    /// both ignore this.
    pub fn lasts(mut self, seconds: f64) -> Self {
        if let Span::Finite(_) = self.span {
            self.span = Span::seconds(seconds);
        }
        self
    }

    /// Groups this action belongs to.
    pub fn in_groups(mut self, groups: &[usize]) -> Self {
        self.participating_groups = Bitset::from_bits(groups);
        self
    }

    /// Groups this action suppresses while it is alive.
    pub fn blocking(mut self, groups: &[usize]) -> Self {
        self.blocking_groups = Bitset::from_bits(groups);
        self
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn delay(&self) -> f64 {
        self.delay.elapsed()
    }

    pub fn participating_groups(&self) -> &Bitset {
        &self.participating_groups
    }

    pub fn blocking_groups(&self) -> &Bitset {
        &self.blocking_groups
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn has_entered(&self) -> bool {
        self.stage != Stage::Idle
    }

    pub fn has_exited(&self) -> bool {
        self.stage == Stage::Exited
    }

    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    pub fn label(&self) -> &str {
        self.behavior.label()
    }

    /// Seconds since the delay ended (negative while still delayed).
    pub fn elapsed(&self) -> f64 {
        self.time_passed.seconds_since(&self.delay)
    }

    /// Declared duration, or for indefinite actions the farthest point
    /// reached so far.
    pub fn duration(&self) -> f64 {
        match self.span {
            Span::Instant => 0.0,
            Span::Finite(d) => d.elapsed(),
            Span::Indefinite => self.farthest.seconds_since(&self.delay).max(0.0),
        }
    }

    /// Interpolation fraction for the current elapsed time.
    pub fn progress(&self) -> f64 {
        let duration = self.duration();
        if duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed() / duration).clamp(0.0, 1.0)
    }

    /// Force the action done on its next check.
    pub fn finish(&mut self) {
        self.done = true;
    }

    pub fn is_done(&self) -> bool {
        if self.done || self.stage == Stage::Exited {
            return true;
        }
        let elapsed = self.elapsed();
        if self.reversed {
            return self.has_entered() && elapsed <= 0.0;
        }
        match self.span {
            Span::Instant => false,
            Span::Finite(d) => self.has_entered() && elapsed >= d.elapsed(),
            Span::Indefinite => false,
        }
    }

    /// Flip the direction of time for this action.
    pub fn reverse(&mut self) {
        if self.stage == Stage::Exited {
            return;
        }
        self.reversed = !self.reversed;
        self.behavior.on_reverse(self.reversed);
    }

    /// Advance by `dt` and run whichever hooks are due.
    ///
    /// Actions spawned by hooks are appended to `spawned`. Returns `true`
    /// when a hook asked the owning list to reverse.
    pub fn process(
        &mut self,
        dt: f64,
        execution_index: usize,
        list_index: usize,
        spawned: &mut Vec<ScheduledAction>,
    ) -> bool {
        if self.stage == Stage::Exited {
            return false;
        }

        self.time_passed.advance(dt, self.reversed);
        if self.time_passed > self.farthest {
            self.farthest = self.time_passed;
        }
        let elapsed = self.elapsed();

        if self.stage == Stage::Idle {
            if self.reversed && elapsed <= 0.0 {
                // Unwound before it ever started: nothing to undo.
                self.done = true;
                self.stage = Stage::Exited;
                return false;
            }
            if elapsed < 0.0 {
                return false;
            }
        }

        let mut ctx = ActionContext::new(
            dt,
            execution_index,
            list_index,
            elapsed,
            self.reversed,
            spawned,
        );

        if self.stage == Stage::Idle {
            self.stage = Stage::Entered;
            if self.span == Span::Instant {
                ctx.finish();
            }
            debug!("{}: enter", self.behavior.label());
            self.behavior.enter(&mut ctx);
        }

        let progress = self.progress();
        self.behavior.update(progress, &mut ctx);

        if ctx.finish_requested {
            self.done = true;
        }
        if self.is_done() {
            self.behavior.exit(&mut ctx);
            self.stage = Stage::Exited;
            debug!("{}: exit", self.behavior.label());
        }
        ctx.reverse_requested
    }

    /// Drop the action early, running `exit` if it had entered.
    /// Anything spawned from `exit` is discarded too.
    pub fn discard(&mut self) {
        if self.stage == Stage::Entered {
            let mut sink = Vec::new();
            let mut ctx =
                ActionContext::new(0.0, 0, 0, self.elapsed(), self.reversed, &mut sink);
            self.behavior.exit(&mut ctx);
            debug!("{}: exit (discarded)", self.behavior.label());
        }
        self.done = true;
        self.stage = Stage::Exited;
    }
}

impl std::fmt::Debug for ScheduledAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduledAction")
            .field("label", &self.behavior.label())
            .field("span", &self.span)
            .field("delay", &self.delay.elapsed())
            .field("elapsed", &self.elapsed())
            .field("stage", &self.stage)
            .field("done", &self.done)
            .field("reversed", &self.reversed)
            .finish()
    }
}
