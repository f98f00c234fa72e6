//! Indefinite and timed actions: updated every frame until done.

use super::{Action, ActionContext, Span};

type LoopCallback = Box<dyn FnMut(&mut ActionContext<'_>, f64)>;

/// Calls a closure every live frame with the context and progress.
///
/// Indefinite by default; the closure ends it with
/// [`ActionContext::finish`]. [`Looper::timed`] bounds it instead.
pub struct Looper {
    span: Span,
    callback: LoopCallback,
}

impl Looper {
    pub fn new(callback: impl FnMut(&mut ActionContext<'_>, f64) + 'static) -> Self {
        Self {
            span: Span::Indefinite,
            callback: Box::new(callback),
        }
    }

    pub fn timed(
        seconds: f64,
        callback: impl FnMut(&mut ActionContext<'_>, f64) + 'static,
    ) -> Self {
        Self {
            span: Span::seconds(seconds),
            callback: Box::new(callback),
        }
    }
}

impl Action for Looper {
    fn span(&self) -> Span {
        self.span
    }

    fn update(&mut self, progress: f64, ctx: &mut ActionContext<'_>) {
        (self.callback)(ctx, progress);
    }

    fn label(&self) -> &str {
        "looper"
    }
}

/// Does nothing for a fixed time. Pair with
/// [`blocking`](super::ScheduledAction::blocking) to hold back other groups.
#[derive(Debug, Clone, Copy)]
pub struct Wait {
    seconds: f64,
}

impl Wait {
    pub fn new(seconds: f64) -> Self {
        Self { seconds }
    }
}

impl Action for Wait {
    fn span(&self) -> Span {
        Span::seconds(self.seconds)
    }

    fn update(&mut self, _progress: f64, _ctx: &mut ActionContext<'_>) {}

    fn label(&self) -> &str {
        "wait"
    }
}

/// Finishes the first frame its predicate holds.
pub struct Condition {
    predicate: Box<dyn FnMut() -> bool>,
}

impl Condition {
    pub fn new(predicate: impl FnMut() -> bool + 'static) -> Self {
        Self {
            predicate: Box::new(predicate),
        }
    }
}

impl Action for Condition {
    fn update(&mut self, _progress: f64, ctx: &mut ActionContext<'_>) {
        if (self.predicate)() {
            ctx.finish();
        }
    }

    fn label(&self) -> &str {
        "condition"
    }
}
