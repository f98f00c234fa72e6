//! Instant action that emits an [`ActionSignal`].

use crossbeam_channel::Sender;
use log::warn;

use super::{Action, ActionContext, Span};
use crate::events::actionsignal::ActionSignal;

/// Sends a signal once when processed.
///
/// A disconnected receiver is logged and otherwise ignored; the action still
/// completes.
pub struct SignalEmitter {
    sender: Sender<ActionSignal>,
    signal: ActionSignal,
}

impl SignalEmitter {
    pub fn new(sender: Sender<ActionSignal>, signal: ActionSignal) -> Self {
        Self { sender, signal }
    }
}

impl Action for SignalEmitter {
    fn span(&self) -> Span {
        Span::Instant
    }

    fn update(&mut self, _progress: f64, _ctx: &mut ActionContext<'_>) {
        if self.sender.send(self.signal.clone()).is_err() {
            warn!(
                "signal '{}' dropped: no receiver connected",
                self.signal.name
            );
        }
    }

    fn label(&self) -> &str {
        &self.signal.name
    }
}
