//! Signals emitted by actions.
//!
//! [`SignalEmitter`](crate::actions::signal::SignalEmitter) actions send an
//! [`ActionSignal`] through the [`SignalBridge`](crate::resources::signalbridge::SignalBridge)
//! channel. The [`poll_action_signals`](crate::systems::signals::poll_action_signals)
//! system moves them into the ECS message queue so any system can read them
//! with a `MessageReader<ActionSignal>`.

use bevy_ecs::message::Message;

use crate::value::Value;

/// A named notification with an optional payload.
#[derive(Message, Debug, Clone, PartialEq)]
pub struct ActionSignal {
    pub name: String,
    pub payload: Option<Value>,
}

impl ActionSignal {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: impl Into<Value>) -> Self {
        self.payload = Some(payload.into());
        self
    }
}
