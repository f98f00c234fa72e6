//! Channel between signal-emitting actions and the ECS world.
//!
//! Create the bridge with [`setup_signal_bridge`], hand clones of
//! [`SignalBridge::sender`] to [`SignalEmitter`](crate::actions::signal::SignalEmitter)
//! actions, and schedule
//! [`poll_action_signals`](crate::systems::signals::poll_action_signals)
//! to forward what they send into `Messages<ActionSignal>`.

use bevy_ecs::prelude::*;
use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::events::actionsignal::ActionSignal;

#[derive(Resource)]
pub struct SignalBridge {
    pub tx: Sender<ActionSignal>,
    pub rx: Receiver<ActionSignal>,
}

impl SignalBridge {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// A sender for a new emitter.
    pub fn sender(&self) -> Sender<ActionSignal> {
        self.tx.clone()
    }
}

impl Default for SignalBridge {
    fn default() -> Self {
        Self::new()
    }
}

/// Insert a [`SignalBridge`] and the `Messages<ActionSignal>` queue.
pub fn setup_signal_bridge(world: &mut World) {
    world.insert_resource(SignalBridge::new());
    world.insert_resource(Messages::<ActionSignal>::default());
}
