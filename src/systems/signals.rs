//! Bridge systems for [`ActionSignal`]s.
//!
//! [`poll_action_signals`] drains the [`SignalBridge`] channel into the ECS
//! [`Messages<ActionSignal>`] mailbox; [`update_action_signal_messages`]
//! advances that mailbox once per frame. Run them in this order after the
//! action list systems; [`log_action_signals`] reads what was delivered.

use bevy_ecs::prelude::*;
use log::info;

use crate::events::actionsignal::ActionSignal;
use crate::resources::signalbridge::SignalBridge;

/// Move every signal sent since the last frame into the message queue.
pub fn poll_action_signals(bridge: Res<SignalBridge>, mut writer: MessageWriter<ActionSignal>) {
    writer.write_batch(bridge.rx.try_iter());
}

/// Advance the [`ActionSignal`] message queue.
pub fn update_action_signal_messages(mut messages: ResMut<Messages<ActionSignal>>) {
    messages.update();
}

/// Log every signal delivered this frame.
pub fn log_action_signals(mut reader: MessageReader<ActionSignal>) {
    for signal in reader.read() {
        match &signal.payload {
            Some(payload) => info!("signal '{}' with {:?}", signal.name, payload),
            None => info!("signal '{}'", signal.name),
        }
    }
}
