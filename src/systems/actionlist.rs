//! Systems that drive registered action lists.
//!
//! - [`update_frame_action_lists`] – runs [`UpdatePhase::Frame`] lists once
//!   per frame with the frame delta
//! - [`update_fixed_action_lists`] – runs [`UpdatePhase::Fixed`] lists once
//!   per fixed step accumulated in [`FixedClock`]
//!
//! Both pass the unscaled delta together with the world time scale, so each
//! list decides whether the time scale applies to it.
//!
//! # Example Schedule Setup
//!
//! ```ignore
//! schedule.add_systems((update_fixed_action_lists, update_frame_action_lists).chain());
//! ```

use bevy_ecs::prelude::*;

use crate::resources::actionscheduler::{ActionScheduler, UpdatePhase};
use crate::resources::fixedclock::FixedClock;
use crate::resources::worldtime::WorldTime;

/// Advance every frame-phase list by the world delta.
pub fn update_frame_action_lists(
    world_time: Res<WorldTime>,
    mut scheduler: NonSendMut<ActionScheduler>,
) {
    scheduler.update_phase(
        UpdatePhase::Frame,
        world_time.unscaled_delta,
        world_time.time_scale,
    );
}

/// Advance every fixed-phase list once per due fixed step.
pub fn update_fixed_action_lists(
    world_time: Res<WorldTime>,
    mut clock: ResMut<FixedClock>,
    mut scheduler: NonSendMut<ActionScheduler>,
) {
    let steps = clock.accumulate(world_time.unscaled_delta);
    let timestep = clock.timestep;
    for _ in 0..steps {
        scheduler.update_phase(UpdatePhase::Fixed, timestep, world_time.time_scale);
    }
}
