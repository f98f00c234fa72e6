//! Accumulator for fixed-rate update phases.
//!
//! Frame deltas are added to an accumulator; every whole `timestep` it holds
//! becomes one fixed step. The remainder carries over to the next frame.

use bevy_ecs::prelude::Resource;

/// Upper bound on fixed steps per frame, so a long stall cannot snowball.
pub const MAX_STEPS_PER_FRAME: u32 = 8;

#[derive(Resource, Clone, Copy, Debug)]
pub struct FixedClock {
    pub timestep: f64,
    accumulator: f64,
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::new(1.0 / 60.0)
    }
}

impl FixedClock {
    /// # Panics
    ///
    /// Panics if `timestep` is not positive.
    pub fn new(timestep: f64) -> Self {
        assert!(timestep > 0.0, "fixed timestep must be positive");
        Self {
            timestep,
            accumulator: 0.0,
        }
    }

    /// Add `dt` and return how many fixed steps are due.
    pub fn accumulate(&mut self, dt: f64) -> u32 {
        self.accumulator += dt.max(0.0);
        let mut steps = 0;
        while self.accumulator >= self.timestep && steps < MAX_STEPS_PER_FRAME {
            self.accumulator -= self.timestep;
            steps += 1;
        }
        if steps == MAX_STEPS_PER_FRAME {
            // Drop the backlog instead of spiralling.
            self.accumulator = self.accumulator.min(self.timestep);
        }
        steps
    }

    /// Fraction of a step waiting in the accumulator.
    pub fn overstep(&self) -> f64 {
        self.accumulator / self.timestep
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_whole_steps() {
        let mut clock = FixedClock::new(0.25);
        assert_eq!(clock.accumulate(0.1), 0);
        assert_eq!(clock.accumulate(0.2), 1);
        assert!((clock.overstep() - 0.2).abs() < 1e-9);
        assert_eq!(clock.accumulate(0.5), 2);
    }

    #[test]
    fn caps_steps_per_frame() {
        let mut clock = FixedClock::new(0.01);
        assert_eq!(clock.accumulate(10.0), MAX_STEPS_PER_FRAME);
        assert!(clock.overstep() <= 1.0);
    }
}
