//! ECS resources made available to systems.
//!
//! Overview
//! - `actionscheduler` – action lists keyed by update phase (non-send)
//! - `fixedclock` – accumulator turning frame time into fixed steps
//! - `schedulerconfig` – INI-backed scheduler and dynamics settings
//! - `signalbridge` – channel carrying action signals into the world
//! - `worldtime` – simulation time and delta
pub mod actionscheduler;
pub mod fixedclock;
pub mod schedulerconfig;
pub mod signalbridge;
pub mod worldtime;
