//! Scheduler systems.
//!
//! Submodules overview
//! - [`actionlist`] – drive registered action lists from the frame and fixed phases
//! - [`signals`] – forward action signals into the ECS message queue
//! - [`time`] – update simulation time and delta

pub mod actionlist;
pub mod signals;
pub mod time;
