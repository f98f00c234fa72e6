//! Cadence library.
//!
//! Frame-stepped action lists for game logic, plus the ECS glue that drives
//! them from a bevy world.
//!
//! - [`actions`] – the [`Action`](actions::Action) trait, lifecycle and leaf actions
//! - [`actionlist`] – the double-buffered sequencer
//! - [`dynamics`] – second-order dynamics solver
//! - [`events`] – messages emitted into the world
//! - [`resources`] – ECS resources (scheduler, clocks, config)
//! - [`systems`] – ECS systems
//! - [`bitset`], [`playhead`], [`recycler`], [`value`] – supporting types

pub mod actionlist;
pub mod actions;
pub mod bitset;
pub mod dynamics;
pub mod events;
pub mod playhead;
pub mod recycler;
pub mod resources;
pub mod systems;
pub mod value;
