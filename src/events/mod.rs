//! Event types exchanged between the scheduler and the ECS world.
//!
//! Submodules:
//! - [`actionsignal`] – named signals emitted by actions

pub mod actionsignal;
