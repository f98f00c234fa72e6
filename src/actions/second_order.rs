//! Action that makes a value follow a target with second-order dynamics.
//!
//! Each frame the [`SecondOrder`] action reads the target (and optionally the
//! target's velocity), steps a [`SecondOrderDynamics`] system by the frame
//! delta and writes the system position to the output reference.

use super::{Action, ActionContext};
use crate::dynamics::{DynamicsParams, SecondOrderDynamics};
use crate::value::ValueRef;

#[derive(Debug)]
pub struct SecondOrder {
    params: DynamicsParams,
    target: ValueRef,
    target_velocity: Option<ValueRef>,
    output: ValueRef,
    solver: Option<SecondOrderDynamics>,
    settle_tolerance: Option<f64>,
}

impl SecondOrder {
    /// Follow `target`, writing into `output`. The system starts at rest at
    /// the output's value when the action enters.
    pub fn new(params: DynamicsParams, target: ValueRef, output: ValueRef) -> Self {
        Self {
            params,
            target,
            target_velocity: None,
            output,
            solver: None,
            settle_tolerance: None,
        }
    }

    /// Read the target velocity from `velocity` instead of estimating it.
    pub fn with_target_velocity(mut self, velocity: ValueRef) -> Self {
        self.target_velocity = Some(velocity);
        self
    }

    /// Finish once the output rests within `tolerance` of the target.
    pub fn finish_when_settled(mut self, tolerance: f64) -> Self {
        self.settle_tolerance = Some(tolerance);
        self
    }

    /// Retune the running system.
    pub fn set_params(&mut self, params: DynamicsParams) {
        self.params = params;
        if let Some(solver) = self.solver.as_mut() {
            solver.set_params(params);
        }
    }

    pub fn solver(&self) -> Option<&SecondOrderDynamics> {
        self.solver.as_ref()
    }
}

impl Action for SecondOrder {
    fn enter(&mut self, _ctx: &mut ActionContext<'_>) {
        self.solver = Some(SecondOrderDynamics::new(self.params, self.output.read()));
    }

    fn update(&mut self, _progress: f64, ctx: &mut ActionContext<'_>) {
        let solver = self
            .solver
            .get_or_insert_with(|| SecondOrderDynamics::new(self.params, self.output.read()));
        let target = self.target.read();
        let velocity = self.target_velocity.as_ref().map(ValueRef::read);
        let position = solver.update(ctx.dt(), target, velocity);
        self.output.write(position);

        let settled = self
            .settle_tolerance
            .is_some_and(|tolerance| solver.is_settled(&target, tolerance));
        if settled {
            ctx.finish();
        }
    }

    fn label(&self) -> &str {
        "second_order"
    }
}
