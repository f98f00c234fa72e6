//! Instant actions: zero duration, fire exactly once.

use super::{Action, ActionContext, Span};
use crate::value::{Value, ValueRef};

/// Calls a closure once.
pub struct FunctionCaller {
    label: String,
    callback: Box<dyn FnMut()>,
}

impl FunctionCaller {
    pub fn new(callback: impl FnMut() + 'static) -> Self {
        Self {
            label: "function_caller".into(),
            callback: Box::new(callback),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

impl Action for FunctionCaller {
    fn span(&self) -> Span {
        Span::Instant
    }

    fn update(&mut self, _progress: f64, _ctx: &mut ActionContext<'_>) {
        (self.callback)();
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// Writes a fixed value into a reference once.
#[derive(Debug)]
pub struct Setter {
    target: ValueRef,
    value: Value,
}

impl Setter {
    pub fn new(target: ValueRef, value: impl Into<Value>) -> Self {
        Self {
            target,
            value: value.into(),
        }
    }
}

impl Action for Setter {
    fn span(&self) -> Span {
        Span::Instant
    }

    fn update(&mut self, _progress: f64, _ctx: &mut ActionContext<'_>) {
        self.target.write(self.value);
    }

    fn label(&self) -> &str {
        "setter"
    }
}
