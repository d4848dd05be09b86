//! Execution plan - an ordered list of steps

use crate::step::BoxedStep;

/// An ordered execution plan
///
/// Steps run in insertion order. The plan never reorders them.
#[derive(Default)]
pub struct ExecutionPlan<'a> {
    pub steps: Vec<BoxedStep<'a>>,
}

impl<'a> ExecutionPlan<'a> {
    /// Create a new empty plan
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append a step
    pub fn push(&mut self, step: BoxedStep<'a>) {
        self.steps.push(step);
    }

    /// Number of steps in the plan
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if plan is empty
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
