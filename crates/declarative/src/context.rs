//! Apply context and provider traits
//!
//! These traits allow the declarative crate to be used without
//! depending on specific implementations of progress or prompting.

use crate::types::ApplyResult;
use anyhow::Result;

/// Progress callback for execution operations
///
/// Implement this trait to receive progress updates during execution.
pub trait ProgressCallback {
    /// Called once before the first step runs
    fn on_plan_start(&mut self, count: usize);

    /// Called when starting a single step
    fn on_step_start(&mut self, index: usize, id: &str, description: &str);

    /// Called when a step completes
    fn on_step_complete(&mut self, index: usize, id: &str, result: &ApplyResult);

    /// Called after the last step ran, or after the plan halted
    fn on_plan_complete(&mut self);
}

/// Confirmation callback for user interaction
pub trait ConfirmCallback {
    /// Ask the user to confirm an action
    ///
    /// # Returns
    /// `true` if the user confirmed, `false` otherwise
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_plan_start(&mut self, _count: usize) {}
    fn on_step_start(&mut self, _index: usize, _id: &str, _description: &str) {}
    fn on_step_complete(&mut self, _index: usize, _id: &str, _result: &ApplyResult) {}
    fn on_plan_complete(&mut self) {}
}

/// Auto-confirm callback (always returns true)
pub struct AutoConfirm;

impl ConfirmCallback for AutoConfirm {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Auto-decline callback (always returns false)
pub struct AutoDecline;

impl ConfirmCallback for AutoDecline {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(false)
    }
}

/// Context passed to step apply operations
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyContext {
    /// Whether this is a dry run (no actual changes)
    pub dry_run: bool,
}

impl ApplyContext {
    /// Create a new apply context
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }
}
