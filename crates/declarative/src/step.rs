//! Step trait for ordered convergence
//!
//! A Step is one remediation action. Steps carry no state detection of
//! their own: the planner that produced them has already decided they
//! are needed.

use crate::context::ApplyContext;
use crate::types::ApplyResult;
use anyhow::Result;
use std::fmt;

/// Core trait for plan steps
///
/// # Example
///
/// ```ignore
/// use declarative::{ApplyContext, ApplyResult, Step};
///
/// #[derive(Debug)]
/// struct Remove { path: String }
///
/// impl Step for Remove {
///     fn id(&self) -> String { self.path.clone() }
///     fn description(&self) -> String { format!("remove {}", self.path) }
///     fn kind(&self) -> &'static str { "file" }
///
///     fn apply(&self, _ctx: &mut ApplyContext) -> anyhow::Result<ApplyResult> {
///         std::fs::remove_file(&self.path)?;
///         Ok(ApplyResult::Removed)
///     }
/// }
/// ```
pub trait Step: fmt::Debug {
    /// Identifier of the thing this step acts on
    ///
    /// Several steps may share an id (e.g. an operation removal followed by
    /// an update of the same resource).
    fn id(&self) -> String;

    /// Human-readable description of what this step does
    fn description(&self) -> String;

    /// Step category, used for grouping and filtering
    fn kind(&self) -> &'static str;

    /// Perform the step
    ///
    /// Returning `ApplyResult::Failed` or an `Err` halts the plan.
    fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult>;
}

/// A boxed step for type-erased storage
pub type BoxedStep<'a> = Box<dyn Step + 'a>;
