//! # Declarative
//!
//! A framework for running ordered convergence plans.
//!
//! Callers compute the steps needed to move a system from its observed
//! state to its desired state; this crate runs them one after another,
//! reporting progress and stopping at the first failure.
//!
//! ## Core Concepts
//!
//! - **Step**: One idempotent remediation action (usually one external command)
//! - **ExecutionPlan**: An ordered list of steps; order is significant
//! - **Executor**: Applies a plan sequentially, halting on the first failure
//!
//! ## Example
//!
//! ```ignore
//! use declarative::{
//!     ApplyContext, ApplyResult, AutoConfirm, ExecuteOptions, ExecutionPlan, NoProgress, Step,
//!     execute,
//! };
//!
//! #[derive(Debug)]
//! struct Touch { path: String }
//!
//! impl Step for Touch {
//!     fn id(&self) -> String { self.path.clone() }
//!     fn description(&self) -> String { format!("touch {}", self.path) }
//!     fn kind(&self) -> &'static str { "file" }
//!
//!     fn apply(&self, _ctx: &mut ApplyContext) -> anyhow::Result<ApplyResult> {
//!         std::fs::write(&self.path, b"")?;
//!         Ok(ApplyResult::Created)
//!     }
//! }
//!
//! let mut plan = ExecutionPlan::new();
//! plan.push(Box::new(Touch { path: "/tmp/marker".into() }));
//!
//! let summary = execute(plan, ExecuteOptions::default(), &mut NoProgress, &mut AutoConfirm)?;
//! assert!(summary.is_success());
//! ```
//!
//! ## Provider Traits
//!
//! - [`ProgressCallback`]: Receives progress updates
//! - [`ConfirmCallback`]: Handles user confirmations
//!
//! This allows the crate to be used without hard dependencies on
//! specific UI frameworks.

pub mod context;
pub mod executor;
pub mod planner;
pub mod step;
pub mod types;

// Re-export main types at crate root
pub use context::{
    ApplyContext, AutoConfirm, AutoDecline, ConfirmCallback, NoProgress, ProgressCallback,
};
pub use executor::execute;
pub use planner::ExecutionPlan;
pub use step::{BoxedStep, Step};
pub use types::{ApplyResult, CommandOutput, ExecuteOptions, ExecuteSummary, StepFailure};
