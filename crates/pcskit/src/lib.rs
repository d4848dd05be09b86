//! # pcskit
//!
//! Reconcile declared Pacemaker primitives against the live CIB.
//!
//! This crate provides functionality for:
//! - Parsing primitives out of a CIB XML snapshot
//! - Tracking desired changes on a resource record
//! - Planning the ordered `pcs` commands that converge the cluster
//! - Running those commands one by one, halting on the first failure
//!
//! ## Example
//!
//! ```no_run
//! use pcskit::{Client, PrimitiveSpec, attrs};
//! use declarative::{AutoConfirm, ExecuteOptions, NoProgress};
//!
//! let client = Client::pcs("pcs");
//!
//! let desired = vec![
//!     PrimitiveSpec::new("web1")
//!         .with_agent("ocf", Some("heartbeat"), "IPaddr2")
//!         .with_parameters(attrs([("ip", "10.0.0.5")])),
//! ];
//!
//! let plans = client.plan(&desired, None).unwrap();
//! for plan in &plans {
//!     println!("{plan}");
//! }
//!
//! let summary = client
//!     .converge(plans, None, ExecuteOptions::default(), &mut NoProgress, &mut AutoConfirm)
//!     .unwrap();
//! assert!(summary.is_success());
//! ```

#![warn(clippy::all)]

pub mod args;
pub mod backend;
pub mod cib;
pub mod error;
pub mod plan;
pub mod reconcile;
pub mod step;
pub mod types;

pub use args::ArgOptions;
pub use error::{Error, ErrorCategory, Result};
pub use plan::{Action, CommandPlan, plan_converge, plan_destroy};
pub use reconcile::{reconcile, reconcile_one, reconcile_shadows};
pub use step::PcsStep;
pub use types::{
    AgentDescriptor, AttributeGroups, Attributes, Ensure, MASTER_PREFIX, Operations, Placement,
    Primitive, PrimitiveSpec, Transition, attrs,
};

use backend::{Backend, pcs::PcsBackend};
use declarative::{
    ConfirmCallback, ExecuteOptions, ExecuteSummary, ExecutionPlan, ProgressCallback,
};
use std::path::PathBuf;

/// High-level client for one cluster.
///
/// The client wraps a backend and ties discovery, planning and
/// convergence together.
pub struct Client {
    backend: Box<dyn Backend>,
    options: ArgOptions,
}

impl Client {
    /// Create a client over any backend.
    pub fn new(backend: Box<dyn Backend>) -> Self {
        Self {
            backend,
            options: ArgOptions::default(),
        }
    }

    /// Create a client that runs the given `pcs` binary.
    pub fn pcs(path: impl Into<PathBuf>) -> Self {
        Self::new(Box::new(PcsBackend::new(path)))
    }

    /// Override argument serialization options.
    pub fn with_options(mut self, options: ArgOptions) -> Self {
        self.options = options;
        self
    }

    /// Read the CIB and parse every primitive in it.
    pub fn discover(&self, cib: Option<&str>) -> Result<Vec<Primitive>> {
        let output = self
            .backend
            .execute(&["cluster".to_string(), "cib".to_string()], cib)?;

        if !output.success {
            return Err(Error::from_pcs_output(&output.stderr_str(), None));
        }

        cib::parse_snapshot(&output.stdout_str())
    }

    /// Discover the cluster and plan the commands that converge `desired`.
    ///
    /// Every declaration is planned against the CIB it will be applied to:
    /// its own shadow, or `cib`. Each distinct CIB is read once. `cib` is
    /// also attached to every plan whose declaration did not name its own.
    pub fn plan(&self, desired: &[PrimitiveSpec], cib: Option<&str>) -> Result<Vec<CommandPlan>> {
        let mut plans = reconcile_shadows(desired, cib, |shadow| self.discover(shadow))?;
        if let Some(cib) = cib {
            for plan in plans.iter_mut().filter(|p| p.cib.is_none()) {
                plan.cib = Some(cib.to_string());
            }
        }
        Ok(plans)
    }

    /// Bind plans to this client's backend.
    pub fn steps(&self, plans: Vec<CommandPlan>, cib: Option<&str>) -> ExecutionPlan<'_> {
        let mut execution = ExecutionPlan::new();
        for plan in plans {
            execution.push(Box::new(PcsStep::new(
                plan,
                self.backend.as_ref(),
                cib,
                self.options,
            )));
        }
        execution
    }

    /// Run `plans` strictly in order.
    ///
    /// The first failing command halts the pass; nothing is rolled back.
    pub fn converge<P, C>(
        &self,
        plans: Vec<CommandPlan>,
        cib: Option<&str>,
        opts: ExecuteOptions,
        progress: &mut P,
        confirm: &mut C,
    ) -> Result<ExecuteSummary>
    where
        P: ProgressCallback,
        C: ConfirmCallback,
    {
        let count = plans.len();
        let summary = declarative::execute(self.steps(plans, cib), opts, progress, confirm)
            .map_err(|e| Error::Other(format!("{e:#}")))?;

        log::info!(
            "applied {} of {} command(s), {} failed",
            summary.created + summary.modified + summary.removed,
            count,
            summary.failed
        );
        Ok(summary)
    }
}
