//! Executor steps for planned `pcs` commands.

use crate::args::ArgOptions;
use crate::backend::Backend;
use crate::error::Error;
use crate::plan::CommandPlan;
use declarative::{ApplyContext, ApplyResult, Step};
use std::fmt;

/// A [`CommandPlan`] ready to run on a backend.
pub struct PcsStep<'a> {
    plan: CommandPlan,
    backend: &'a dyn Backend,
    cib: Option<String>,
    options: ArgOptions,
}

impl<'a> PcsStep<'a> {
    /// Bind `plan` to `backend`.
    ///
    /// The plan's own shadow CIB wins over `cib`.
    pub fn new(
        plan: CommandPlan,
        backend: &'a dyn Backend,
        cib: Option<&str>,
        options: ArgOptions,
    ) -> Self {
        let cib = plan.cib.clone().or_else(|| cib.map(str::to_string));
        Self {
            plan,
            backend,
            cib,
            options,
        }
    }

    pub fn plan(&self) -> &CommandPlan {
        &self.plan
    }

    pub fn args(&self) -> Vec<String> {
        self.plan.to_args(&self.options)
    }
}

impl fmt::Debug for PcsStep<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PcsStep")
            .field("plan", &self.plan)
            .field("cib", &self.cib)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Step for PcsStep<'_> {
    fn id(&self) -> String {
        self.plan.target().to_string()
    }

    fn description(&self) -> String {
        self.plan.description()
    }

    fn kind(&self) -> &'static str {
        self.plan.kind()
    }

    fn apply(&self, ctx: &mut ApplyContext) -> anyhow::Result<ApplyResult> {
        if ctx.dry_run {
            return Ok(ApplyResult::Skipped {
                reason: "Dry run".to_string(),
            });
        }

        let output = self.backend.execute(&self.args(), self.cib.as_deref())?;
        if output.success {
            return Ok(self.plan.success_result());
        }

        let category =
            Error::from_pcs_output(&output.stderr_str(), Some(self.plan.target())).category();
        log::warn!(
            "{}: {} ({})",
            self.plan.description(),
            category.description(),
            category.advice()
        );
        Ok(ApplyResult::Failed {
            error: output.failure_message(),
        })
    }
}
