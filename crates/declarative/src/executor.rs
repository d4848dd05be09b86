//! Execution engine - applies a plan strictly in order

use crate::context::{ApplyContext, ConfirmCallback, ProgressCallback};
use crate::planner::ExecutionPlan;
use crate::step::Step;
use crate::types::{ApplyResult, ExecuteOptions, ExecuteSummary, StepFailure};
use anyhow::Result;

/// Execute a plan with the given options and callbacks
///
/// Steps run one at a time in plan order. The first failing step halts
/// the pass: steps already applied are not rolled back and the remaining
/// steps are reported as skipped.
///
/// # Arguments
/// * `plan` - The execution plan to run
/// * `opts` - Execution options
/// * `progress` - Progress callback
/// * `confirm` - Confirmation callback
pub fn execute<P, C>(
    plan: ExecutionPlan<'_>,
    opts: ExecuteOptions,
    progress: &mut P,
    confirm: &mut C,
) -> Result<ExecuteSummary>
where
    P: ProgressCallback,
    C: ConfirmCallback,
{
    if plan.is_empty() {
        return Ok(ExecuteSummary::default());
    }

    let total = plan.len();

    if opts.dry_run {
        let mut summary = ExecuteSummary::default();
        for step in &plan.steps {
            log::info!("[dry-run] {}", step.description());
            summary.add_result(&ApplyResult::Skipped {
                reason: "Dry run".into(),
            });
        }
        return Ok(summary);
    }

    if !confirm.confirm(&format!("Apply {total} change(s)?"))? {
        return Ok(ExecuteSummary {
            skipped: total,
            ..Default::default()
        });
    }

    let mut summary = ExecuteSummary::default();
    let mut ctx = ApplyContext::new(false);

    progress.on_plan_start(total);

    let mut steps = plan.steps.iter().enumerate();
    for (index, step) in steps.by_ref() {
        progress.on_step_start(index, &step.id(), &step.description());
        let result = apply_step(step.as_ref(), &mut ctx);
        progress.on_step_complete(index, &step.id(), &result);
        summary.add_result(&result);

        if let ApplyResult::Failed { error } = result {
            log::warn!("{} failed: {}", step.description(), error);
            summary.failures.push(StepFailure {
                id: step.id(),
                description: step.description(),
                error,
            });
            break;
        }
    }

    for (_, step) in steps {
        log::debug!("not attempted: {}", step.description());
        summary.add_result(&ApplyResult::Skipped {
            reason: "Earlier step failed".into(),
        });
    }

    progress.on_plan_complete();

    Ok(summary)
}

/// Apply a single step, folding errors into a failed result
fn apply_step(step: &dyn Step, ctx: &mut ApplyContext) -> ApplyResult {
    match step.apply(ctx) {
        Ok(result) => result,
        Err(e) => ApplyResult::Failed {
            error: format!("{e:#}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{AutoConfirm, AutoDecline, NoProgress};
    use std::cell::RefCell;

    #[derive(Debug)]
    struct TestStep<'a> {
        id: &'static str,
        outcome: ApplyResult,
        log: &'a RefCell<Vec<&'static str>>,
    }

    impl Step for TestStep<'_> {
        fn id(&self) -> String {
            self.id.to_string()
        }

        fn description(&self) -> String {
            format!("Test step {}", self.id)
        }

        fn kind(&self) -> &'static str {
            "test"
        }

        fn apply(&self, _ctx: &mut ApplyContext) -> Result<ApplyResult> {
            self.log.borrow_mut().push(self.id);
            Ok(self.outcome.clone())
        }
    }

    #[derive(Debug)]
    struct ErrStep;

    impl Step for ErrStep {
        fn id(&self) -> String {
            "err".into()
        }

        fn description(&self) -> String {
            "Erroring step".into()
        }

        fn kind(&self) -> &'static str {
            "test"
        }

        fn apply(&self, _ctx: &mut ApplyContext) -> Result<ApplyResult> {
            anyhow::bail!("could not spawn")
        }
    }

    #[derive(Default)]
    struct Recorder {
        started: Vec<usize>,
        completed: usize,
    }

    impl ProgressCallback for Recorder {
        fn on_plan_start(&mut self, _count: usize) {}
        fn on_step_start(&mut self, index: usize, _id: &str, _description: &str) {
            self.started.push(index);
        }
        fn on_step_complete(&mut self, _index: usize, _id: &str, _result: &ApplyResult) {}
        fn on_plan_complete(&mut self) {
            self.completed += 1;
        }
    }

    #[test]
    fn test_execute_empty_plan() {
        let mut progress = Recorder::default();
        let result = execute(
            ExecutionPlan::new(),
            ExecuteOptions::default(),
            &mut progress,
            &mut AutoDecline,
        )
        .unwrap();

        assert_eq!(result.total_changes(), 0);
        assert_eq!(result.skipped, 0);
        assert_eq!(progress.completed, 0);
    }

    #[test]
    fn test_execute_runs_in_order() {
        let log = RefCell::new(Vec::new());
        let mut plan = ExecutionPlan::new();
        plan.push(Box::new(TestStep {
            id: "a",
            outcome: ApplyResult::Removed,
            log: &log,
        }));
        plan.push(Box::new(TestStep {
            id: "b",
            outcome: ApplyResult::Modified,
            log: &log,
        }));

        let summary = execute(plan, ExecuteOptions::default(), &mut NoProgress, &mut AutoConfirm).unwrap();

        assert_eq!(*log.borrow(), vec!["a", "b"]);
        assert_eq!(summary.removed, 1);
        assert_eq!(summary.modified, 1);
        assert!(summary.is_success());
    }

    #[test]
    fn test_execute_halts_on_failure() {
        let log = RefCell::new(Vec::new());
        let mut plan = ExecutionPlan::new();
        plan.push(Box::new(TestStep {
            id: "a",
            outcome: ApplyResult::Created,
            log: &log,
        }));
        plan.push(Box::new(TestStep {
            id: "b",
            outcome: ApplyResult::Failed {
                error: "exit status 1".into(),
            },
            log: &log,
        }));
        plan.push(Box::new(TestStep {
            id: "c",
            outcome: ApplyResult::Created,
            log: &log,
        }));

        let mut progress = Recorder::default();
        let summary =
            execute(plan, ExecuteOptions::default(), &mut progress, &mut AutoConfirm).unwrap();

        assert_eq!(*log.borrow(), vec!["a", "b"]);
        assert_eq!(summary.created, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].id, "b");
        assert_eq!(summary.failures[0].error, "exit status 1");
        assert_eq!(progress.started, vec![0, 1]);
        assert_eq!(progress.completed, 1);
    }

    #[test]
    fn test_execute_error_becomes_failure() {
        let mut plan = ExecutionPlan::new();
        plan.push(Box::new(ErrStep));

        let summary = execute(plan, ExecuteOptions::default(), &mut NoProgress, &mut AutoConfirm).unwrap();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.failures[0].error, "could not spawn");
    }

    #[test]
    fn test_dry_run_applies_nothing() {
        let log = RefCell::new(Vec::new());
        let mut plan = ExecutionPlan::new();
        plan.push(Box::new(TestStep {
            id: "a",
            outcome: ApplyResult::Created,
            log: &log,
        }));

        let opts = ExecuteOptions { dry_run: true };
        let summary = execute(plan, opts, &mut NoProgress, &mut AutoConfirm).unwrap();

        assert!(log.borrow().is_empty());
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn test_declined_confirmation_skips_all() {
        let log = RefCell::new(Vec::new());
        let mut plan = ExecutionPlan::new();
        plan.push(Box::new(TestStep {
            id: "a",
            outcome: ApplyResult::Created,
            log: &log,
        }));
        plan.push(Box::new(TestStep {
            id: "b",
            outcome: ApplyResult::Created,
            log: &log,
        }));

        let summary =
            execute(plan, ExecuteOptions::default(), &mut NoProgress, &mut AutoDecline).unwrap();

        assert!(log.borrow().is_empty());
        assert_eq!(summary.skipped, 2);
    }
}
