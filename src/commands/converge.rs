//! `pcsync diff` and `pcsync apply`.

use anyhow::{Result, bail};
use declarative::ExecuteOptions;
use pcskit::{Client, CommandPlan};

use super::{client, explain, load_manifest, shadow};
use crate::Context;
use crate::cli::{ApplyArgs, TargetArgs};
use crate::progress::{self, Prompt, StepPrinter};
use crate::ui;

struct Planned {
    client: Client,
    plans: Vec<CommandPlan>,
    cib: Option<String>,
}

/// Reads the cluster and plans the commands for the selected declarations.
fn plan(ctx: &Context, target: Option<&str>) -> Result<Planned> {
    let manifest = load_manifest(ctx, true)?;
    let desired = manifest.select(target);
    if let Some(name) = target
        && desired.is_empty()
    {
        bail!("'{name}' is not declared in the manifest");
    }

    let client = client(ctx, &manifest);
    let cib = shadow(ctx, &manifest);

    let pb = progress::spinner("Reading CIB...");
    let plans = client.plan(&desired, cib.as_deref());
    pb.finish_and_clear();

    Ok(Planned {
        client,
        plans: plans.map_err(explain)?,
        cib,
    })
}

fn print_plans(plans: &[CommandPlan]) {
    for plan in plans {
        println!("{} {}", ui::kind_symbol(plan.kind()), plan);
    }
}

pub fn diff(ctx: &Context, args: TargetArgs) -> Result<()> {
    let Planned { plans, .. } = plan(ctx, args.target.as_deref())?;

    if plans.is_empty() {
        ui::success("Cluster matches the manifest");
        return Ok(());
    }

    ui::header("Pending commands");
    print_plans(&plans);
    println!();
    ui::dim(&format!("{} command(s) would run", plans.len()));
    Ok(())
}

pub fn apply(ctx: &Context, args: ApplyArgs) -> Result<()> {
    let Planned { client, plans, cib } = plan(ctx, args.target.as_deref())?;

    if plans.is_empty() {
        ui::success("Cluster matches the manifest");
        return Ok(());
    }

    ui::header("Pending commands");
    print_plans(&plans);
    println!();

    let opts = ExecuteOptions {
        dry_run: args.dry_run,
    };
    let mut printer = StepPrinter::new(ctx.quiet);
    let mut prompt = Prompt {
        assume_yes: args.yes,
    };
    let summary = client
        .converge(plans, cib.as_deref(), opts, &mut printer, &mut prompt)
        .map_err(explain)?;

    if args.dry_run {
        ui::info(&format!("Dry run: {} command(s) not run", summary.skipped));
        return Ok(());
    }

    ui::section("Summary");
    ui::kv("created", &summary.created.to_string());
    ui::kv("modified", &summary.modified.to_string());
    ui::kv("removed", &summary.removed.to_string());
    ui::kv("skipped", &summary.skipped.to_string());

    if !summary.is_success() {
        ui::warn("Stopped at the first failure; earlier commands were not rolled back");
        for failure in &summary.failures {
            ui::error(&format!("{}: {}", failure.description, failure.error));
        }
        bail!("{} command(s) failed", summary.failed);
    }

    if summary.total_changes() == 0 {
        ui::info("Nothing was changed");
    } else {
        ui::success(&format!("Applied {} command(s)", summary.total_changes()));
    }
    Ok(())
}
