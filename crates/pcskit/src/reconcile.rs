//! Merge desired declarations into observed state.
//!
//! Compares the caller's [`PrimitiveSpec`]s against the primitives read
//! from the CIB and produces the full command list for one pass:
//! - Declared but not observed: create
//! - Declared and observed: update whatever differs
//! - Declared absent and observed: delete
//!
//! Observed primitives the caller does not mention are left alone.

use crate::error::{Error, Result};
use crate::plan::{CommandPlan, plan_converge, plan_destroy};
use crate::types::{Ensure, Primitive, PrimitiveSpec};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

/// Plan every command needed to move `observed` to `desired`.
///
/// Plans are grouped per primitive, in the order the primitives were
/// declared.
pub fn reconcile(observed: Vec<Primitive>, desired: &[PrimitiveSpec]) -> Result<Vec<CommandPlan>> {
    check_unique(desired)?;

    let mut by_name = index(observed);
    let mut plans = Vec::new();
    for spec in desired {
        let existing = by_name.remove(&spec.name);
        plans.extend(reconcile_one(existing, spec)?);
    }

    log_planned(&plans, desired);
    Ok(plans)
}

/// Plan each declaration against the CIB its commands will run on.
///
/// A declaration targets its own `cib` when it names one, `default_cib`
/// otherwise. `discover` is called once per distinct target, the first
/// time a declaration needs it.
pub fn reconcile_shadows<F>(
    desired: &[PrimitiveSpec],
    default_cib: Option<&str>,
    mut discover: F,
) -> Result<Vec<CommandPlan>>
where
    F: FnMut(Option<&str>) -> Result<Vec<Primitive>>,
{
    check_unique(desired)?;

    let mut snapshots: HashMap<Option<String>, HashMap<String, Primitive>> = HashMap::new();
    let mut plans = Vec::new();
    for spec in desired {
        let cib = spec.cib.as_deref().or(default_cib);
        let by_name = match snapshots.entry(cib.map(str::to_string)) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                log::debug!("reading {}", cib.unwrap_or("live CIB"));
                entry.insert(index(discover(cib)?))
            }
        };
        let existing = by_name.remove(&spec.name);
        plans.extend(reconcile_one(existing, spec)?);
    }

    log_planned(&plans, desired);
    Ok(plans)
}

/// Plan the commands for a single declaration.
pub fn reconcile_one(existing: Option<Primitive>, spec: &PrimitiveSpec) -> Result<Vec<CommandPlan>> {
    match (existing, spec.ensure) {
        (Some(mut record), Ensure::Absent) => {
            log::debug!("{}: present but declared absent", spec.name);
            if spec.cib.is_some() {
                record.cib = spec.cib.clone();
            }
            Ok(plan_destroy(&record))
        }
        (None, Ensure::Absent) => {
            log::debug!("{}: already absent", spec.name);
            Ok(Vec::new())
        }
        (Some(mut record), Ensure::Present) => {
            record.apply_spec(spec)?;
            let plans = plan_converge(&mut record);
            if plans.is_empty() {
                log::debug!("{}: in sync", spec.name);
            }
            Ok(plans)
        }
        (None, Ensure::Present) => {
            log::debug!("{}: not in the CIB, creating", spec.name);
            let mut record = Primitive::declare(spec)?;
            Ok(plan_converge(&mut record))
        }
    }
}

fn index(observed: Vec<Primitive>) -> HashMap<String, Primitive> {
    observed.into_iter().map(|p| (p.name.clone(), p)).collect()
}

fn log_planned(plans: &[CommandPlan], desired: &[PrimitiveSpec]) {
    log::info!(
        "planned {} command(s) for {} declared primitive(s)",
        plans.len(),
        desired.len()
    );
}

fn check_unique(desired: &[PrimitiveSpec]) -> Result<()> {
    let mut seen = HashSet::new();
    for spec in desired {
        if !seen.insert(spec.name.as_str()) {
            return Err(Error::DuplicateName {
                name: spec.name.clone(),
            });
        }
    }
    Ok(())
}
