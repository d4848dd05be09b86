//! Reconciliation planner.
//!
//! Turns a [`Primitive`] whose desired fields have been set into the
//! ordered list of `pcs` commands that converge the cluster. `pcs` does
//! not drop operations on update and never removes a master wrapper on
//! its own, so both are planned explicitly.

use crate::args::{self, ArgOptions};
use crate::types::{AgentDescriptor, AttributeGroups, Attributes, Primitive, Transition};
use declarative::ApplyResult;
use serde::Serialize;
use std::fmt;

/// One remediation action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// `pcs resource create`
    Create {
        name: String,
        descriptor: AgentDescriptor,
        groups: AttributeGroups,
    },
    /// `pcs resource update`
    Update {
        name: String,
        groups: AttributeGroups,
    },
    /// `pcs resource delete` (pcs stops the resource first)
    Delete { name: String },
    /// `pcs resource op remove`
    RemoveOperation {
        name: String,
        operation: String,
        fields: Attributes,
    },
    /// `pcs resource master`
    CreateMaster {
        wrapper: String,
        primitive: String,
        metadata: Attributes,
    },
    /// `pcs resource update` on the wrapper
    UpdateMaster {
        wrapper: String,
        primitive: String,
        metadata: Attributes,
    },
    /// `pcs resource delete` on the wrapper
    DeleteMaster { wrapper: String },
}

/// An action bound to the shadow CIB it should run against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandPlan {
    #[serde(flatten)]
    pub action: Action,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cib: Option<String>,
}

impl CommandPlan {
    pub fn new(action: Action, cib: Option<String>) -> Self {
        Self { action, cib }
    }

    /// The resource id the command acts on.
    pub fn target(&self) -> &str {
        match &self.action {
            Action::Create { name, .. }
            | Action::Update { name, .. }
            | Action::Delete { name }
            | Action::RemoveOperation { name, .. } => name,
            Action::CreateMaster { wrapper, .. }
            | Action::UpdateMaster { wrapper, .. }
            | Action::DeleteMaster { wrapper } => wrapper,
        }
    }

    /// Short category name.
    pub fn kind(&self) -> &'static str {
        match self.action {
            Action::Create { .. } => "create",
            Action::Update { .. } => "update",
            Action::Delete { .. } => "delete",
            Action::RemoveOperation { .. } => "op-remove",
            Action::CreateMaster { .. } => "master-create",
            Action::UpdateMaster { .. } => "master-update",
            Action::DeleteMaster { .. } => "master-delete",
        }
    }

    /// What a successful run of this command means.
    pub fn success_result(&self) -> ApplyResult {
        match self.action {
            Action::Create { .. } | Action::CreateMaster { .. } => ApplyResult::Created,
            Action::Update { .. } | Action::UpdateMaster { .. } => ApplyResult::Modified,
            Action::Delete { .. }
            | Action::DeleteMaster { .. }
            | Action::RemoveOperation { .. } => ApplyResult::Removed,
        }
    }

    /// The `pcs` argument list, without the binary.
    pub fn to_args(&self, options: &ArgOptions) -> Vec<String> {
        let mut cmd: Vec<String> = vec!["resource".into()];
        match &self.action {
            Action::Create {
                name,
                descriptor,
                groups,
            } => {
                cmd.extend(["create".into(), name.clone(), descriptor.to_string()]);
                cmd.extend(checked(args::group_args(groups, options)));
            }
            Action::Update { name, groups } => {
                cmd.extend(["update".into(), name.clone()]);
                cmd.extend(checked(args::group_args(groups, options)));
            }
            Action::Delete { name } => {
                cmd.extend(["delete".into(), name.clone()]);
            }
            Action::RemoveOperation {
                name,
                operation,
                fields,
            } => {
                cmd.extend(["op".into(), "remove".into(), name.clone(), operation.clone()]);
                cmd.extend(args::parameter_args(fields));
            }
            Action::CreateMaster {
                wrapper,
                primitive,
                metadata,
            } => {
                cmd.extend(["master".into(), wrapper.clone(), primitive.clone()]);
                cmd.extend(args::meta_args(metadata));
            }
            Action::UpdateMaster {
                wrapper,
                primitive,
                metadata,
            } => {
                cmd.extend(["update".into(), wrapper.clone(), primitive.clone()]);
                cmd.extend(args::meta_args(metadata));
            }
            Action::DeleteMaster { wrapper } => {
                cmd.extend(["delete".into(), wrapper.clone()]);
            }
        }
        cmd
    }

    /// Human-readable description.
    pub fn description(&self) -> String {
        match &self.action {
            Action::Create {
                name, descriptor, ..
            } => format!("create primitive {name} ({descriptor})"),
            Action::Update { name, .. } => format!("update primitive {name}"),
            Action::Delete { name } => format!("delete primitive {name}"),
            Action::RemoveOperation {
                name, operation, ..
            } => format!("remove {operation} operation from {name}"),
            Action::CreateMaster {
                wrapper, primitive, ..
            } => format!("create master {wrapper} for {primitive}"),
            Action::UpdateMaster { wrapper, .. } => format!("update master {wrapper}"),
            Action::DeleteMaster { wrapper } => format!("delete master {wrapper}"),
        }
    }
}

impl fmt::Display for CommandPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pcs {}", self.to_args(&ArgOptions::default()).join(" "))?;
        if let Some(cib) = &self.cib {
            write!(f, "  [CIB_shadow={cib}]")?;
        }
        Ok(())
    }
}

fn checked(tokens: Vec<String>) -> Vec<String> {
    debug_assert!(!args::has_dangling_marker(&tokens), "dangling marker in {tokens:?}");
    tokens
}

/// Plan the commands that converge one record.
///
/// Pending promotable transitions are consumed and the record is marked
/// clean, so planning the same record twice yields nothing the second time.
///
/// Order: wrapper removal, operation removals, primitive create/update,
/// wrapper create/update.
pub fn plan_converge(record: &mut Primitive) -> Vec<CommandPlan> {
    let (dirty, transitions) = record.take_changes();
    let cib = record.cib.clone();
    let plan = |action: Action| CommandPlan::new(action, cib.clone());
    let mut plans = Vec::new();

    if transitions.contains(&Transition::Demoted) {
        plans.push(plan(Action::DeleteMaster {
            wrapper: record.master_id(),
        }));
    }

    if !record.existing_resource() {
        if dirty {
            plans.extend(create_sequence(record).into_iter().map(&plan));
        }
        return plans;
    }

    if dirty {
        if record.operations.is_empty()
            && let Some(existing) = record.existing_operations()
        {
            for (operation, fields) in existing {
                plans.push(plan(Action::RemoveOperation {
                    name: record.name.clone(),
                    operation: operation.clone(),
                    fields: fields.clone(),
                }));
            }
        }

        plans.push(plan(Action::Update {
            name: record.name.clone(),
            groups: record.groups(),
        }));
    }

    if record.promotable {
        if transitions.contains(&Transition::Promoted) {
            plans.push(plan(create_master(record)));
        } else if dirty {
            plans.push(plan(Action::UpdateMaster {
                wrapper: record.master_id(),
                primitive: record.name.clone(),
                metadata: record.ms_metadata.clone(),
            }));
        }
    }

    plans
}

/// Plan the removal of a primitive: a single `pcs resource delete`.
pub fn plan_destroy(record: &Primitive) -> Vec<CommandPlan> {
    vec![CommandPlan::new(
        Action::Delete {
            name: record.name.clone(),
        },
        record.cib.clone(),
    )]
}

fn create_sequence(record: &Primitive) -> Vec<Action> {
    let mut actions = vec![Action::Create {
        name: record.name.clone(),
        descriptor: record.descriptor.clone(),
        groups: record.groups(),
    }];
    if record.promotable {
        actions.push(create_master(record));
    }
    actions
}

fn create_master(record: &Primitive) -> Action {
    Action::CreateMaster {
        wrapper: record.master_id(),
        primitive: record.name.clone(),
        metadata: record.ms_metadata.clone(),
    }
}
