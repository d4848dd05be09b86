//! Core types for cluster primitives.
//!
//! A [`Primitive`] is one resource record. It is either *observed* (read
//! from the live CIB, carrying a frozen baseline used for diffing) or
//! *declared* (new, never seen in the CIB). The caller's desired values
//! arrive as a [`PrimitiveSpec`].

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque name/value pairs (instance attributes, utilization, meta attributes).
pub type Attributes = BTreeMap<String, String>;

/// Operations keyed by operation name (`monitor`, `start`, ...).
///
/// The operation name is the key only; it never appears inside the
/// attribute map.
pub type Operations = BTreeMap<String, Attributes>;

/// Prefix of the auxiliary master/slave wrapper id.
pub const MASTER_PREFIX: &str = "ms_";

/// Whether a primitive should exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ensure {
    /// The primitive should exist
    #[default]
    Present,
    /// The primitive should be removed
    Absent,
}

/// The three-part agent descriptor (`class:provider:type`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentDescriptor {
    /// Resource class, e.g. `ocf`, `systemd`, `stonith`
    pub class: String,
    /// Provider, e.g. `heartbeat`; not every class has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Agent type, e.g. `IPaddr2`
    #[serde(rename = "type")]
    pub agent_type: String,
}

impl AgentDescriptor {
    /// Create a descriptor.
    pub fn new(
        class: impl Into<String>,
        provider: Option<&str>,
        agent_type: impl Into<String>,
    ) -> Self {
        Self {
            class: class.into(),
            provider: provider.map(str::to_string),
            agent_type: agent_type.into(),
        }
    }
}

impl fmt::Display for AgentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.provider {
            Some(provider) => write!(f, "{}:{}:{}", self.class, provider, self.agent_type),
            None => write!(f, "{}:{}", self.class, self.agent_type),
        }
    }
}

/// Where a primitive sits in the CIB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Not wrapped by a master resource
    Standalone,
    /// Wrapped by a master/slave resource
    Master {
        /// Id of the wrapping `<master>` element
        wrapper_id: String,
        /// The wrapper's meta attributes
        metadata: Attributes,
    },
}

/// A promotable flag change on an observed primitive, waiting for the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Became promotable: the wrapper must be created
    Promoted,
    /// Stopped being promotable: the wrapper must be deleted
    Demoted,
}

impl Transition {
    fn opposite(self) -> Self {
        match self {
            Self::Promoted => Self::Demoted,
            Self::Demoted => Self::Promoted,
        }
    }
}

/// The attribute groups passed to `pcs resource create/update`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttributeGroups {
    pub operations: Operations,
    pub parameters: Attributes,
    pub utilization: Attributes,
    pub metadata: Attributes,
}

/// Desired state for one primitive, as declared by the caller.
///
/// Each optional group distinguishes three cases: `None` (leave as is),
/// `Some` of an empty map (clear it), `Some` of a populated map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrimitiveSpec {
    pub name: String,
    #[serde(default)]
    pub ensure: Ensure,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default, rename = "type")]
    pub agent_type: Option<String>,
    #[serde(default)]
    pub parameters: Option<Attributes>,
    #[serde(default)]
    pub operations: Option<Operations>,
    #[serde(default)]
    pub utilization: Option<Attributes>,
    #[serde(default)]
    pub metadata: Option<Attributes>,
    #[serde(default)]
    pub promotable: Option<bool>,
    #[serde(default)]
    pub ms_metadata: Option<Attributes>,
    /// Shadow CIB the commands for this primitive should target
    #[serde(default)]
    pub cib: Option<String>,
}

impl PrimitiveSpec {
    /// Create a spec that only names the primitive.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the agent descriptor.
    pub fn with_agent(
        mut self,
        class: impl Into<String>,
        provider: Option<&str>,
        agent_type: impl Into<String>,
    ) -> Self {
        self.class = Some(class.into());
        self.provider = provider.map(str::to_string);
        self.agent_type = Some(agent_type.into());
        self
    }

    /// Mark the primitive for removal.
    pub fn absent(mut self) -> Self {
        self.ensure = Ensure::Absent;
        self
    }

    /// Set the desired instance attributes.
    pub fn with_parameters(mut self, parameters: Attributes) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Set the desired operations.
    pub fn with_operations(mut self, operations: Operations) -> Self {
        self.operations = Some(operations);
        self
    }

    /// Set the desired utilization.
    pub fn with_utilization(mut self, utilization: Attributes) -> Self {
        self.utilization = Some(utilization);
        self
    }

    /// Set the desired meta attributes.
    pub fn with_metadata(mut self, metadata: Attributes) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Set whether the primitive is wrapped by a master resource.
    pub fn with_promotable(mut self, promotable: bool) -> Self {
        self.promotable = Some(promotable);
        self
    }

    /// Set the master wrapper's meta attributes.
    pub fn with_ms_metadata(mut self, ms_metadata: Attributes) -> Self {
        self.ms_metadata = Some(ms_metadata);
        self
    }

    /// Set the shadow CIB.
    pub fn with_cib(mut self, cib: impl Into<String>) -> Self {
        self.cib = Some(cib.into());
        self
    }

    /// The declared descriptor, if class and type were both given.
    pub fn descriptor(&self) -> Option<AgentDescriptor> {
        match (&self.class, &self.agent_type) {
            (Some(class), Some(agent_type)) => Some(AgentDescriptor {
                class: class.clone(),
                provider: self.provider.clone(),
                agent_type: agent_type.clone(),
            }),
            _ => None,
        }
    }
}

/// Frozen copy of what the CIB held when the primitive was read.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Baseline {
    operations: Operations,
}

/// One cluster primitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Primitive {
    pub name: String,
    pub ensure: Ensure,
    #[serde(flatten)]
    pub descriptor: AgentDescriptor,
    pub parameters: Attributes,
    pub operations: Operations,
    pub utilization: Attributes,
    pub metadata: Attributes,
    pub promotable: bool,
    pub ms_metadata: Attributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cib: Option<String>,
    #[serde(skip)]
    baseline: Option<Baseline>,
    #[serde(skip)]
    dirty: bool,
    #[serde(skip)]
    transitions: Vec<Transition>,
}

impl Primitive {
    /// Build a record from what the CIB holds.
    pub fn observed(
        name: impl Into<String>,
        descriptor: AgentDescriptor,
        groups: AttributeGroups,
        placement: Placement,
    ) -> Self {
        let (promotable, ms_metadata) = match placement {
            Placement::Standalone => (false, Attributes::new()),
            Placement::Master { metadata, .. } => (true, metadata),
        };

        Self {
            name: name.into(),
            ensure: Ensure::Present,
            baseline: Some(Baseline {
                operations: groups.operations.clone(),
            }),
            descriptor,
            parameters: groups.parameters,
            operations: groups.operations,
            utilization: groups.utilization,
            metadata: groups.metadata,
            promotable,
            ms_metadata,
            cib: None,
            dirty: false,
            transitions: Vec::new(),
        }
    }

    /// Build a record for a primitive that does not exist yet.
    ///
    /// Class and type are required; unspecified groups start out empty.
    pub fn declare(spec: &PrimitiveSpec) -> Result<Self> {
        check_operations(spec)?;
        let descriptor = spec
            .descriptor()
            .ok_or_else(|| Error::InvalidDeclaration {
                name: spec.name.clone(),
                message: "class and type are required to create a primitive".to_string(),
            })?;

        Ok(Self {
            name: spec.name.clone(),
            ensure: Ensure::Present,
            descriptor,
            parameters: spec.parameters.clone().unwrap_or_default(),
            operations: spec.operations.clone().unwrap_or_default(),
            utilization: spec.utilization.clone().unwrap_or_default(),
            metadata: spec.metadata.clone().unwrap_or_default(),
            promotable: spec.promotable.unwrap_or(false),
            ms_metadata: spec.ms_metadata.clone().unwrap_or_default(),
            cib: spec.cib.clone(),
            baseline: None,
            dirty: true,
            transitions: Vec::new(),
        })
    }

    /// Whether this record was read from the live CIB.
    pub fn existing_resource(&self) -> bool {
        self.baseline.is_some()
    }

    /// Operations as last observed in the CIB.
    pub fn existing_operations(&self) -> Option<&Operations> {
        self.baseline.as_ref().map(|b| &b.operations)
    }

    /// Id of the master/slave wrapper for this primitive.
    pub fn master_id(&self) -> String {
        format!("{MASTER_PREFIX}{}", self.name)
    }

    /// Whether a desired value differs from what was observed.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Promotable changes not yet turned into commands.
    pub fn pending_transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Hand pending transitions to the planner and reset change tracking.
    pub(crate) fn take_changes(&mut self) -> (bool, Vec<Transition>) {
        let dirty = std::mem::take(&mut self.dirty);
        (dirty, std::mem::take(&mut self.transitions))
    }

    /// Current attribute groups.
    pub fn groups(&self) -> AttributeGroups {
        AttributeGroups {
            operations: self.operations.clone(),
            parameters: self.parameters.clone(),
            utilization: self.utilization.clone(),
            metadata: self.metadata.clone(),
        }
    }

    pub fn set_parameters(&mut self, should: Option<Attributes>) {
        replace_if_changed(&mut self.parameters, should, &mut self.dirty);
    }

    pub fn set_operations(&mut self, should: Option<Operations>) {
        replace_if_changed(&mut self.operations, should, &mut self.dirty);
    }

    pub fn set_utilization(&mut self, should: Option<Attributes>) {
        replace_if_changed(&mut self.utilization, should, &mut self.dirty);
    }

    pub fn set_metadata(&mut self, should: Option<Attributes>) {
        replace_if_changed(&mut self.metadata, should, &mut self.dirty);
    }

    pub fn set_ms_metadata(&mut self, should: Option<Attributes>) {
        replace_if_changed(&mut self.ms_metadata, should, &mut self.dirty);
    }

    /// Change the promotable flag.
    ///
    /// On an observed primitive the change is recorded as a [`Transition`];
    /// it does not mark any attribute group dirty.
    pub fn set_promotable(&mut self, should: Option<bool>) {
        let Some(should) = should else { return };
        if should == self.promotable {
            return;
        }
        self.promotable = should;

        if !self.existing_resource() {
            return;
        }

        let transition = if should {
            Transition::Promoted
        } else {
            Transition::Demoted
        };

        // Flipping back before convergence cancels the pending change.
        if self.transitions.last() == Some(&transition.opposite()) {
            self.transitions.pop();
        } else {
            self.transitions.push(transition);
        }
    }

    /// Apply every desired value in `spec` through the setters.
    ///
    /// Agent fields left out of `spec` keep their current value. A declared
    /// agent that still differs is rejected: `pcs resource update` cannot
    /// change it.
    pub fn apply_spec(&mut self, spec: &PrimitiveSpec) -> Result<()> {
        check_operations(spec)?;

        let descriptor = AgentDescriptor {
            class: spec.class.clone().unwrap_or_else(|| self.descriptor.class.clone()),
            provider: spec.provider.clone().or_else(|| self.descriptor.provider.clone()),
            agent_type: spec
                .agent_type
                .clone()
                .unwrap_or_else(|| self.descriptor.agent_type.clone()),
        };
        if descriptor != self.descriptor {
            return Err(Error::InvalidDeclaration {
                name: self.name.clone(),
                message: format!(
                    "agent is {} and cannot be changed to {descriptor}",
                    self.descriptor
                ),
            });
        }

        self.set_parameters(spec.parameters.clone());
        self.set_operations(spec.operations.clone());
        self.set_utilization(spec.utilization.clone());
        self.set_metadata(spec.metadata.clone());
        self.set_ms_metadata(spec.ms_metadata.clone());
        self.set_promotable(spec.promotable);
        if spec.cib.is_some() {
            self.cib = spec.cib.clone();
        }
        Ok(())
    }
}

/// Reject operations declared without attributes; `pcs` needs at least one.
fn check_operations(spec: &PrimitiveSpec) -> Result<()> {
    let Some(operations) = &spec.operations else {
        return Ok(());
    };
    match operations.iter().find(|(_, attributes)| attributes.is_empty()) {
        Some((op, _)) => Err(Error::InvalidDeclaration {
            name: spec.name.clone(),
            message: format!("operation `{op}` needs at least one attribute"),
        }),
        None => Ok(()),
    }
}

fn replace_if_changed<T: PartialEq>(current: &mut T, should: Option<T>, dirty: &mut bool) {
    if let Some(should) = should
        && *current != should
    {
        *current = should;
        *dirty = true;
    }
}

/// Build an attribute map from pairs.
pub fn attrs<I, K, V>(pairs: I) -> Attributes
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observed_web1() -> Primitive {
        let mut operations = Operations::new();
        operations.insert("monitor".into(), attrs([("interval", "10s")]));
        Primitive::observed(
            "web1",
            AgentDescriptor::new("ocf", Some("heartbeat"), "IPaddr2"),
            AttributeGroups {
                operations,
                parameters: attrs([("ip", "10.0.0.5")]),
                ..Default::default()
            },
            Placement::Standalone,
        )
    }

    #[test]
    fn test_descriptor_display() {
        let with_provider = AgentDescriptor::new("ocf", Some("heartbeat"), "IPaddr2");
        assert_eq!(with_provider.to_string(), "ocf:heartbeat:IPaddr2");

        let without = AgentDescriptor::new("stonith", None, "fence_xvm");
        assert_eq!(without.to_string(), "stonith:fence_xvm");
    }

    #[test]
    fn test_observed_has_frozen_baseline() {
        let mut web1 = observed_web1();
        assert!(web1.existing_resource());
        assert!(!web1.is_dirty());

        web1.set_operations(Some(Operations::new()));

        assert!(web1.is_dirty());
        assert!(web1.operations.is_empty());
        assert_eq!(web1.existing_operations().map(|o| o.len()), Some(1));
    }

    #[test]
    fn test_unspecified_group_is_noop() {
        let mut web1 = observed_web1();
        web1.set_parameters(None);
        web1.set_metadata(None);
        assert!(!web1.is_dirty());
        assert_eq!(web1.parameters, attrs([("ip", "10.0.0.5")]));
    }

    #[test]
    fn test_equal_value_is_not_dirty() {
        let mut web1 = observed_web1();
        web1.set_parameters(Some(attrs([("ip", "10.0.0.5")])));
        assert!(!web1.is_dirty());
    }

    #[test]
    fn test_declare_requires_descriptor() {
        let err = Primitive::declare(&PrimitiveSpec::new("db1")).unwrap_err();
        assert!(matches!(err, Error::InvalidDeclaration { .. }));
    }

    #[test]
    fn test_declare_is_new_and_dirty() {
        let spec = PrimitiveSpec::new("db1")
            .with_agent("ocf", Some("heartbeat"), "pgsql")
            .with_promotable(true);
        let db1 = Primitive::declare(&spec).unwrap();

        assert!(!db1.existing_resource());
        assert!(db1.existing_operations().is_none());
        assert!(db1.is_dirty());
        assert!(db1.promotable);
        assert_eq!(db1.master_id(), "ms_db1");
        assert!(db1.pending_transitions().is_empty());
    }

    #[test]
    fn test_demote_records_transition_only() {
        let mut db1 = Primitive::observed(
            "db1",
            AgentDescriptor::new("ocf", Some("heartbeat"), "pgsql"),
            AttributeGroups {
                parameters: attrs([("pgdata", "/var/lib/pgsql")]),
                ..Default::default()
            },
            Placement::Master {
                wrapper_id: "ms_db1".into(),
                metadata: attrs([("target-role", "Started")]),
            },
        );
        let before = db1.groups();

        db1.set_promotable(Some(false));

        assert_eq!(db1.pending_transitions(), &[Transition::Demoted]);
        assert!(!db1.is_dirty());
        assert_eq!(db1.groups(), before);
    }

    #[test]
    fn test_flip_back_cancels_transition() {
        let mut web1 = observed_web1();
        web1.set_promotable(Some(true));
        web1.set_promotable(Some(false));
        assert!(web1.pending_transitions().is_empty());
    }

    #[test]
    fn test_partial_agent_keeps_observed_provider() {
        let mut web1 = observed_web1();
        let spec = PrimitiveSpec::new("web1")
            .with_agent("ocf", None, "IPaddr2")
            .with_parameters(attrs([("ip", "10.0.0.6")]));

        web1.apply_spec(&spec).unwrap();

        assert_eq!(web1.descriptor.to_string(), "ocf:heartbeat:IPaddr2");
        assert_eq!(web1.parameters, attrs([("ip", "10.0.0.6")]));
        assert!(web1.is_dirty());
    }

    #[test]
    fn test_agent_change_is_rejected() {
        let mut web1 = observed_web1();
        let err = web1
            .apply_spec(&PrimitiveSpec::new("web1").with_agent("ocf", Some("heartbeat"), "IPaddr"))
            .unwrap_err();

        assert!(matches!(err, Error::InvalidDeclaration { ref name, .. } if name == "web1"));
        assert!(err.to_string().contains("ocf:heartbeat:IPaddr2"));
        assert_eq!(web1.descriptor.agent_type, "IPaddr2");
        assert!(!web1.is_dirty());
    }

    #[test]
    fn test_operation_without_attributes_is_rejected() {
        let mut operations = Operations::new();
        operations.insert("monitor".into(), attrs([("interval", "10s")]));
        operations.insert("start".into(), Attributes::new());
        let spec = PrimitiveSpec::new("web1")
            .with_agent("ocf", Some("heartbeat"), "IPaddr2")
            .with_operations(operations);

        let err = Primitive::declare(&spec).unwrap_err();
        assert!(err.to_string().contains("`start`"));

        let mut web1 = observed_web1();
        assert!(web1.apply_spec(&spec).is_err());
        assert!(!web1.is_dirty());
        assert_eq!(web1.operations.len(), 1);
    }

    #[test]
    fn test_spec_deserializes_tri_state() {
        let spec: PrimitiveSpec = toml::from_str(
            r#"
name = "web1"
operations = {}

[parameters]
ip = "10.0.0.5"
"#,
        )
        .unwrap();

        assert_eq!(spec.ensure, Ensure::Present);
        assert_eq!(spec.operations, Some(Operations::new()));
        assert_eq!(spec.parameters, Some(attrs([("ip", "10.0.0.5")])));
        assert_eq!(spec.utilization, None);
    }
}
