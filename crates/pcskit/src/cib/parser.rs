//! Parser for CIB XML snapshots.
//!
//! Handles the `<primitive>` elements of a Pacemaker CIB:
//! ```text
//! <master id="ms_db1">
//!   <meta_attributes id="ms_db1-meta">
//!     <nvpair id="ms_db1-meta-target-role" name="target-role" value="Started"/>
//!   </meta_attributes>
//!   <primitive id="db1" class="ocf" provider="heartbeat" type="pgsql">
//!     <instance_attributes id="db1-ia">
//!       <nvpair id="db1-ia-pgdata" name="pgdata" value="/var/lib/pgsql"/>
//!     </instance_attributes>
//!     <operations>
//!       <op id="db1-monitor-10s" name="monitor" interval="10s"/>
//!     </operations>
//!   </primitive>
//! </master>
//! ```
//!
//! A primitive created from a `<template>` carries no `class`/`type` of its
//! own; its agent is read from the referenced template.

use crate::error::{Error, Result};
use crate::types::{AgentDescriptor, AttributeGroups, Attributes, Operations, Placement, Primitive};
use roxmltree::{Document, Node};
use std::path::Path;

/// Parse a snapshot from a file path.
pub fn parse_snapshot_file(path: &Path) -> Result<Vec<Primitive>> {
    let content = std::fs::read_to_string(path)?;
    parse_snapshot(&content)
}

/// Parse every primitive in a snapshot, in document order.
///
/// Malformed XML fails the whole parse; no partial result is returned.
/// A templated primitive whose template cannot be resolved is skipped
/// with a warning.
pub fn parse_snapshot(xml: &str) -> Result<Vec<Primitive>> {
    let doc = Document::parse(xml)?;

    let mut primitives = Vec::new();
    for node in doc.descendants().filter(|n| n.has_tag_name("primitive")) {
        if let Some(primitive) = parse_primitive(node)? {
            primitives.push(primitive);
        }
    }

    log::debug!("parsed {} primitive(s) from CIB snapshot", primitives.len());
    Ok(primitives)
}

/// Classify a primitive by its immediate parent.
pub fn classify(primitive: Node<'_, '_>) -> Placement {
    match primitive.parent_element() {
        Some(parent) if parent.has_tag_name("master") => Placement::Master {
            wrapper_id: parent.attribute("id").unwrap_or_default().to_string(),
            metadata: nvpairs(child(parent, "meta_attributes")),
        },
        _ => Placement::Standalone,
    }
}

fn parse_primitive(node: Node<'_, '_>) -> Result<Option<Primitive>> {
    let name = required(node, "id", "primitive")?;
    let Some(descriptor) = agent(node, name)? else {
        return Ok(None);
    };

    let groups = AttributeGroups {
        operations: operations(name, child(node, "operations"))?,
        parameters: nvpairs(child(node, "instance_attributes")),
        utilization: nvpairs(child(node, "utilization")),
        metadata: nvpairs(child(node, "meta_attributes")),
    };

    Ok(Some(Primitive::observed(name, descriptor, groups, classify(node))))
}

/// The primitive's agent, from its own attributes or from its template.
fn agent(node: Node<'_, '_>, name: &str) -> Result<Option<AgentDescriptor>> {
    let Some(template_id) = node.attribute("template") else {
        let class = required(node, "class", name)?;
        let agent_type = required(node, "type", name)?;
        return Ok(Some(AgentDescriptor::new(class, node.attribute("provider"), agent_type)));
    };

    let resolved = node
        .document()
        .descendants()
        .find(|n| n.has_tag_name("template") && n.attribute("id") == Some(template_id))
        .and_then(|template| {
            let class = template.attribute("class")?;
            let agent_type = template.attribute("type")?;
            let provider = node.attribute("provider").or(template.attribute("provider"));
            Some(AgentDescriptor::new(class, provider, agent_type))
        });

    if resolved.is_none() {
        log::warn!("skipping primitive {name}: template '{template_id}' does not name an agent");
    }
    Ok(resolved)
}

fn required<'a>(node: Node<'a, '_>, attribute: &str, owner: &str) -> Result<&'a str> {
    node.attribute(attribute)
        .ok_or_else(|| Error::SnapshotParse {
            message: format!(
                "<{}> of {} has no '{}' attribute (line {})",
                node.tag_name().name(),
                owner,
                attribute,
                node.document().text_pos_at(node.range().start).row
            ),
        })
}

/// First child element with the given tag.
fn child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|c| c.has_tag_name(tag))
}

/// Map each child's `name` to its `value`; an absent element yields an empty map.
fn nvpairs(node: Option<Node<'_, '_>>) -> Attributes {
    let Some(node) = node else {
        return Attributes::new();
    };

    node.children()
        .filter(Node::is_element)
        .filter_map(|pair| {
            let name = pair.attribute("name")?;
            let value = pair.attribute("value").unwrap_or_default();
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

/// Collect `<op>` children keyed by their `name`, dropping `id` and `name`.
fn operations(owner: &str, node: Option<Node<'_, '_>>) -> Result<Operations> {
    let mut operations = Operations::new();
    let Some(node) = node else {
        return Ok(operations);
    };

    for op in node.children().filter(Node::is_element) {
        let op_name = required(op, "name", owner)?;
        let fields: Attributes = op
            .attributes()
            .filter(|a| a.name() != "id" && a.name() != "name")
            .map(|a| (a.name().to_string(), a.value().to_string()))
            .collect();

        if operations.insert(op_name.to_string(), fields).is_some() {
            log::debug!("{owner}: later '{op_name}' operation replaces an earlier one");
        }
    }

    Ok(operations)
}
