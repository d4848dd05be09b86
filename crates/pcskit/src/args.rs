//! Flattening of attribute groups into `pcs` argument tokens.
//!
//! Every group is emitted as a marker token followed by `key=value`
//! tokens. An empty group produces no tokens at all: `pcs` rejects a
//! marker with nothing after it.

use crate::types::{AttributeGroups, Attributes, Operations};

/// Marker introducing one operation.
pub const OP_MARKER: &str = "op";
/// Marker introducing the utilization group.
pub const UTILIZATION_MARKER: &str = "utilization";
/// Marker introducing a meta attribute group.
pub const META_MARKER: &str = "meta";

/// Serialization options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArgOptions {
    /// Append a trailing space to every utilization token, as older
    /// tooling did. Off by default.
    pub pad_utilization: bool,
}

fn pairs(attributes: &Attributes) -> impl Iterator<Item = String> + '_ {
    attributes.iter().map(|(k, v)| format!("{k}={v}"))
}

/// `op <name> k=v ...` for every operation.
///
/// An operation without attributes would leave a bare `op <name>`, so it
/// is left out.
pub fn operation_args(operations: &Operations) -> Vec<String> {
    let mut args = Vec::new();
    for (name, fields) in operations {
        if fields.is_empty() {
            log::warn!("leaving out operation '{name}': it has no attributes");
            continue;
        }
        args.push(OP_MARKER.to_string());
        args.push(name.clone());
        args.extend(pairs(fields));
    }
    args
}

/// Bare `k=v` tokens for instance attributes.
pub fn parameter_args(parameters: &Attributes) -> Vec<String> {
    pairs(parameters).collect()
}

/// `utilization k=v ...`
pub fn utilization_args(utilization: &Attributes, options: &ArgOptions) -> Vec<String> {
    if utilization.is_empty() {
        return Vec::new();
    }
    let mut args = vec![UTILIZATION_MARKER.to_string()];
    if options.pad_utilization {
        args.extend(pairs(utilization).map(|token| token + " "));
    } else {
        args.extend(pairs(utilization));
    }
    args
}

/// `meta k=v ...`
pub fn meta_args(metadata: &Attributes) -> Vec<String> {
    if metadata.is_empty() {
        return Vec::new();
    }
    let mut args = vec![META_MARKER.to_string()];
    args.extend(pairs(metadata));
    args
}

/// All groups in the order `pcs resource create/update` expects them.
pub fn group_args(groups: &AttributeGroups, options: &ArgOptions) -> Vec<String> {
    let mut args = operation_args(&groups.operations);
    args.extend(parameter_args(&groups.parameters));
    args.extend(utilization_args(&groups.utilization, options));
    args.extend(meta_args(&groups.metadata));
    args
}

/// Whether a marker token in `args` is directly followed by another marker
/// or by nothing. Used by tests and by debug assertions.
pub fn has_dangling_marker(args: &[String]) -> bool {
    let is_group_marker = |t: &str| t == UTILIZATION_MARKER || t == META_MARKER;
    args.iter().enumerate().any(|(i, token)| {
        let next = args.get(i + 1).map(String::as_str);
        if token == OP_MARKER {
            // op <name> must be followed by at least one k=v
            let after_name = args.get(i + 2).map(String::as_str);
            next.is_none() || !after_name.is_some_and(|t| t.contains('='))
        } else if is_group_marker(token) {
            !next.is_some_and(|t| t.contains('='))
        } else {
            false
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::attrs;
    use std::collections::{BTreeMap, HashSet};

    /// Split operation args back into name -> set of k=v tokens.
    fn op_sets(args: &[String]) -> BTreeMap<String, HashSet<String>> {
        let mut sets: BTreeMap<String, HashSet<String>> = BTreeMap::new();
        let mut current: Option<String> = None;
        let mut iter = args.iter();
        while let Some(token) = iter.next() {
            if token == OP_MARKER {
                current = iter.next().cloned();
                if let Some(name) = &current {
                    sets.entry(name.clone()).or_default();
                }
            } else if let Some(name) = &current {
                sets.entry(name.clone()).or_default().insert(token.clone());
            }
        }
        sets
    }

    #[test]
    fn test_operation_round_trip_is_order_independent() {
        let mut operations = Operations::new();
        operations.insert(
            "monitor".into(),
            attrs([("interval", "10s"), ("timeout", "20s")]),
        );
        operations.insert("start".into(), attrs([("timeout", "60s")]));

        let sets = op_sets(&operation_args(&operations));

        assert_eq!(sets.len(), 2);
        assert_eq!(
            sets["monitor"],
            HashSet::from(["interval=10s".to_string(), "timeout=20s".to_string()])
        );
        assert_eq!(sets["start"], HashSet::from(["timeout=60s".to_string()]));
    }

    #[test]
    fn test_operations_read_from_snapshot_survive_serialization() {
        let xml = r#"<cib><configuration><resources>
          <primitive class="ocf" id="web1" provider="heartbeat" type="IPaddr2">
            <operations>
              <op id="web1-start-0s" name="start" timeout="20s" interval="0s"/>
              <op id="web1-monitor-10s" interval="10s" name="monitor" on-fail="restart" timeout="20s"/>
              <op id="web1-stop-0s" name="stop" interval="0s" timeout="20s"/>
            </operations>
          </primitive>
          <master id="ms_db1">
            <primitive class="ocf" id="db1" provider="heartbeat" type="pgsql">
              <operations>
                <op id="db1-promote" name="promote" timeout="60s"/>
                <op id="db1-monitor-master" interval="15s" name="monitor" role="Master"/>
              </operations>
            </primitive>
          </master>
        </resources></configuration></cib>"#;

        let primitives = crate::cib::parse_snapshot(xml).unwrap();
        assert_eq!(primitives.len(), 2);

        for primitive in &primitives {
            let sets = op_sets(&operation_args(&primitive.operations));
            let expected: BTreeMap<String, HashSet<String>> = primitive
                .operations
                .iter()
                .map(|(name, fields)| {
                    let tokens = fields.iter().map(|(k, v)| format!("{k}={v}")).collect();
                    (name.clone(), tokens)
                })
                .collect();
            assert_eq!(sets, expected, "{}", primitive.name);
        }
        assert_eq!(
            op_sets(&operation_args(&primitives[0].operations))["monitor"],
            HashSet::from([
                "interval=10s".to_string(),
                "on-fail=restart".to_string(),
                "timeout=20s".to_string()
            ])
        );
    }

    #[test]
    fn test_empty_groups_emit_nothing() {
        let options = ArgOptions::default();
        assert!(operation_args(&Operations::new()).is_empty());
        assert!(parameter_args(&Attributes::new()).is_empty());
        assert!(utilization_args(&Attributes::new(), &options).is_empty());
        assert!(meta_args(&Attributes::new()).is_empty());
        assert!(group_args(&AttributeGroups::default(), &options).is_empty());
    }

    #[test]
    fn test_operation_without_attributes_is_skipped() {
        let mut operations = Operations::new();
        operations.insert("monitor".into(), Attributes::new());
        let args = operation_args(&operations);
        assert!(args.is_empty());
    }

    #[test]
    fn test_parameters_are_bare_pairs() {
        let args = parameter_args(&attrs([("ip", "10.0.0.5")]));
        assert_eq!(args, vec!["ip=10.0.0.5"]);
    }

    #[test]
    fn test_meta_group() {
        let args = meta_args(&attrs([("target-role", "Started")]));
        assert_eq!(args, vec!["meta", "target-role=Started"]);
    }

    #[test]
    fn test_utilization_padding() {
        let utilization = attrs([("memory", "1024")]);

        let plain = utilization_args(&utilization, &ArgOptions::default());
        assert_eq!(plain, vec!["utilization", "memory=1024"]);

        let padded = utilization_args(
            &utilization,
            &ArgOptions {
                pad_utilization: true,
            },
        );
        assert_eq!(padded, vec!["utilization", "memory=1024 "]);
    }

    #[test]
    fn test_group_order() {
        let mut operations = Operations::new();
        operations.insert("monitor".into(), attrs([("interval", "10s")]));
        let groups = AttributeGroups {
            operations,
            parameters: attrs([("ip", "10.0.0.5")]),
            utilization: attrs([("cpu", "1")]),
            metadata: attrs([("priority", "10")]),
        };

        let args = group_args(&groups, &ArgOptions::default());
        assert_eq!(
            args,
            vec![
                "op",
                "monitor",
                "interval=10s",
                "ip=10.0.0.5",
                "utilization",
                "cpu=1",
                "meta",
                "priority=10"
            ]
        );
        assert!(!has_dangling_marker(&args));
    }

    #[test]
    fn test_dangling_marker_detection() {
        let bad = vec!["meta".to_string()];
        assert!(has_dangling_marker(&bad));

        let bad = vec!["utilization".to_string(), "meta".to_string(), "a=b".to_string()];
        assert!(has_dangling_marker(&bad));

        let bad = vec!["op".to_string(), "monitor".to_string()];
        assert!(has_dangling_marker(&bad));
    }
}
