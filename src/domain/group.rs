//! Group index: flat node listing and group membership resolution.
//!
//! Groups reference nodes by id only. Resolution always runs against a fresh
//! flattening of the current tree, so ids of deleted nodes drop out without
//! the group ever being rewritten.

use std::collections::HashSet;

use crate::domain::entities::{Chart, Group, NodeId, NodeSummary, OrgNode};
use crate::domain::error::DomainError;

/// Group members resolved against the live tree, in tree order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGroup {
    pub leaders: Vec<NodeSummary>,
    pub members: Vec<NodeSummary>,
}

/// Pre-order list of all node summaries.
pub fn flatten(tree: &OrgNode) -> Vec<NodeSummary> {
    let mut out = Vec::with_capacity(tree.count());
    collect(tree, &mut out);
    out
}

fn collect(node: &OrgNode, out: &mut Vec<NodeSummary>) {
    out.push(node.summary());
    for child in &node.children {
        collect(child, out);
    }
}

/// Filter `flat` down to the group's leaders and members.
/// Ids without a matching node are dropped silently.
pub fn resolve_group_members(group: &Group, flat: &[NodeSummary]) -> ResolvedGroup {
    let pick = |ids: &[NodeId]| -> Vec<NodeSummary> {
        flat.iter()
            .filter(|summary| ids.contains(&summary.id))
            .cloned()
            .collect()
    };
    ResolvedGroup {
        leaders: pick(group.leader_ids.as_slice()),
        members: pick(group.member_ids.as_slice()),
    }
}

/// Add `node_id` to the group's members, and to its leaders when `leader`.
/// Returns `false` when nothing changed.
pub fn assign(group: &mut Group, node_id: &NodeId, leader: bool) -> bool {
    let mut changed = false;
    if !group.is_member(node_id) {
        group.member_ids.push(node_id.clone());
        changed = true;
    }
    if leader && !group.is_leader(node_id) {
        group.leader_ids.push(node_id.clone());
        changed = true;
    }
    changed
}

/// Remove `node_id` from both leaders and members.
/// Returns `false` when the id was not referenced.
pub fn unassign(group: &mut Group, node_id: &NodeId) -> bool {
    let before = group.leader_ids.len() + group.member_ids.len();
    group.leader_ids.retain(|id| id != node_id);
    group.member_ids.retain(|id| id != node_id);
    before != group.leader_ids.len() + group.member_ids.len()
}

/// Drop every reference to an id in `removed` from all groups.
/// Returns the number of references removed.
pub fn prune_ids(groups: &mut [Group], removed: &HashSet<NodeId>) -> usize {
    let mut pruned = 0;
    for group in groups.iter_mut() {
        let before = group.leader_ids.len() + group.member_ids.len();
        group.leader_ids.retain(|id| !removed.contains(id));
        group.member_ids.retain(|id| !removed.contains(id));
        pruned += before - (group.leader_ids.len() + group.member_ids.len());
    }
    pruned
}

/// Drop references to ids that are no longer in the chart's tree.
/// Returns the number of references removed.
pub fn prune_stale_references(chart: &mut Chart) -> usize {
    let live: HashSet<NodeId> = flatten(&chart.data).into_iter().map(|s| s.id).collect();
    let stale: HashSet<NodeId> = chart
        .groups
        .iter()
        .flat_map(|g| g.leader_ids.iter().chain(g.member_ids.iter()))
        .filter(|id| !live.contains(*id))
        .cloned()
        .collect();
    prune_ids(&mut chart.groups, &stale)
}

/// Mutable access to a chart's group by id.
pub fn group_mut<'a>(chart: &'a mut Chart, group_id: &str) -> Result<&'a mut Group, DomainError> {
    chart
        .groups
        .iter_mut()
        .find(|g| g.id == group_id)
        .ok_or_else(|| DomainError::GroupNotFound(group_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> OrgNode {
        OrgNode::new("r", "CEO", "Exec").with_children(vec![
            OrgNode::new("a", "Bob", "VP").with_children(vec![OrgNode::new("a1", "Carl", "Lead")]),
            OrgNode::new("b", "Ann", "VP"),
        ])
    }

    #[test]
    fn given_tree_when_flattening_then_returns_pre_order_summaries() {
        let flat = flatten(&sample());
        let ids: Vec<&str> = flat.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["r", "a", "a1", "b"]);
        assert_eq!(flat[1].position, "VP");
    }

    #[test]
    fn given_leader_assignment_then_leader_is_also_member_once() {
        let mut group = Group::new("Team", None);
        assert!(assign(&mut group, &NodeId::from("a"), true));
        assert!(!assign(&mut group, &NodeId::from("a"), true));
        assert_eq!(group.member_ids, vec![NodeId::from("a")]);
        assert_eq!(group.leader_ids, vec![NodeId::from("a")]);
    }

    #[test]
    fn given_unassign_then_removes_from_both_lists() {
        let mut group = Group::new("Team", None);
        assign(&mut group, &NodeId::from("a"), true);
        assign(&mut group, &NodeId::from("b"), false);
        assert!(unassign(&mut group, &NodeId::from("a")));
        assert!(!unassign(&mut group, &NodeId::from("a")));
        assert!(group.leader_ids.is_empty());
        assert_eq!(group.member_ids, vec![NodeId::from("b")]);
    }

    #[test]
    fn given_stale_reference_when_pruning_then_counts_removed_ids() {
        let mut chart = Chart::new("Acme", None, sample());
        let mut group = Group::new("Team", None);
        assign(&mut group, &NodeId::from("a"), true);
        assign(&mut group, &NodeId::from("gone"), true);
        chart.groups.push(group);

        assert_eq!(prune_stale_references(&mut chart), 2);
        assert_eq!(chart.groups[0].member_ids, vec![NodeId::from("a")]);
        assert_eq!(chart.groups[0].leader_ids, vec![NodeId::from("a")]);
    }

    #[test]
    fn given_unknown_group_when_looking_up_then_errors() {
        let mut chart = Chart::new("Acme", None, sample());
        let err = group_mut(&mut chart, "nope").unwrap_err();
        assert_eq!(err, DomainError::GroupNotFound("nope".into()));
    }
}
