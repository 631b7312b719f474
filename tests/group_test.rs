//! Integration tests for group resolution against a changing tree

use orgchart::domain::group::{assign, prune_stale_references, unassign};
use orgchart::domain::{
    delete_node, flatten, resolve_group_members, Chart, Group, NodeId, OrgNode,
};

fn id(s: &str) -> NodeId {
    NodeId::from(s)
}

fn tree() -> OrgNode {
    OrgNode::new("r", "CEO", "Exec").with_children(vec![
        OrgNode::new("a", "Bob", "VP"),
        OrgNode::new("b", "Ann", "VP").with_children(vec![OrgNode::new("b1", "Carl", "Lead")]),
    ])
}

fn team() -> Group {
    Group {
        id: "g1".into(),
        name: "Platform".into(),
        description: None,
        leader_ids: vec![id("a")],
        member_ids: vec![id("a"), id("b")],
    }
}

#[test]
fn given_member_deleted_from_tree_when_resolving_then_drops_it_silently() {
    let group = team();
    let tree = delete_node(&tree(), &id("b")).unwrap();

    let resolved = resolve_group_members(&group, &flatten(&tree));

    let leaders: Vec<&str> = resolved.leaders.iter().map(|s| s.id.as_str()).collect();
    let members: Vec<&str> = resolved.members.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(leaders, vec!["a"]);
    assert_eq!(members, vec!["a"]);
    // the group itself still references the deleted id
    assert!(group.is_member(&id("b")));
}

#[test]
fn given_tree_when_flattening_then_lists_nodes_in_pre_order() {
    let flat = flatten(&tree());
    let ids: Vec<&str> = flat.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["r", "a", "b", "b1"]);
    assert_eq!(flat[3].name, "Carl");
}

#[test]
fn given_members_listed_out_of_tree_order_when_resolving_then_returns_tree_order() {
    let group = Group {
        member_ids: vec![id("b1"), id("r")],
        ..team()
    };

    let resolved = resolve_group_members(&group, &flatten(&tree()));

    let members: Vec<&str> = resolved.members.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(members, vec!["r", "b1"]);
}

#[test]
fn given_leader_assignment_when_assigning_then_also_member_and_no_duplicates() {
    let mut group = Group::new("Ops", None);

    assert!(assign(&mut group, &id("b1"), true));
    assert!(!assign(&mut group, &id("b1"), true));
    assert!(!assign(&mut group, &id("b1"), false));

    assert_eq!(group.leader_ids, vec![id("b1")]);
    assert_eq!(group.member_ids, vec![id("b1")]);
}

#[test]
fn given_assigned_node_when_unassigning_then_removed_from_both_lists() {
    let mut group = team();

    assert!(unassign(&mut group, &id("a")));
    assert!(!unassign(&mut group, &id("a")));

    assert!(group.leader_ids.is_empty());
    assert_eq!(group.member_ids, vec![id("b")]);
}

#[test]
fn given_stale_references_when_pruning_then_only_missing_ids_are_removed() {
    let mut chart = Chart::new("Acme", None, tree());
    chart.groups.push(Group {
        leader_ids: vec![id("a"), id("gone")],
        member_ids: vec![id("a"), id("gone"), id("b1"), id("also-gone")],
        ..team()
    });

    let pruned = prune_stale_references(&mut chart);

    assert_eq!(pruned, 3);
    let group = &chart.groups[0];
    assert_eq!(group.leader_ids, vec![id("a")]);
    assert_eq!(group.member_ids, vec![id("a"), id("b1")]);
}
