//! Text rendering of charts for terminal display.

use termtree::Tree;

use crate::domain::{flatten, resolve_group_members, Chart, OrgNode};

/// Label shown for a node: `name (position)`.
pub fn node_label(node: &OrgNode) -> String {
    if node.position.is_empty() {
        node.name.clone()
    } else {
        format!("{} ({})", node.name, node.position)
    }
}

/// Build a printable tree mirroring the chart's hierarchy.
pub fn render_tree(node: &OrgNode) -> Tree<String> {
    Tree::new(node_label(node)).with_leaves(node.children.iter().map(render_tree))
}

/// Printable tree of groups with their resolved leaders and members.
///
/// Leaders are marked with `*`. References to deleted nodes are not shown.
pub fn render_groups(chart: &Chart) -> Tree<String> {
    let flat = flatten(&chart.data);
    let mut root = Tree::new(format!("Groups ({})", chart.groups.len()));
    for group in &chart.groups {
        let resolved = resolve_group_members(group, &flat);
        let label = match &group.description {
            Some(d) if !d.is_empty() => format!("{} [{}] - {}", group.name, group.id, d),
            _ => format!("{} [{}]", group.name, group.id),
        };
        let leaders = resolved.leaders.iter().map(|l| Tree::new(format!("* {l}")));
        let others = resolved
            .members
            .iter()
            .filter(|m| !group.is_leader(&m.id))
            .map(|m| Tree::new(m.to_string()));
        root.push(Tree::new(label).with_leaves(leaders.chain(others)));
    }
    root
}
