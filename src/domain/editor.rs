//! Tree editor: pure copy-on-write rewrites of an organization tree.
//!
//! Every function takes the current tree by reference and returns a new one;
//! the input is never mutated. Edits naming an id that is not in the tree
//! return an unchanged copy, except deleting the root which is refused.

use crate::domain::entities::{NodeId, OrgNode};
use crate::domain::error::DomainError;

/// Replacement values for a node's editable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeUpdate {
    pub name: Option<String>,
    pub position: Option<String>,
}

impl NodeUpdate {
    pub fn new(name: impl Into<String>, position: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            position: Some(position.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.position.is_none()
    }
}

/// Pre-order search, children in sibling order; first match wins.
pub fn find_node<'a>(tree: &'a OrgNode, id: &NodeId) -> Option<&'a OrgNode> {
    if tree.id == *id {
        return Some(tree);
    }
    tree.children.iter().find_map(|child| find_node(child, id))
}

/// Append `new_child` as the last child of `parent_id`.
pub fn add_child(tree: &OrgNode, parent_id: &NodeId, new_child: OrgNode) -> OrgNode {
    let mut pending = Some(new_child);
    add_child_inner(tree, parent_id, &mut pending)
}

fn add_child_inner(node: &OrgNode, parent_id: &NodeId, pending: &mut Option<OrgNode>) -> OrgNode {
    if node.id == *parent_id {
        if let Some(child) = pending.take() {
            let mut children = node.children.clone();
            children.push(child);
            return OrgNode {
                children,
                ..node.clone()
            };
        }
    }
    OrgNode {
        children: node
            .children
            .iter()
            .map(|child| add_child_inner(child, parent_id, pending))
            .collect(),
        ..node.clone()
    }
}

/// Replace `name`/`position` of the node with `id`; id and children are kept.
pub fn update_node(tree: &OrgNode, id: &NodeId, update: &NodeUpdate) -> OrgNode {
    if tree.id == *id {
        return OrgNode {
            name: update.name.clone().unwrap_or_else(|| tree.name.clone()),
            position: update
                .position
                .clone()
                .unwrap_or_else(|| tree.position.clone()),
            ..tree.clone()
        };
    }
    OrgNode {
        children: tree
            .children
            .iter()
            .map(|child| update_node(child, id, update))
            .collect(),
        ..tree.clone()
    }
}

/// Remove the node with `id` together with its subtree.
///
/// # Errors
/// [`DomainError::RootNotDeletable`] when `id` is the root's id.
pub fn delete_node(tree: &OrgNode, id: &NodeId) -> Result<OrgNode, DomainError> {
    if tree.id == *id {
        return Err(DomainError::RootNotDeletable(id.clone()));
    }
    Ok(remove_from(tree, id))
}

fn remove_from(node: &OrgNode, id: &NodeId) -> OrgNode {
    OrgNode {
        children: node
            .children
            .iter()
            .filter(|child| child.id != *id)
            .map(|child| remove_from(child, id))
            .collect(),
        ..node.clone()
    }
}
