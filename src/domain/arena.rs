use std::collections::HashMap;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::entities::{NodeId, NodeSummary, OrgNode};
use crate::domain::error::DomainError;

/// Tree node in the arena-based index.
#[derive(Debug)]
pub struct IndexedNode {
    /// Summary of the indexed node
    pub data: NodeSummary,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena, in sibling order
    pub children: Vec<Index>,
}

/// Arena-based index over an organization tree.
///
/// Built from an [`OrgNode`] snapshot. Each node lives in a generational arena,
/// children are ordered index lists, and ids map to arena slots for O(1)
/// lookups. Building the index rejects trees that reuse an id.
#[derive(Debug)]
pub struct NodeIndex {
    arena: Arena<IndexedNode>,
    by_id: HashMap<NodeId, Index>,
    root: Option<Index>,
}

impl NodeIndex {
    fn empty() -> Self {
        Self {
            arena: Arena::new(),
            by_id: HashMap::new(),
            root: None,
        }
    }

    /// Index every node of `tree`, failing on the first repeated id.
    #[instrument(level = "debug", skip(tree), fields(root = %tree.id))]
    pub fn build(tree: &OrgNode) -> Result<Self, DomainError> {
        let mut index = Self::empty();
        let mut stack: Vec<(&OrgNode, Option<Index>)> = vec![(tree, None)];

        while let Some((node, parent_idx)) = stack.pop() {
            let idx = index.insert_node(node.summary(), parent_idx)?;
            // Reverse push keeps sibling order in the arena's child lists
            for child in node.children.iter().rev() {
                stack.push((child, Some(idx)));
            }
        }

        Ok(index)
    }

    #[instrument(level = "trace", skip(self))]
    fn insert_node(&mut self, data: NodeSummary, parent: Option<Index>) -> Result<Index, DomainError> {
        if self.by_id.contains_key(&data.id) {
            return Err(DomainError::DuplicateNodeId(data.id));
        }
        let id = data.id.clone();
        let node = IndexedNode {
            data,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);
        self.by_id.insert(id, node_idx);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                // Children are visited in sibling order, so pushing preserves it
                parent.children.push(node_idx);
            }
        } else {
            self.root = Some(node_idx);
        }

        Ok(node_idx)
    }

    fn get_node(&self, idx: Index) -> Option<&IndexedNode> {
        self.arena.get(idx)
    }

    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// Pre-order traversal, siblings left to right.
    pub fn iter(&self) -> PreOrderIterator<'_> {
        PreOrderIterator::new(self, self.root)
    }

    /// Number of levels, 1 for a lone root.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        if let Some(root) = self.root {
            self.calculate_depth(root)
        } else {
            0
        }
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        if let Some(node) = self.get_node(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Chain of summaries from the root down to `id` (inclusive).
    /// Empty when `id` is not indexed.
    #[instrument(level = "debug", skip(self))]
    pub fn path_to(&self, id: &NodeId) -> Vec<&NodeSummary> {
        let mut path = Vec::new();
        let mut current = self.by_id.get(id).copied();
        while let Some(idx) = current {
            match self.arena.get(idx) {
                Some(node) => {
                    path.push(&node.data);
                    current = node.parent;
                }
                None => break,
            }
        }
        path.reverse();
        path
    }

    /// Ids of `id` and all its descendants, pre-order.
    /// Empty when `id` is not indexed.
    pub fn subtree_ids(&self, id: &NodeId) -> Vec<NodeId> {
        match self.by_id.get(id) {
            Some(&idx) => PreOrderIterator::new(self, Some(idx))
                .map(|(_, node)| node.data.id.clone())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Summaries of nodes without children, in tree order.
    pub fn leaf_nodes(&self) -> Vec<&NodeSummary> {
        self.iter()
            .filter(|(_, node)| node.children.is_empty())
            .map(|(_, node)| &node.data)
            .collect()
    }
}

pub struct PreOrderIterator<'a> {
    index: &'a NodeIndex,
    stack: Vec<Index>,
}

impl<'a> PreOrderIterator<'a> {
    fn new(index: &'a NodeIndex, start: Option<Index>) -> Self {
        let mut stack = Vec::new();
        if let Some(start) = start {
            stack.push(start);
        }
        Self { index, stack }
    }
}

impl<'a> Iterator for PreOrderIterator<'a> {
    type Item = (Index, &'a IndexedNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.index.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> OrgNode {
        OrgNode::new("r", "CEO", "Exec").with_children(vec![
            OrgNode::new("a", "Bob", "VP").with_children(vec![
                OrgNode::new("a1", "Carl", "Lead"),
                OrgNode::new("a2", "Dora", "Lead"),
            ]),
            OrgNode::new("b", "Ann", "VP"),
        ])
    }

    #[test]
    fn given_tree_when_iterating_then_visits_pre_order() {
        let index = NodeIndex::build(&sample()).unwrap();
        let ids: Vec<&str> = index.iter().map(|(_, n)| n.data.id.as_str()).collect();
        assert_eq!(ids, vec!["r", "a", "a1", "a2", "b"]);
        assert_eq!(index.node_count(), 5);
    }

    #[test]
    fn given_duplicate_id_when_building_then_fails() {
        let tree = OrgNode::new("r", "CEO", "Exec").with_children(vec![
            OrgNode::new("x", "Bob", "VP"),
            OrgNode::new("x", "Ann", "VP"),
        ]);
        let err = NodeIndex::build(&tree).unwrap_err();
        assert_eq!(err, DomainError::DuplicateNodeId(NodeId::from("x")));
    }

    #[test]
    fn given_nested_node_when_path_to_then_returns_root_first() {
        let index = NodeIndex::build(&sample()).unwrap();
        let names: Vec<&str> = index
            .path_to(&NodeId::from("a2"))
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["CEO", "Bob", "Dora"]);
        assert!(index.path_to(&NodeId::from("zz")).is_empty());
    }

    #[test]
    fn given_tree_when_querying_shape_then_reports_depth_leaves_and_subtree() {
        let index = NodeIndex::build(&sample()).unwrap();
        assert_eq!(index.depth(), 3);
        let leaves: Vec<&str> = index.leaf_nodes().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(leaves, vec!["a1", "a2", "b"]);
        let subtree: Vec<String> = index
            .subtree_ids(&NodeId::from("a"))
            .into_iter()
            .map(|id| id.to_string())
            .collect();
        assert_eq!(subtree, vec!["a", "a1", "a2"]);
    }
}
