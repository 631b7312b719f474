//! Domain entities: core data structures
//!
//! Field names on the wire follow the persisted record layout: node and group
//! keys are camelCase, chart bookkeeping keys (`user_id`, `created_at`,
//! `updated_at`) are snake_case.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a node, unique across one chart's tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Fresh random identifier (UUID v4).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// One box in the organization tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgNode {
    pub id: NodeId,
    pub name: String,
    pub position: String,
    /// Ordered: determines sibling display order
    #[serde(default)]
    pub children: Vec<OrgNode>,
    /// Marks a node that stands for a team rather than a person
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_group: Option<bool>,
    /// Ids of members leading the team this node represents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_leaders: Option<Vec<NodeId>>,
}

impl OrgNode {
    /// Leaf node with the given id.
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>, position: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position: position.into(),
            children: Vec::new(),
            is_group: None,
            group_leaders: None,
        }
    }

    /// Leaf node with a freshly generated id.
    pub fn with_generated_id(name: impl Into<String>, position: impl Into<String>) -> Self {
        Self::new(NodeId::generate(), name, position)
    }

    pub fn with_children(mut self, children: Vec<OrgNode>) -> Self {
        self.children = children;
        self
    }

    pub fn summary(&self) -> NodeSummary {
        NodeSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            position: self.position.clone(),
        }
    }

    /// Number of nodes in this subtree, including self.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(OrgNode::count).sum::<usize>()
    }
}

/// Flat row describing a node, used for listing and selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSummary {
    pub id: NodeId,
    pub name: String,
    pub position: String,
}

impl fmt::Display for NodeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.position)
    }
}

/// Named subset of nodes with designated leaders, independent of tree shape.
///
/// Id lists are kept in insertion order and never hold duplicates. They are
/// not pruned when nodes are deleted; resolution against the live tree drops
/// stale ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub leader_ids: Vec<NodeId>,
    #[serde(default)]
    pub member_ids: Vec<NodeId>,
}

impl Group {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description,
            leader_ids: Vec::new(),
            member_ids: Vec::new(),
        }
    }

    pub fn is_leader(&self, id: &NodeId) -> bool {
        self.leader_ids.contains(id)
    }

    pub fn is_member(&self, id: &NodeId) -> bool {
        self.member_ids.contains(id)
    }
}

/// A complete named tree plus its groups; the unit of persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chart {
    /// Record id assigned by the store; `None` until first save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Root of the tree
    pub data: OrgNode,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Chart {
    /// Unsaved chart consisting of a single root node.
    pub fn new(name: impl Into<String>, description: Option<String>, root: OrgNode) -> Self {
        Self {
            id: None,
            name: name.into(),
            description,
            data: root,
            groups: Vec::new(),
            user_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn root_id(&self) -> &NodeId {
        &self.data.id
    }

    pub fn group(&self, group_id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == group_id)
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_node_json_without_children_when_parsing_then_defaults_to_empty() {
        let node: OrgNode =
            serde_json::from_str(r#"{"id":"r","name":"CEO","position":"Exec"}"#).unwrap();
        assert!(node.children.is_empty());
        assert_eq!(node.id, "r");
    }

    #[test]
    fn given_group_when_serializing_then_uses_camel_case_keys() {
        let mut group = Group::new("Platform", None);
        group.leader_ids.push(NodeId::from("a"));
        group.member_ids.push(NodeId::from("a"));

        let json = serde_json::to_value(&group).unwrap();

        assert_eq!(json["leaderIds"], serde_json::json!(["a"]));
        assert_eq!(json["memberIds"], serde_json::json!(["a"]));
        assert!(json.get("description").is_none());
    }

    #[test]
    fn given_nested_tree_when_counting_then_includes_all_descendants() {
        let tree = OrgNode::new("r", "CEO", "Exec").with_children(vec![
            OrgNode::new("a", "Bob", "VP").with_children(vec![OrgNode::new("c", "Eve", "Dev")]),
            OrgNode::new("b", "Ann", "VP"),
        ]);
        assert_eq!(tree.count(), 4);
    }

    #[test]
    fn given_generated_ids_then_they_differ() {
        assert_ne!(NodeId::generate(), NodeId::generate());
    }
}
