//! Editor session: the single chart being edited and the policy applied to edits.
//!
//! Each edit runs a tree-editor function against the current tree and swaps
//! in the returned snapshot. A failed edit leaves the chart exactly as it was.

use std::collections::HashSet;

use tracing::{debug, instrument};

use crate::application::codec;
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::domain::group::{self, group_mut};
use crate::domain::{
    editor, Chart, DomainError, Group, NodeId, NodeIndex, NodeSummary, NodeUpdate, OrgNode,
    ResolvedGroup,
};

/// Rules the session applies on top of the pure tree editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditPolicy {
    /// Edits naming an absent node id fail instead of being ignored
    pub strict_node_ids: bool,
    /// Deleting a node removes it and its descendants from all groups
    pub prune_groups_on_delete: bool,
    /// Name used when a node is added without one
    pub new_node_name: String,
    /// Position used when a node is added without one
    pub new_node_position: String,
}

impl Default for EditPolicy {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for EditPolicy {
    fn from(settings: &Settings) -> Self {
        Self {
            strict_node_ids: settings.strict_node_ids,
            prune_groups_on_delete: settings.prune_groups_on_delete,
            new_node_name: settings.new_node_name.clone(),
            new_node_position: settings.new_node_position.clone(),
        }
    }
}

/// Size and shape of a chart's tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeShape {
    pub nodes: usize,
    /// Levels from the root down, 1 for a lone root
    pub depth: usize,
    /// Nodes without reports
    pub leaves: usize,
}

/// Context object owning the current chart.
#[derive(Debug, Clone)]
pub struct EditorSession {
    chart: Chart,
    policy: EditPolicy,
}

impl EditorSession {
    pub fn new(chart: Chart, policy: EditPolicy) -> Self {
        Self { chart, policy }
    }

    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    pub fn into_chart(self) -> Chart {
        self.chart
    }

    pub fn policy(&self) -> &EditPolicy {
        &self.policy
    }

    fn require_node(&self, id: &NodeId) -> ApplicationResult<()> {
        if self.policy.strict_node_ids && editor::find_node(&self.chart.data, id).is_none() {
            return Err(DomainError::NodeNotFound(id.clone()).into());
        }
        Ok(())
    }

    pub fn find_node(&self, id: &NodeId) -> Option<&OrgNode> {
        editor::find_node(&self.chart.data, id)
    }

    /// Add a new leaf under `parent_id`; blank fields fall back to the policy defaults.
    ///
    /// Returns the generated id. Without strict ids an unknown parent leaves
    /// the tree unchanged and the returned id is not part of it.
    #[instrument(level = "debug", skip(self))]
    pub fn add_child(
        &mut self,
        parent_id: &NodeId,
        name: Option<&str>,
        position: Option<&str>,
    ) -> ApplicationResult<NodeId> {
        let name = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(self.policy.new_node_name.as_str());
        let position = position
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(self.policy.new_node_position.as_str());
        let node = OrgNode::with_generated_id(name, position);
        let id = node.id.clone();
        self.add_node(parent_id, node)?;
        Ok(id)
    }

    /// Append a fully built node under `parent_id`.
    #[instrument(level = "debug", skip(self, node), fields(node = %node.id))]
    pub fn add_node(&mut self, parent_id: &NodeId, node: OrgNode) -> ApplicationResult<()> {
        self.require_node(parent_id)?;
        if editor::find_node(&self.chart.data, &node.id).is_some() {
            return Err(DomainError::DuplicateNodeId(node.id).into());
        }
        self.chart.data = editor::add_child(&self.chart.data, parent_id, node);
        debug!("add_node: tree has {} nodes", self.chart.data.count());
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    pub fn update_node(&mut self, id: &NodeId, update: &NodeUpdate) -> ApplicationResult<()> {
        self.require_node(id)?;
        self.chart.data = editor::update_node(&self.chart.data, id, update);
        Ok(())
    }

    /// Delete a node and its subtree. Returns the ids that were removed.
    #[instrument(level = "debug", skip(self))]
    pub fn delete_node(&mut self, id: &NodeId) -> ApplicationResult<Vec<NodeId>> {
        self.require_node(id)?;
        let removed = NodeIndex::build(&self.chart.data)?.subtree_ids(id);
        let tree = editor::delete_node(&self.chart.data, id)?;
        self.chart.data = tree;

        if self.policy.prune_groups_on_delete && !removed.is_empty() {
            let removed_set: HashSet<NodeId> = removed.iter().cloned().collect();
            let pruned = group::prune_ids(&mut self.chart.groups, &removed_set);
            debug!("delete_node: pruned {} group references", pruned);
        }
        Ok(removed)
    }

    pub fn flatten(&self) -> Vec<NodeSummary> {
        group::flatten(&self.chart.data)
    }

    /// Root-to-node chain of summaries, empty if `id` is absent.
    pub fn path_to(&self, id: &NodeId) -> ApplicationResult<Vec<NodeSummary>> {
        let index = NodeIndex::build(&self.chart.data)?;
        Ok(index.path_to(id).into_iter().cloned().collect())
    }

    pub fn shape(&self) -> ApplicationResult<TreeShape> {
        let index = NodeIndex::build(&self.chart.data)?;
        Ok(TreeShape {
            nodes: index.node_count(),
            depth: index.depth(),
            leaves: index.leaf_nodes().len(),
        })
    }

    // ---- groups ----

    /// Create an empty group and return its id.
    #[instrument(level = "debug", skip(self))]
    pub fn add_group(&mut self, name: &str, description: Option<String>) -> String {
        let group = Group::new(name, description);
        let id = group.id.clone();
        self.chart.groups.push(group);
        id
    }

    #[instrument(level = "debug", skip(self))]
    pub fn remove_group(&mut self, group_id: &str) -> ApplicationResult<Group> {
        let pos = self
            .chart
            .groups
            .iter()
            .position(|g| g.id == group_id)
            .ok_or_else(|| DomainError::GroupNotFound(group_id.to_string()))?;
        Ok(self.chart.groups.remove(pos))
    }

    /// Add a node to a group, as leader when `leader` is set.
    #[instrument(level = "debug", skip(self))]
    pub fn assign(&mut self, group_id: &str, node_id: &NodeId, leader: bool) -> ApplicationResult<bool> {
        self.require_node(node_id)?;
        let group = group_mut(&mut self.chart, group_id)?;
        Ok(group::assign(group, node_id, leader))
    }

    #[instrument(level = "debug", skip(self))]
    pub fn unassign(&mut self, group_id: &str, node_id: &NodeId) -> ApplicationResult<bool> {
        let group = group_mut(&mut self.chart, group_id)?;
        Ok(group::unassign(group, node_id))
    }

    /// Resolve a group against the current tree.
    pub fn resolve_group(&self, group_id: &str) -> ApplicationResult<ResolvedGroup> {
        let group = self
            .chart
            .group(group_id)
            .ok_or_else(|| DomainError::GroupNotFound(group_id.to_string()))?;
        Ok(group::resolve_group_members(group, &self.flatten()))
    }

    /// Drop group references to nodes no longer in the tree.
    pub fn prune_stale_references(&mut self) -> usize {
        group::prune_stale_references(&mut self.chart)
    }

    // ---- serialization ----

    pub fn export_json(&self) -> ApplicationResult<String> {
        codec::export_json(&self.chart)
    }

    /// Replace the chart with one decoded from `input`.
    /// On a format error the current chart is kept.
    #[instrument(level = "debug", skip(self, input))]
    pub fn import_json(&mut self, input: &str) -> ApplicationResult<&Chart> {
        let chart = codec::import_json(input)?;
        self.chart = chart;
        Ok(&self.chart)
    }
}
