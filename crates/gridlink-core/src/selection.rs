//! Selection state for nodes, groups and edges.

use crate::graph::{Edge, Graph, GroupId, NodeId};
use serde::{Deserialize, Serialize};

/// Which gestures are allowed to clear the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeselectMethods {
    /// Escape key.
    pub escape: bool,
    /// Clicking an already selected group again without dragging.
    pub reclick: bool,
    /// Pressing on empty canvas.
    pub background: bool,
}

impl Default for DeselectMethods {
    fn default() -> Self {
        Self {
            escape: true,
            reclick: true,
            background: true,
        }
    }
}

/// Selected nodes, groups and edges.
///
/// The three lists are independent except that group selection mirrors the
/// members of the selected groups into the node list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionModel {
    nodes: Vec<NodeId>,
    groups: Vec<GroupId>,
    edges: Vec<Edge>,
    pub deselect: DeselectMethods,
    #[serde(skip)]
    changed: bool,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deselect(deselect: DeselectMethods) -> Self {
        Self {
            deselect,
            ..Self::default()
        }
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn groups(&self) -> &[GroupId] {
        &self.groups
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn is_node_selected(&self, id: NodeId) -> bool {
        self.nodes.contains(&id)
    }

    pub fn is_group_selected(&self, id: GroupId) -> bool {
        self.groups.contains(&id)
    }

    pub fn is_edge_selected(&self, edge: Edge) -> bool {
        self.edges.contains(&edge)
    }

    /// Returns true if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.groups.is_empty() && self.edges.is_empty()
    }

    /// Returns true if the selection changed since the last call.
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    fn set_list<T: PartialEq>(list: &mut Vec<T>, items: Vec<T>, changed: &mut bool) {
        if *list != items {
            *list = items;
            *changed = true;
        }
    }

    fn extend_unique<T: PartialEq + Copy>(list: &mut Vec<T>, items: &[T], changed: &mut bool) {
        for item in items {
            if !list.contains(item) {
                list.push(*item);
                *changed = true;
            }
        }
    }

    /// Select a node, replacing the node selection unless `add`.
    pub fn select_node(&mut self, id: NodeId, add: bool) {
        self.select_nodes(&[id], add);
    }

    pub fn select_nodes(&mut self, ids: &[NodeId], add: bool) {
        if add {
            Self::extend_unique(&mut self.nodes, ids, &mut self.changed);
        } else {
            let mut unique = Vec::with_capacity(ids.len());
            Self::extend_unique(&mut unique, ids, &mut false);
            Self::set_list(&mut self.nodes, unique, &mut self.changed);
        }
    }

    pub fn deselect_node(&mut self, id: NodeId) {
        let before = self.nodes.len();
        self.nodes.retain(|&n| n != id);
        self.changed |= before != self.nodes.len();
    }

    pub fn clear_nodes(&mut self) {
        Self::set_list(&mut self.nodes, Vec::new(), &mut self.changed);
    }

    /// Select a group and mirror the resulting group selection into nodes.
    pub fn select_group(&mut self, graph: &Graph, id: GroupId, add: bool) {
        self.select_groups(graph, &[id], add);
    }

    pub fn select_groups(&mut self, graph: &Graph, ids: &[GroupId], add: bool) {
        if add {
            Self::extend_unique(&mut self.groups, ids, &mut self.changed);
        } else {
            let mut unique = Vec::with_capacity(ids.len());
            Self::extend_unique(&mut unique, ids, &mut false);
            Self::set_list(&mut self.groups, unique, &mut self.changed);
        }
        self.sync_nodes_from_groups(graph);
    }

    pub fn deselect_group(&mut self, graph: &Graph, id: GroupId) {
        let before = self.groups.len();
        self.groups.retain(|&g| g != id);
        if before != self.groups.len() {
            self.changed = true;
            self.sync_nodes_from_groups(graph);
        }
    }

    /// Replace the node selection with the members of the selected groups.
    pub fn sync_nodes_from_groups(&mut self, graph: &Graph) {
        let mut members = Vec::new();
        for &group in &self.groups {
            if let Some(group) = graph.group(group) {
                Self::extend_unique(&mut members, &group.node_ids, &mut false);
            }
        }
        Self::set_list(&mut self.nodes, members, &mut self.changed);
    }

    pub fn clear_groups(&mut self) {
        Self::set_list(&mut self.groups, Vec::new(), &mut self.changed);
    }

    /// Select an edge, replacing the edge selection unless `add`.
    pub fn select_edge(&mut self, edge: Edge, add: bool) {
        self.select_edges(&[edge], add);
    }

    pub fn select_edges(&mut self, edges: &[Edge], add: bool) {
        if add {
            Self::extend_unique(&mut self.edges, edges, &mut self.changed);
        } else {
            let mut unique = Vec::with_capacity(edges.len());
            Self::extend_unique(&mut unique, edges, &mut false);
            Self::set_list(&mut self.edges, unique, &mut self.changed);
        }
    }

    pub fn deselect_edge(&mut self, edge: Edge) {
        let before = self.edges.len();
        self.edges.retain(|&e| e != edge);
        self.changed |= before != self.edges.len();
    }

    pub fn clear_edges(&mut self) {
        Self::set_list(&mut self.edges, Vec::new(), &mut self.changed);
    }

    /// Clear nodes, groups and edges.
    pub fn clear(&mut self) {
        self.clear_nodes();
        self.clear_groups();
        self.clear_edges();
    }

    /// Drop every reference to something no longer in `graph`.
    pub fn prune(&mut self, graph: &Graph) {
        let before = (self.nodes.len(), self.groups.len(), self.edges.len());
        self.groups.retain(|&g| graph.group(g).is_some());
        self.nodes.retain(|&n| graph.node(n).is_some());
        self.edges.retain(|e| graph.edges().contains(e));
        self.changed |= before != (self.nodes.len(), self.groups.len(), self.edges.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GroupLayout;
    use kurbo::Point;

    fn two_groups() -> (Graph, GroupId, GroupId) {
        let mut graph = Graph::new();
        let a = graph.add_node_group(GroupLayout::new(1, 2)).unwrap();
        let b = graph
            .add_node_group(GroupLayout::new(1, 2).with_origin(Point::new(100.0, 300.0)))
            .unwrap();
        (graph, a, b)
    }

    #[test]
    fn test_group_selection_mirrors_nodes() {
        let (graph, a, b) = two_groups();
        let mut selection = SelectionModel::new();
        selection.select_group(&graph, a, false);
        assert_eq!(selection.nodes(), &[0, 1]);
        selection.select_group(&graph, b, true);
        assert_eq!(selection.nodes(), &[0, 1, 2, 3]);
        selection.select_group(&graph, b, false);
        assert_eq!(selection.groups(), &[b]);
        assert_eq!(selection.nodes(), &[2, 3]);
        selection.deselect_group(&graph, b);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_node_selection_leaves_groups_alone() {
        let (graph, a, _) = two_groups();
        let mut selection = SelectionModel::new();
        selection.select_group(&graph, a, false);
        selection.select_node(3, false);
        assert_eq!(selection.groups(), &[a]);
        assert_eq!(selection.nodes(), &[3]);
    }

    #[test]
    fn test_add_does_not_duplicate() {
        let mut selection = SelectionModel::new();
        selection.select_edge(Edge::new(0, 1), true);
        selection.select_edge(Edge::new(0, 1), true);
        assert_eq!(selection.edges().len(), 1);
        selection.deselect_edge(Edge::new(0, 1));
        assert!(selection.edges().is_empty());
    }

    #[test]
    fn test_change_tracking() {
        let (graph, a, _) = two_groups();
        let mut selection = SelectionModel::new();
        assert!(!selection.take_changed());
        selection.select_group(&graph, a, false);
        assert!(selection.take_changed());
        selection.select_group(&graph, a, false);
        assert!(!selection.take_changed());
        selection.clear();
        assert!(selection.take_changed());
    }

    #[test]
    fn test_prune_after_delete() {
        let (mut graph, a, b) = two_groups();
        graph.add_edge(0, 1);
        graph.add_edge(2, 3);
        let mut selection = SelectionModel::new();
        selection.select_groups(&graph, &[a, b], false);
        selection.select_edges(&[Edge::new(0, 1), Edge::new(2, 3)], false);

        graph.delete_group(a);
        selection.prune(&graph);
        assert_eq!(selection.groups(), &[b]);
        assert_eq!(selection.nodes(), &[2, 3]);
        assert_eq!(selection.edges(), &[Edge::new(2, 3)]);
    }
}
