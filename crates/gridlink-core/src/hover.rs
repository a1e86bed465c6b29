//! Hover highlighting state.

use crate::graph::{Edge, Graph, NodeId};
use serde::{Deserialize, Serialize};

/// What the pointer is currently over.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HoverState {
    node: Option<NodeId>,
    connected_nodes: Vec<NodeId>,
    edges: Vec<Edge>,
    /// Node that would receive an edge if the pointer were released now.
    potential_target: Option<NodeId>,
    #[serde(skip)]
    changed: bool,
}

impl HoverState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn connected_nodes(&self) -> &[NodeId] {
        &self.connected_nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn potential_target(&self) -> Option<NodeId> {
        self.potential_target
    }

    /// Returns true if the hover state changed since the last call.
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    /// Hover `node`, highlighting its neighbours and incident edges.
    ///
    /// `companions` (e.g. the rest of a multi-selection) are highlighted as
    /// connected nodes too.
    pub fn update(&mut self, graph: &Graph, node: Option<NodeId>, companions: &[NodeId]) {
        let mut connected = Vec::new();
        let mut edges = Vec::new();
        if let Some(hovered) = node {
            for edge in graph.edges_touching(hovered) {
                let Some(other) = edge.other(hovered) else {
                    continue;
                };
                if graph.node(other).is_none() {
                    continue;
                }
                edges.push(*edge);
                if !connected.contains(&other) {
                    connected.push(other);
                }
            }
            for &companion in companions {
                if companion != hovered && !connected.contains(&companion) {
                    connected.push(companion);
                }
            }
        }

        if self.node != node || self.connected_nodes != connected || self.edges != edges {
            self.node = node;
            self.connected_nodes = connected;
            self.edges = edges;
            self.changed = true;
        }
    }

    pub fn set_potential_target(&mut self, node: Option<NodeId>) {
        if self.potential_target != node {
            self.potential_target = node;
            self.changed = true;
        }
    }

    pub fn clear(&mut self) {
        if self.node.is_some()
            || self.potential_target.is_some()
            || !self.connected_nodes.is_empty()
            || !self.edges.is_empty()
        {
            self.node = None;
            self.potential_target = None;
            self.connected_nodes.clear();
            self.edges.clear();
            self.changed = true;
        }
    }
}
